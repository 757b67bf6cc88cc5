use crate::error::{Error, Result};
use crate::point::{Bounds, Point};
use image::GrayImage;
use rayon::prelude::*;
use std::cmp::Ordering;

/// Single-channel brightness buffer used as a generator's working state.
///
/// Values count how much light a pixel still has, so `255 - value` is the
/// darkness that remains to be drawn there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plane {
    bounds: Bounds,
    data: Vec<u8>,
}

impl Plane {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let bounds = Bounds::new(width, height);

        if bounds.is_empty() {
            return Err(Error::plane(format!("{width}x{height} has no pixels")));
        }

        if data.len() != bounds.area() {
            return Err(Error::plane(format!(
                "expected {} values for {width}x{height}, got {}",
                bounds.area(),
                data.len()
            )));
        }

        Ok(Self { bounds, data })
    }

    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        let bounds = Bounds::new(width, height);

        Self {
            bounds,
            data: vec![value; bounds.area()],
        }
    }

    pub fn from_gray(img: &GrayImage) -> Result<Self> {
        Self::new(img.width(), img.height(), img.as_raw().clone())
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, p: Point) -> Option<u8> {
        self.bounds
            .contains(p)
            .then(|| self.data[self.bounds.index(p)])
    }

    /// Every pixel tied at the plane's global minimum, in row-major order.
    pub fn darkest_pixels(&self) -> Vec<Point> {
        if self.bounds.is_empty() {
            return Vec::new();
        }

        self.data
            .par_chunks(self.bounds.width as usize)
            .enumerate()
            .map(|(y, row)| {
                let min = row.iter().copied().min().unwrap_or(u8::MAX);
                let points = row
                    .iter()
                    .enumerate()
                    .filter(|&(_, &value)| value == min)
                    .map(|(x, _)| Point::new(x as i32, y as i32))
                    .collect::<Vec<_>>();

                (min, points)
            })
            .reduce_with(|mut a, b| match a.0.cmp(&b.0) {
                Ordering::Less => a,
                Ordering::Greater => b,
                Ordering::Equal => {
                    a.1.extend(b.1);
                    a
                }
            })
            .map(|(_, points)| points)
            .unwrap_or_default()
    }

    /// Subtracts `weight` from every point, saturating at 0 and 255. A negative
    /// weight brightens.
    pub fn apply(&mut self, points: &[Point], weight: i32) {
        for p in points {
            debug_assert!(self.bounds.contains(*p), "{p:?} outside {:?}", self.bounds);
            let value = &mut self.data[self.bounds.index(*p)];
            *value = (i32::from(*value) - weight).clamp(0, 255) as u8;
        }
    }

    /// Mean brightness along `points`, used to compare lines of different
    /// length.
    pub fn mean_luminosity(&self, points: &[Point]) -> Result<f64> {
        let sum = points
            .iter()
            .try_fold(0u64, |acc, p| {
                acc.checked_add(u64::from(self.data[self.bounds.index(*p)]))
            })
            .ok_or(Error::LuminosityOverflow(points.len()))?;

        Ok(sum as f64 / points.len().max(1) as f64)
    }

    pub fn total_luminosity(&self) -> u64 {
        self.data.par_iter().map(|&v| u64::from(v)).sum()
    }

    /// Darkness left to draw: the gap between a fully white plane and this one.
    pub fn ink_demand(&self) -> u64 {
        self.bounds.area() as u64 * 255 - self.total_luminosity()
    }
}
