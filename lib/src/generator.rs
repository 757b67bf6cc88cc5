use crate::error::{Error, Result};
use crate::plane::Plane;
use crate::point::Point;
use crate::search::darkest_line;
use crate::settings::Settings;
use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Color component a line is drawn into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Red,
    Green,
    Blue,
    /// Every component alike, used for monochrome output.
    All,
}

impl Channel {
    pub const RGB: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Offset of the component within an RGBA pixel, `None` for [`Channel::All`].
    pub fn component(self) -> Option<usize> {
        match self {
            Channel::Red => Some(0),
            Channel::Green => Some(1),
            Channel::Blue => Some(2),
            Channel::All => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub points: Vec<Point>,
    pub weight: i32,
    pub channel: Channel,
    /// Darkest pixel the line was searched from.
    pub pivot: Point,
}

/// Greedy line producer for one channel.
///
/// Every call to `next` picks one of the currently darkest pixels, searches
/// the darkest chord through it and then brightens its own plane along that
/// chord by the ink weight. The plane is private, so consuming the darkness a
/// line covers is what moves the next search elsewhere.
pub struct Generator<R> {
    plane: Plane,
    channel: Channel,
    remaining: usize,
    trials: usize,
    weight: i32,
    rng: R,
}

impl<R: Rng> Generator<R> {
    pub fn new(plane: Plane, channel: Channel, count: usize, settings: &Settings, rng: R) -> Self {
        Self {
            plane,
            channel,
            remaining: count,
            trials: settings.trials,
            weight: settings.weight,
            rng,
        }
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn into_plane(self) -> Plane {
        self.plane
    }

    fn next_line(&mut self) -> Result<Line> {
        let darkest = self.plane.darkest_pixels();

        if darkest.is_empty() {
            return Err(Error::plane("no pixels left to pick a pivot from"));
        }

        let pivot = darkest[self.rng.gen_range(0..darkest.len())];
        let points = darkest_line(&self.plane, pivot, self.trials, &mut self.rng)?;

        self.plane.apply(&points, -self.weight);

        trace!(
            "{:?} line through {pivot:?} with {} points, {} tied pivots",
            self.channel,
            points.len(),
            darkest.len()
        );

        Ok(Line {
            points,
            weight: self.weight,
            channel: self.channel,
            pivot,
        })
    }
}

impl<R: Rng> Iterator for Generator<R> {
    type Item = Result<Line>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let line = self.next_line();

        // stop after a failure, the plane may be in an unexpected state
        self.remaining = if line.is_ok() { self.remaining - 1 } else { 0 };

        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn settings(trials: usize, weight: i32) -> Settings {
        Settings {
            trials,
            weight,
            ..Default::default()
        }
    }

    #[test]
    fn emits_exactly_the_requested_count() {
        let plane = Plane::filled(16, 16, 100);
        let generator = Generator::new(
            plane,
            Channel::Green,
            7,
            &settings(5, 20),
            StdRng::seed_from_u64(1),
        );
        let lines = generator.collect::<Result<Vec<_>>>().unwrap();

        assert_eq!(lines.len(), 7);
        assert!(lines.iter().all(|l| l.channel == Channel::Green && l.weight == 20));
    }

    #[test]
    fn white_plane_line_lowers_brightness_by_weight() {
        let plane = Plane::filled(4, 4, 255);
        let mut generator =
            Generator::new(plane, Channel::All, 1, &settings(1, 50), StdRng::seed_from_u64(2));
        let line = generator.next().unwrap().unwrap();

        assert!(generator.next().is_none());
        assert!(!line.points.is_empty());
        assert!(line.points.iter().all(|p| p.x >= 0 && p.x < 4 && p.y >= 0 && p.y < 4));

        let mut canvas = Plane::filled(4, 4, 255);
        let before = canvas.total_luminosity();
        canvas.apply(&line.points, line.weight);

        assert_eq!(before - canvas.total_luminosity(), 50 * line.points.len() as u64);
    }

    #[test]
    fn starts_from_the_single_dark_pixel() {
        let mut plane = Plane::filled(10, 10, 255);
        plane.apply(&[Point::new(5, 5)], 255);

        assert_eq!(plane.darkest_pixels(), vec![Point::new(5, 5)]);

        let mut generator =
            Generator::new(plane, Channel::All, 3, &settings(10, 40), StdRng::seed_from_u64(3));
        let first = generator.next().unwrap().unwrap();

        assert_eq!(first.pivot, Point::new(5, 5));
    }

    #[test]
    fn remaining_darkness_never_grows() {
        let data = (0..24 * 24).map(|i| ((i * 7) % 200) as u8).collect();
        let plane = Plane::new(24, 24, data).unwrap();
        let mut generator =
            Generator::new(plane, Channel::All, 40, &settings(8, 30), StdRng::seed_from_u64(4));
        let mut demand = generator.plane().ink_demand();

        while let Some(line) = generator.next() {
            line.unwrap();
            let next = generator.plane().ink_demand();
            assert!(next <= demand);
            demand = next;
        }
    }

    #[test]
    fn erases_along_the_emitted_line() {
        let plane = Plane::filled(12, 9, 100);
        let mut generator =
            Generator::new(plane, Channel::All, 1, &settings(4, 30), StdRng::seed_from_u64(5));
        let line = generator.next().unwrap().unwrap();
        let plane = generator.into_plane();

        for p in &line.points {
            assert_eq!(plane.get(*p), Some(130));
        }

        let touched = plane.as_raw().iter().filter(|&&v| v == 130).count();
        assert_eq!(touched, line.points.len());
    }

    #[test]
    fn channel_components() {
        assert_eq!(Channel::Red.component(), Some(0));
        assert_eq!(Channel::Blue.component(), Some(2));
        assert_eq!(Channel::All.component(), None);
    }
}
