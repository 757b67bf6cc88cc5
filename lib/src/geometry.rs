use crate::error::{Error, Result};
use crate::point::{Bounds, Point};

// Slack for crossings that land a rounding error outside an edge.
const EPSILON: f64 = 1e-9;

/// Returns the two points where the infinite line through `pivot` leaves `bounds`.
///
/// The slope is measured with the y axis pointing up, i.e. the line is
/// `y = pivot.y - slope * (x - pivot.x)` in image coordinates. Crossings are
/// computed on the rectangle spanned by the outermost pixel centers and are
/// checked edge by edge in the order top, left, bottom, right. The first valid
/// crossing is the start; the end is the later crossing farthest from it, so
/// that a corner reported by two adjacent edges is not picked twice.
///
/// A line that merely grazes a corner pixel yields a single point as both
/// start and end. A line without any valid crossing is a broken precondition
/// (pivot outside the image or a NaN slope) and reported as
/// [`Error::Geometry`].
pub fn intersect(bounds: Bounds, pivot: Point, slope: f64) -> Result<(Point, Point)> {
    let fail = || Error::Geometry {
        pivot,
        slope,
        bounds,
    };

    if bounds.is_empty() || !bounds.contains(pivot) {
        return Err(fail());
    }

    let right = f64::from(bounds.width - 1);
    let bottom = f64::from(bounds.height - 1);
    let px = f64::from(pivot.x);
    let py = f64::from(pivot.y);

    let crossings = [
        (px + py / slope, 0.0),
        (0.0, py + slope * px),
        (px - (bottom - py) / slope, bottom),
        (right, py - slope * (right - px)),
    ];

    let in_range = |&(x, y): &(f64, f64)| {
        (-EPSILON..=right + EPSILON).contains(&x) && (-EPSILON..=bottom + EPSILON).contains(&y)
    };

    let to_lattice = |(x, y): (f64, f64)| {
        Point::new(
            x.round().clamp(0.0, right) as i32,
            y.round().clamp(0.0, bottom) as i32,
        )
    };

    let mut valid = crossings.into_iter().filter(in_range).map(to_lattice);
    let start = valid.next().ok_or_else(fail)?;

    let end = valid.fold(start, |farthest, candidate| {
        if candidate.distance_squared(&start) > farthest.distance_squared(&start) {
            candidate
        } else {
            farthest
        }
    });

    Ok((start, end))
}

/// Rasterizes the segment from `start` to `end` (both inclusive) with
/// Bresenham's error-accumulation stepping. Consecutive points are
/// 8-connected and the result has `max(|dx|, |dy|) + 1` points.
pub fn rasterize(start: Point, end: Point) -> Vec<Point> {
    let dx = (end.x - start.x).abs();
    let dy = -(end.y - start.y).abs();
    let sx = if start.x < end.x { 1 } else { -1 };
    let sy = if start.y < end.y { 1 } else { -1 };

    let mut points = Vec::with_capacity(dx.max(-dy) as usize + 1);
    let mut err = dx + dy;
    let mut current = start;

    loop {
        points.push(current);

        if current == end {
            return points;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            err += dy;
            current.x += sx;
        }

        if e2 <= dx {
            err += dx;
            current.y += sy;
        }
    }
}
