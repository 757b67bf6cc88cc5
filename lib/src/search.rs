use crate::error::Result;
use crate::geometry::{intersect, rasterize};
use crate::plane::Plane;
use crate::point::Point;
use log::trace;
use rand::Rng;

/// Draws a slope as the ratio of two independent uniform samples centered at
/// zero.
///
/// The distribution is symmetric but not uniform over angles: half of the
/// mass lies in `[-1, 1]`, the rest is spread over steep slopes with a heavy
/// tail. The generated artwork depends on this shape, so it is kept as is.
pub fn random_slope<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let slope = (rng.gen::<f64>() - 0.5) / (rng.gen::<f64>() - 0.5);

        // 0/0, vanishingly rare
        if !slope.is_nan() {
            return slope;
        }
    }
}

fn random_chord<R: Rng + ?Sized>(
    plane: &Plane,
    pivot: Point,
    rng: &mut R,
) -> Result<(f64, Vec<Point>)> {
    let slope = random_slope(rng);
    let (start, end) = intersect(plane.bounds(), pivot, slope)?;
    let points = rasterize(start, end);
    let mean = plane.mean_luminosity(&points)?;

    trace!("slope {slope:.3} from {start:?} to {end:?} has mean {mean:.1}");
    Ok((mean, points))
}

/// Samples `trials` random chords through `pivot` and returns the points of
/// the one with the lowest mean brightness. Earlier candidates win ties. At
/// least one chord is always tried.
pub fn darkest_line<R: Rng + ?Sized>(
    plane: &Plane,
    pivot: Point,
    trials: usize,
    rng: &mut R,
) -> Result<Vec<Point>> {
    let (mut lowest, mut best) = random_chord(plane, pivot, rng)?;

    for _ in 1..trials {
        let (mean, points) = random_chord(plane, pivot, rng)?;

        if mean < lowest {
            lowest = mean;
            best = points;
        }
    }

    Ok(best)
}
