use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer lattice position of a pixel.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    pub fn origin() -> Self {
        Point::new(0, 0)
    }

    /// Squared euclidean distance, exact in integer arithmetic.
    pub fn distance_squared(&self, other: &Self) -> i64 {
        let xs = i64::from(self.x - other.x);
        let ys = i64::from(self.y - other.y);
        (xs * xs) + (ys * ys)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Pixel extent of an image with its origin at (0, 0).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(width: u32, height: u32) -> Self {
        Bounds { width, height }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as u32) < self.width && (p.y as u32) < self.height
    }

    /// True if `p` lies on the outermost ring of pixels.
    pub fn on_edge(&self, p: Point) -> bool {
        self.contains(p)
            && (p.x == 0
                || p.y == 0
                || p.x as u32 == self.width - 1
                || p.y as u32 == self.height - 1)
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Row-major offset of `p`; `p` must be contained.
    pub fn index(&self, p: Point) -> usize {
        p.y as usize * self.width as usize + p.x as usize
    }
}
