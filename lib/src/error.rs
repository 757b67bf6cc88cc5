use crate::point::{Bounds, Point};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error(
        "line through ({}, {}) with slope {slope} does not cross the {}x{} image",
        .pivot.x, .pivot.y, .bounds.width, .bounds.height
    )]
    Geometry {
        pivot: Point,
        slope: f64,
        bounds: Bounds,
    },

    #[error("invalid plane: {0}")]
    Plane(String),

    #[error("luminosity overflow while scoring a line of {0} points")]
    LuminosityOverflow(usize),

    #[error("invalid settings: {0}")]
    Settings(String),

    #[error("frame sink error: {0}")]
    Frame(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }

    pub fn plane(msg: impl Into<String>) -> Self {
        Self::Plane(msg.into())
    }

    pub fn frame(msg: impl Into<String>) -> Self {
        Self::Frame(msg.into())
    }
}
