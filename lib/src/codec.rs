use crate::error::{Error, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use log::{debug, info};
use std::io::Cursor;
use std::path::Path;

pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(Error::Decode)
}

pub fn open(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format();
    let img = reader.decode().map_err(Error::Decode)?;
    let (width, height) = img.dimensions();

    info!("Decoded {width}x{height} image ({format:?})");
    Ok(img)
}

/// Encodes to PNG, which round-trips 8-bit gray and RGBA losslessly.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();

    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(Error::Encode)?;

    Ok(bytes)
}

/// Target size for a resize request. A zero dimension follows the other one
/// so the aspect ratio is kept; both zero keeps the current size.
pub fn target_size(current: (u32, u32), width: u32, height: u32) -> (u32, u32) {
    let (cw, ch) = current;
    let scaled = |value: u32, num: u32, den: u32| {
        ((f64::from(value) * f64::from(num) / f64::from(den)).round() as u32).max(1)
    };

    match (width, height) {
        (0, 0) => current,
        (0, h) => (scaled(cw, h, ch), h),
        (w, 0) => (w, scaled(ch, w, cw)),
        (w, h) => (w, h),
    }
}

pub fn resize(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let current = img.dimensions();
    let (width, height) = target_size(current, width, height);

    if (width, height) == current {
        return img.clone();
    }

    debug!("Resizing {current:?} to {width}x{height}");
    img.resize_exact(width, height, FilterType::Lanczos3)
}
