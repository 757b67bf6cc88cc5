use crate::error::Result;
use crate::plane::Plane;
use image::{DynamicImage, GrayImage, RgbaImage};

/// Replaces every pixel that is not fully opaque with opaque white.
pub fn flatten_transparency(img: &RgbaImage) -> RgbaImage {
    let mut flat = img.clone();

    for pixel in flat.pixels_mut() {
        if pixel[3] < 0xff {
            pixel.0 = [0xff; 4];
        }
    }

    flat
}

/// Red, green and blue components as separate planes.
pub fn split_rgb(img: &RgbaImage) -> Result<[Plane; 3]> {
    let (width, height) = img.dimensions();
    let mut channels = [Vec::new(), Vec::new(), Vec::new()];

    for channel in channels.iter_mut() {
        channel.reserve_exact(width as usize * height as usize);
    }

    for pixel in img.pixels() {
        for (channel, value) in channels.iter_mut().zip(pixel.0) {
            channel.push(value);
        }
    }

    let [red, green, blue] = channels;

    Ok([
        Plane::new(width, height, red)?,
        Plane::new(width, height, green)?,
        Plane::new(width, height, blue)?,
    ])
}

/// Planes for a color run: transparency flattened to white, then split.
pub fn color_planes(img: &DynamicImage) -> Result<[Plane; 3]> {
    split_rgb(&flatten_transparency(&img.to_rgba8()))
}

pub fn gray_plane(img: &DynamicImage) -> Result<Plane> {
    let gray: GrayImage = img.to_luma8();
    Plane::from_gray(&gray)
}
