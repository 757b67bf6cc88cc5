use crate::generator::Line;
use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};

/// Output image the lines are composited onto. Starts out white.
#[derive(Clone, Debug)]
pub enum Canvas {
    Gray(GrayImage),
    Rgba(RgbaImage),
}

fn ink(value: u8, weight: i32) -> u8 {
    (i32::from(value) - weight).clamp(0, 255) as u8
}

impl Canvas {
    pub fn blank(width: u32, height: u32, color: bool) -> Self {
        if color {
            Canvas::Rgba(RgbaImage::from_pixel(width, height, Rgba([0xff; 4])))
        } else {
            Canvas::Gray(GrayImage::from_pixel(width, height, Luma([0xff])))
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Canvas::Gray(img) => img.dimensions(),
            Canvas::Rgba(img) => img.dimensions(),
        }
    }

    /// Darkens the components selected by the line's channel by its weight.
    /// A gray canvas ignores the channel. Points must lie on the canvas.
    pub fn draw(&mut self, line: &Line) {
        match self {
            Canvas::Gray(img) => {
                for p in &line.points {
                    let pixel = img.get_pixel_mut(p.x as u32, p.y as u32);
                    pixel[0] = ink(pixel[0], line.weight);
                }
            }
            Canvas::Rgba(img) => {
                for p in &line.points {
                    let pixel = img.get_pixel_mut(p.x as u32, p.y as u32);

                    match line.channel.component() {
                        Some(c) => pixel[c] = ink(pixel[c], line.weight),
                        None => {
                            for value in pixel.0.iter_mut().take(3) {
                                *value = ink(*value, line.weight);
                            }
                        }
                    }

                    pixel[3] = 0xff;
                }
            }
        }
    }

    /// Writes the canvas as row-major RGBA, four bytes per pixel, into `frame`.
    pub fn write_rgba(&self, frame: &mut Vec<u8>) {
        frame.clear();

        match self {
            Canvas::Gray(img) => {
                frame.reserve(img.as_raw().len() * 4);

                for &value in img.as_raw() {
                    frame.extend_from_slice(&[value, value, value, 0xff]);
                }
            }
            Canvas::Rgba(img) => frame.extend_from_slice(img.as_raw()),
        }
    }

    pub fn into_image(self) -> DynamicImage {
        match self {
            Canvas::Gray(img) => DynamicImage::ImageLuma8(img),
            Canvas::Rgba(img) => DynamicImage::ImageRgba8(img),
        }
    }
}
