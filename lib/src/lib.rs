pub mod canvas;
pub mod codec;
pub mod color;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod pipeline;
pub mod plane;
pub mod point;
pub mod search;
pub mod settings;
pub mod video;

pub use error::{Error, Result};
pub use settings::Settings;

use canvas::Canvas;
use generator::Channel;
use image::{DynamicImage, GenericImageView};
use log::info;
use pipeline::Job;

/// Finished artwork and the number of lines that went into it.
pub struct Drawing {
    pub canvas: Canvas,
    pub lines: usize,
}

/// Generator jobs for `img`: a single gray one, or one per color component
/// with budgets split by ink demand.
pub fn jobs(img: &DynamicImage, settings: &Settings) -> Result<Vec<Job>> {
    if settings.color {
        let planes = color::color_planes(img)?;
        Ok(pipeline::color_jobs(planes, settings.lines))
    } else {
        let plane = color::gray_plane(img)?;
        Ok(vec![Job::new(plane, Channel::All, settings.lines)])
    }
}

/// Draws `img` as lines on a white canvas.
///
/// `on_line` sees the canvas after every line together with the number of
/// lines drawn so far and the total that will be drawn.
pub fn draw<F>(img: &DynamicImage, settings: &Settings, mut on_line: F) -> Result<Drawing>
where
    F: FnMut(&Canvas, usize, usize),
{
    settings.validate()?;

    let jobs = jobs(img, settings)?;
    let total = jobs.iter().map(|job| job.budget).sum();
    let (width, height) = img.dimensions();
    let mut canvas = Canvas::blank(width, height, settings.color);
    let mut drawn = 0;

    info!("Drawing {total} lines on a {width}x{height} canvas");

    let lines = pipeline::run(jobs, settings, |line| {
        canvas.draw(&line);
        drawn += 1;
        on_line(&canvas, drawn, total);
        Ok(())
    })?;

    Ok(Drawing { canvas, lines })
}
