use anyhow::{Context, Result};
use clap::Parser;
use linepix::video::{EncodeConfig, FfmpegSink, Recorder};
use linepix::{codec, Settings};
use log::{info, warn};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(version, about = "Redraw an image with thousands of straight lines")]
pub struct Options {
    #[arg(long, short)]
    input: PathBuf,

    /// PNG file to write
    #[arg(long, short)]
    output: PathBuf,

    /// JSON file with engine settings, flags given here take precedence
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[arg(long, short = 'n')]
    lines: Option<usize>,

    /// Slopes tried per line
    #[arg(long, short)]
    trials: Option<usize>,

    /// Ink taken away by each line, 1 to 255
    #[arg(long, short)]
    weight: Option<i32>,

    #[arg(long)]
    color: bool,

    #[arg(long)]
    seed: Option<u64>,

    /// Resize width before drawing, 0 keeps the aspect ratio
    #[arg(long, default_value = "0")]
    width: u32,

    /// Resize height before drawing, 0 keeps the aspect ratio
    #[arg(long, default_value = "0")]
    height: u32,

    /// Record the drawing process to this video file with ffmpeg
    #[arg(long)]
    video: Option<PathBuf>,

    #[arg(long, default_value = "60")]
    fps: u32,

    /// Lines drawn between two video frames
    #[arg(long, default_value = "1")]
    frame_every: usize,
}

impl Options {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => {
                let fh = File::open(path)
                    .with_context(|| format!("Cannot open settings {}", path.display()))?;
                serde_json::from_reader(fh)
                    .with_context(|| format!("Cannot parse settings {}", path.display()))?
            }
            None => Settings::default(),
        };

        if let Some(lines) = self.lines {
            settings.lines = lines;
        }

        if let Some(trials) = self.trials {
            settings.trials = trials;
        }

        if let Some(weight) = self.weight {
            settings.weight = weight;
        }

        if self.seed.is_some() {
            settings.seed = self.seed;
        }

        settings.color |= self.color;
        settings.validate()?;

        Ok(settings)
    }

    fn recorder(&self, width: u32, height: u32) -> Option<Recorder> {
        let path = self.video.as_ref()?;
        let cfg = EncodeConfig {
            width,
            height,
            fps: self.fps,
            out_path: path.clone(),
        };

        match FfmpegSink::spawn(cfg) {
            Ok(sink) => Some(Recorder::new(Box::new(sink), self.frame_every)),
            Err(err) => {
                warn!("Not recording video: {err}");
                None
            }
        }
    }
}

struct Progress {
    started: Instant,
    reported: Instant,
}

impl Progress {
    const INTERVAL: Duration = Duration::from_secs(2);

    fn new() -> Self {
        let now = Instant::now();

        Self {
            started: now,
            reported: now,
        }
    }

    fn update(&mut self, drawn: usize, total: usize) {
        if drawn < total && self.reported.elapsed() < Self::INTERVAL {
            return;
        }

        self.reported = Instant::now();

        let elapsed = self.started.elapsed();
        let done = drawn as f64 / total.max(1) as f64;
        let eta = if done > 0.0 {
            elapsed.mul_f64((1.0 - done) / done)
        } else {
            Duration::ZERO
        };

        info!(
            "{drawn}/{total} lines ({:.1}%), {}s elapsed, {}s left",
            done * 100.0,
            elapsed.as_secs(),
            eta.as_secs()
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let opt = Options::parse();
    let settings = opt.settings()?;

    let img = codec::open(&opt.input)
        .with_context(|| format!("Cannot read {}", opt.input.display()))?;
    let img = codec::resize(&img, opt.width, opt.height);

    let mut output = File::create(&opt.output)
        .with_context(|| format!("Cannot create {}", opt.output.display()))?;

    let mut recorder = opt.recorder(img.width(), img.height());
    let mut progress = Progress::new();

    let drawing = linepix::draw(&img, &settings, |canvas, drawn, total| {
        if let Some(recorder) = recorder.as_mut() {
            recorder.capture(canvas, drawn);
        }

        progress.update(drawn, total);
    });

    let drawing = match drawing {
        Ok(drawing) => drawing,
        Err(err) => {
            drop(output);
            std::fs::remove_file(&opt.output).ok();
            return Err(err.into());
        }
    };

    output.write_all(&codec::encode_png(&drawing.canvas.into_image())?)?;
    info!("Wrote {} lines to {}", drawing.lines, opt.output.display());

    if let Some(recorder) = recorder {
        match recorder.finish() {
            Ok(frames) => info!("Recorded {frames} frames"),
            Err(err) => warn!("Video is incomplete: {err}"),
        }
    }

    Ok(())
}
