use crate::canvas::Canvas;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

/// Receiver of canvas snapshots, four bytes per pixel, RGBA, row-major.
pub trait FrameSink {
    fn push(&mut self, frame: &[u8]) -> Result<()>;

    fn finish(self: Box<Self>) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
}

impl EncodeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::frame("video width/height must be non-zero"));
        }

        if self.fps == 0 {
            return Err(Error::frame("video fps must be non-zero"));
        }

        Ok(())
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Pipes raw frames into an `ffmpeg` child process producing an H.264 video.
pub struct FfmpegSink {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
}

impl FfmpegSink {
    pub fn spawn(cfg: EncodeConfig) -> Result<Self> {
        cfg.validate()?;

        if !is_ffmpeg_on_path() {
            return Err(Error::frame("ffmpeg was not found on PATH"));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args([
                "-y",
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "-s",
                &format!("{}x{}", cfg.width, cfg.height),
                "-r",
                &cfg.fps.to_string(),
                "-i",
                "pipe:0",
                "-an",
                "-c:v",
                "libx264",
                "-crf",
                "18",
                "-preset",
                "veryslow",
            ])
            .arg(&cfg.out_path);

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::frame(format!("failed to spawn ffmpeg: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::frame("failed to open ffmpeg stdin"))?;

        debug!("Spawned ffmpeg writing to {}", cfg.out_path.display());

        Ok(Self {
            cfg,
            child,
            stdin: Some(stdin),
        })
    }
}

impl FrameSink for FfmpegSink {
    fn push(&mut self, frame: &[u8]) -> Result<()> {
        if frame.len() != self.cfg.frame_len() {
            return Err(Error::frame(format!(
                "frame has {} bytes, expected {} for {}x{}",
                frame.len(),
                self.cfg.frame_len(),
                self.cfg.width,
                self.cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(Error::frame("ffmpeg encoder is already finalized"));
        };

        stdin
            .write_all(frame)
            .map_err(|e| Error::frame(format!("failed to write frame to ffmpeg: {e}")))
    }

    fn finish(mut self: Box<Self>) -> Result<()> {
        drop(self.stdin.take());

        let output = self.child.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::frame(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Feeds every n-th canvas state to a frame sink.
///
/// A failing sink is logged and dropped, the drawing itself carries on.
pub struct Recorder {
    sink: Option<Box<dyn FrameSink>>,
    every: usize,
    frame: Vec<u8>,
    frames: usize,
}

impl Recorder {
    pub fn new(sink: Box<dyn FrameSink>, every: usize) -> Self {
        Self {
            sink: Some(sink),
            every: every.max(1),
            frame: Vec::new(),
            frames: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.sink.is_some()
    }

    /// Records the canvas if `drawn` lines fall on the frame interval.
    pub fn capture(&mut self, canvas: &Canvas, drawn: usize) {
        if drawn % self.every != 0 {
            return;
        }

        let Some(sink) = self.sink.as_mut() else {
            return;
        };

        canvas.write_rgba(&mut self.frame);

        if let Err(err) = sink.push(&self.frame) {
            warn!("Video capture disabled after {} frames: {err}", self.frames);
            self.abandon();
            return;
        }

        self.frames += 1;
    }

    fn abandon(&mut self) {
        if let Some(sink) = self.sink.take() {
            if let Err(err) = sink.finish() {
                debug!("Frame sink failed while closing: {err}");
            }
        }
    }

    /// Closes the sink and returns the number of frames it accepted.
    pub fn finish(mut self) -> Result<usize> {
        if let Some(sink) = self.sink.take() {
            sink.finish()?;
        }

        Ok(self.frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{Channel, Line};
    use crate::point::Point;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MemorySink {
        frames: Arc<Mutex<Vec<Vec<u8>>>>,
        fail_after: Option<usize>,
    }

    impl FrameSink for MemorySink {
        fn push(&mut self, frame: &[u8]) -> Result<()> {
            let mut frames = self.frames.lock().unwrap();

            if Some(frames.len()) == self.fail_after {
                return Err(Error::frame("full"));
            }

            frames.push(frame.to_vec());
            Ok(())
        }

        fn finish(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn config_validation_catches_bad_values() {
        let cfg = EncodeConfig {
            width: 0,
            height: 10,
            fps: 30,
            out_path: PathBuf::from("out.mp4"),
        };

        assert!(cfg.validate().is_err());
        assert!(EncodeConfig { width: 10, fps: 0, ..cfg.clone() }.validate().is_err());
        assert!(EncodeConfig { width: 10, ..cfg }.validate().is_ok());
    }

    #[test]
    fn records_every_nth_state() {
        let sink = MemorySink::default();
        let frames = sink.frames.clone();
        let mut recorder = Recorder::new(Box::new(sink), 2);
        let mut canvas = Canvas::blank(2, 2, true);

        for drawn in 1..=5 {
            canvas.draw(&Line {
                points: vec![Point::new(0, 0)],
                weight: 10,
                channel: Channel::Red,
                pivot: Point::origin(),
            });
            recorder.capture(&canvas, drawn);
        }

        assert_eq!(recorder.finish().unwrap(), 2);

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].len(), 16);
        assert_eq!(&frames[0][..4], &[235, 255, 255, 255]);
        assert_eq!(&frames[1][..4], &[215, 255, 255, 255]);
    }

    #[test]
    fn failing_sink_is_dropped() {
        let sink = MemorySink {
            fail_after: Some(1),
            ..Default::default()
        };
        let frames = sink.frames.clone();
        let mut recorder = Recorder::new(Box::new(sink), 1);
        let canvas = Canvas::blank(1, 1, false);

        recorder.capture(&canvas, 1);
        recorder.capture(&canvas, 2);
        assert!(!recorder.is_active());

        recorder.capture(&canvas, 3);
        assert_eq!(recorder.finish().unwrap(), 1);
        assert_eq!(frames.lock().unwrap().len(), 1);
    }
}
