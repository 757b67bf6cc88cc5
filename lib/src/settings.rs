use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Engine parameters, deserializable from JSON with every field optional.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Requested number of lines. In color mode this is the budget of the
    /// channel with the highest ink demand, the others get a share of it.
    pub lines: usize,

    /// Random slopes tried per line.
    pub trials: usize,

    /// Brightness every drawn line takes away from the pixels it covers.
    pub weight: i32,

    /// Draw red, green and blue lines on an RGBA canvas instead of gray lines.
    pub color: bool,

    /// Seed for reproducible runs, taken from the OS when unset.
    pub seed: Option<u64>,

    /// Lines that may queue up between the generators and the renderer.
    pub queue_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lines: 2000,
            trials: 100,
            weight: 32,
            color: false,
            seed: None,
            queue_capacity: 256,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(Error::settings("trials must be at least 1"));
        }

        if !(1..=255).contains(&self.weight) {
            return Err(Error::settings(format!(
                "weight must be within 1..=255, got {}",
                self.weight
            )));
        }

        if self.queue_capacity == 0 {
            return Err(Error::settings("queue capacity must be at least 1"));
        }

        Ok(())
    }
}
