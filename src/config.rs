use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Pitch slots per frame.
    pub n_notes: usize,
    /// Offset added to a slot index to get the absolute MIDI pitch.
    /// 21 maps slot 0 to A0, the lowest key of an 88-key piano.
    pub transposition: u8,
    pub channel: u8,
    /// Outgoing NoteOn velocity. Fixed; activation magnitude is not mapped
    /// to velocity.
    pub velocity: u8,
    /// Drop frames whose timestamp is already behind the clock.
    pub discard_late: bool,
    /// Seconds per logical-clock tick.
    pub clock_resolution: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            n_notes: 88,
            transposition: 21,
            channel: 0,
            velocity: 100,
            discard_late: false,
            clock_resolution: 0.1,
        }
    }
}

impl SessionConfig {
    /// How long the dispatcher waits before re-checking a not-yet-due
    /// event: half a clock tick, never below a millisecond.
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs_f64((self.clock_resolution / 2.0).max(0.001))
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let ron_string = fs::read_to_string(path)?;
        let config: SessionConfig = ron::from_str(&ron_string)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, ron_string)?;
        Ok(())
    }
}
