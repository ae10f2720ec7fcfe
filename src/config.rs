//! Engine configuration
//!
//! Timing constants of the look-ahead loop and the transport defaults.
//! Loaded from JSON; every field is optional and falls back to its default.

use crate::engine::{is_valid_tempo, Layer, LayerSet, DEFAULT_TEMPO};
use crate::error::{Result, RhythmError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Lowest sample rate the synthesis filters are designed for
pub const MIN_SAMPLE_RATE: u32 = 8000;

/// Configuration for the scheduler and the offline renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Period of the recurring look-ahead pass in milliseconds
    pub lookahead_interval_ms: u64,
    /// How far ahead of the output clock each pass schedules, in seconds
    pub schedule_ahead_secs: f64,
    /// Delay between `start()` and the first onset, in seconds
    pub start_offset_secs: f64,
    /// Initial tempo in beats per minute
    pub tempo: f64,
    /// Initial master volume (0.0 to 1.0)
    pub volume: f32,
    /// Layers active at startup
    pub active_layers: LayerSet,
    /// Sample rate used by the offline output
    pub offline_sample_rate: u32,
    /// Frames rendered per block by the offline output
    pub render_block_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookahead_interval_ms: 25,
            schedule_ahead_secs: 0.1,
            start_offset_secs: 0.1,
            tempo: DEFAULT_TEMPO,
            volume: 0.5,
            active_layers: [Layer::Quarter, Layer::Sixteenth].into(),
            offline_sample_rate: 48000,
            render_block_size: 128,
        }
    }
}

impl EngineConfig {
    /// Load a configuration file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::debug!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Period of the recurring pass as a [`Duration`]
    pub fn lookahead_interval(&self) -> Duration {
        Duration::from_millis(self.lookahead_interval_ms)
    }

    /// Check that every field is usable
    pub fn validate(&self) -> Result<()> {
        if let Some((field, reason)) = self.problems().into_iter().next() {
            return Err(invalid(field, reason));
        }

        // A horizon shorter than the pass period leaves gaps between passes
        let interval_secs = self.lookahead_interval_ms as f64 / 1000.0;
        if self.schedule_ahead_secs <= interval_secs {
            log::warn!(
                "schedule_ahead_secs ({:.3}) does not cover the pass interval ({:.3}s); expect late onsets",
                self.schedule_ahead_secs,
                interval_secs
            );
        }
        Ok(())
    }

    /// Replace every unusable field with its default
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        for (field, reason) in self.problems() {
            log::warn!("Config field '{}' {}; using the default", field, reason);
            match field {
                "lookahead_interval_ms" => self.lookahead_interval_ms = defaults.lookahead_interval_ms,
                "schedule_ahead_secs" => self.schedule_ahead_secs = defaults.schedule_ahead_secs,
                "start_offset_secs" => self.start_offset_secs = defaults.start_offset_secs,
                "tempo" => self.tempo = defaults.tempo,
                "volume" => self.volume = defaults.volume,
                "offline_sample_rate" => self.offline_sample_rate = defaults.offline_sample_rate,
                _ => self.render_block_size = defaults.render_block_size,
            }
        }
        self
    }

    /// Every unusable field with the reason, in declaration order
    fn problems(&self) -> Vec<(&'static str, &'static str)> {
        let mut problems = Vec::new();
        if self.lookahead_interval_ms == 0 {
            problems.push(("lookahead_interval_ms", "must be at least 1 ms"));
        }
        if !(self.schedule_ahead_secs.is_finite() && self.schedule_ahead_secs > 0.0) {
            problems.push(("schedule_ahead_secs", "must be a positive number"));
        }
        if !(self.start_offset_secs.is_finite() && self.start_offset_secs >= 0.0) {
            problems.push(("start_offset_secs", "must not be negative"));
        }
        if !is_valid_tempo(self.tempo) {
            problems.push(("tempo", "must be a positive number"));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            problems.push(("volume", "must be within 0.0-1.0"));
        }
        if self.offline_sample_rate < MIN_SAMPLE_RATE {
            problems.push(("offline_sample_rate", "must be at least 8000 Hz"));
        }
        if self.render_block_size == 0 {
            problems.push(("render_block_size", "must be positive"));
        }
        problems
    }
}

fn invalid(field: &str, reason: &str) -> RhythmError {
    RhythmError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
