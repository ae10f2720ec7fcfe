//! Transport State for Rhythmtree
//!
//! Holds tempo, volume, the active layer set and the playhead. The playhead
//! is a 32nd-note step index within one measure plus the absolute clock time
//! at which that step sounds. All timing is derived from the tempo:
//! one beat is `60 / tempo` seconds, one 32nd note an eighth of that, and a
//! measure four beats.

use super::layer::{Layer, LayerSet, STEPS_PER_MEASURE};
use crate::config::EngineConfig;
use std::fmt;

/// Beats per measure (fixed 4/4)
pub const BEATS_PER_MEASURE: f64 = 4.0;

/// 32nd notes per beat
pub const STEPS_PER_BEAT: f64 = 8.0;

/// Tempo used when none or an unusable one is given
pub const DEFAULT_TEMPO: f64 = 80.0;

/// Whether `bpm` gives a positive, finite step duration
#[inline]
pub fn is_valid_tempo(bpm: f64) -> bool {
    bpm.is_finite() && bpm > 0.0
}

/// Duration of one beat in seconds
#[inline]
pub fn seconds_per_beat(tempo: f64) -> f64 {
    60.0 / tempo
}

/// Duration of one 32nd note in seconds
#[inline]
pub fn seconds_per_step(tempo: f64) -> f64 {
    seconds_per_beat(tempo) / STEPS_PER_BEAT
}

/// Duration of one measure in seconds
#[inline]
pub fn measure_duration(tempo: f64) -> f64 {
    seconds_per_beat(tempo) * BEATS_PER_MEASURE
}

/// Whether the transport is advancing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    /// Not advancing (default state)
    #[default]
    Stopped,
    /// Advancing and scheduling
    Running,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportState::Stopped => write!(f, "Stopped"),
            TransportState::Running => write!(f, "Running"),
        }
    }
}

/// Tempo, volume, active layers and playhead
#[derive(Debug, Clone)]
pub struct Transport {
    state: TransportState,

    /// Beats per minute
    tempo: f64,

    /// Master volume applied to new triggers
    volume: f32,

    active_layers: LayerSet,

    /// Next step to schedule, 0..32
    step: usize,

    /// Clock time at which `step` sounds
    next_event_time: f64,
}

impl Default for Transport {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl Transport {
    /// Create a stopped transport
    ///
    /// An unusable `tempo` is replaced by [`DEFAULT_TEMPO`].
    ///
    /// # Example
    /// ```
    /// use rhythmtree::engine::{Layer, Transport};
    ///
    /// let transport = Transport::new(120.0, 0.5, [Layer::Quarter].into());
    /// assert!(!transport.is_running());
    /// assert_eq!(transport.measure_duration(), 2.0);
    /// ```
    pub fn new(tempo: f64, volume: f32, active_layers: LayerSet) -> Self {
        let tempo = if is_valid_tempo(tempo) {
            tempo
        } else {
            log::warn!("[TRANSPORT] Invalid tempo {}, using {}", tempo, DEFAULT_TEMPO);
            DEFAULT_TEMPO
        };
        Self {
            state: TransportState::Stopped,
            tempo,
            volume,
            active_layers,
            step: 0,
            next_event_time: 0.0,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.tempo, config.volume, config.active_layers)
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Change the tempo for every step scheduled from now on
    ///
    /// Returns `false` and keeps the current tempo when `bpm` is not a finite
    /// positive number, since the step duration would not be positive.
    pub fn set_tempo(&mut self, bpm: f64) -> bool {
        if !is_valid_tempo(bpm) {
            log::warn!("[TRANSPORT] Ignoring tempo {} (keeping {})", bpm, self.tempo);
            return false;
        }
        self.tempo = bpm;
        true
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    pub fn set_active_layers(&mut self, layers: LayerSet) {
        self.active_layers = layers;
    }

    /// Flip one layer on or off, returning whether it is now active
    pub fn toggle_layer(&mut self, layer: Layer) -> bool {
        self.active_layers.toggle(layer)
    }

    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn active_layers(&self) -> LayerSet {
        self.active_layers
    }

    // ========================================================================
    // Transport Controls
    // ========================================================================

    /// Start from the top of the measure
    ///
    /// The first step sounds at `now + offset`. Returns `false` if already
    /// running, in which case nothing changes.
    pub fn start(&mut self, now: f64, offset: f64) -> bool {
        if self.state == TransportState::Running {
            log::debug!("[TRANSPORT] Already running");
            return false;
        }
        self.state = TransportState::Running;
        self.step = 0;
        self.next_event_time = now + offset;
        log::debug!(
            "[TRANSPORT] Start at {:.3}s, first step at {:.3}s, {} bpm",
            now,
            self.next_event_time,
            self.tempo
        );
        true
    }

    /// Stop advancing. Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        if self.state == TransportState::Stopped {
            return false;
        }
        self.state = TransportState::Stopped;
        log::debug!("[TRANSPORT] Stopped at step {}", self.step);
        true
    }

    /// Move the playhead one 32nd note forward, wrapping at the measure end
    pub fn advance(&mut self) {
        self.next_event_time += self.seconds_per_step();
        self.step = (self.step + 1) % STEPS_PER_MEASURE;
    }

    // ========================================================================
    // State Queries
    // ========================================================================

    pub fn is_running(&self) -> bool {
        self.state == TransportState::Running
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Next step to be scheduled (0..32)
    pub fn step(&self) -> usize {
        self.step
    }

    /// Clock time at which the current step sounds
    pub fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    /// Active layers with an onset at the current step
    pub fn due_layers(&self) -> impl Iterator<Item = Layer> + '_ {
        self.active_layers.firing_at(self.step)
    }

    /// Measure-relative playhead in [0, 1); 0 when stopped
    pub fn progress(&self) -> f64 {
        if !self.is_running() {
            return 0.0;
        }
        self.step as f64 / STEPS_PER_MEASURE as f64
    }

    pub fn seconds_per_step(&self) -> f64 {
        seconds_per_step(self.tempo)
    }

    pub fn measure_duration(&self) -> f64 {
        measure_duration(self.tempo)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
