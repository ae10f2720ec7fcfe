//! Procedural percussion
//!
//! Every layer maps to one timbre built from oscillators and noise; no
//! samples are involved. Building a sound has no lasting state beyond the
//! noise generator, so the same trigger always yields the same envelope,
//! pitch and duration.

mod patch;
mod recipes;

pub use patch::Patch;

use crate::engine::{Layer, Timbre};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Builds the patch for a layer trigger
#[derive(Debug, Clone)]
pub struct Synthesizer {
    rng: SmallRng,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synthesizer {
    /// Synthesizer with an entropy-seeded noise generator
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Synthesizer with reproducible noise
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Build the sound for `layer` starting at clock time `time`
    ///
    /// # Arguments
    /// * `layer` - Layer that fired
    /// * `time` - Onset on the output clock, in seconds
    /// * `volume` - Master volume (0.0 to 1.0)
    /// * `sample_rate` - Output sample rate, used for noise buffers and filters
    ///
    /// # Example
    /// ```
    /// use rhythmtree::engine::Layer;
    /// use rhythmtree::synth::Synthesizer;
    ///
    /// let mut synth = Synthesizer::with_seed(1);
    /// let patch = synth.synthesize(Layer::Quarter, 2.0, 0.5, 48000);
    /// assert_eq!(patch.time(), 2.0);
    /// assert_eq!(patch.stop_time(), 2.5);
    /// ```
    pub fn synthesize(&mut self, layer: Layer, time: f64, volume: f32, sample_rate: u32) -> Patch {
        let rng = &mut self.rng;
        let chains = match layer.timbre() {
            Timbre::Cymbal => recipes::cymbal(rng, time, volume, sample_rate),
            Timbre::Snare => recipes::snare(rng, time, volume, sample_rate),
            Timbre::Kick => recipes::kick(time, volume),
            Timbre::Woodblock => recipes::woodblock(time, volume),
            Timbre::HiHat => recipes::hi_hat(rng, time, volume, sample_rate),
            Timbre::Click => recipes::click(rng, time, volume, sample_rate),
        };
        Patch::new(layer, time, volume, chains)
    }
}
