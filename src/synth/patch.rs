//! Patch: the self-contained sound graph built for one trigger

use crate::dsp::Chain;
use crate::engine::Layer;

/// All chains sounding for one layer trigger
///
/// A patch owns everything it needs to render. Once the output clock passes
/// its stop time the output drops it; nothing else holds a reference.
#[derive(Debug, Clone)]
pub struct Patch {
    layer: Layer,
    time: f64,
    volume: f32,
    chains: Vec<Chain>,
}

impl Patch {
    pub fn new(layer: Layer, time: f64, volume: f32, chains: Vec<Chain>) -> Self {
        Self {
            layer,
            time,
            volume,
            chains,
        }
    }

    /// Layer that triggered this patch
    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// Onset time on the output clock
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Master volume at the time of the trigger
    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// Clock time after which every chain is silent
    pub fn stop_time(&self) -> f64 {
        self.chains
            .iter()
            .map(Chain::stop_time)
            .fold(self.time, f64::max)
    }

    /// Mix the patch into `out`, which covers frames starting at `first_frame`
    pub fn render_into(&mut self, out: &mut [f32], first_frame: u64, sample_rate: u32) {
        for chain in &mut self.chains {
            chain.render_into(out, first_frame, sample_rate);
        }
    }

    /// Whether the patch has nothing left to render from `frame` onward
    pub fn is_finished(&self, frame: u64, sample_rate: u32) -> bool {
        self.chains
            .iter()
            .all(|chain| chain.is_finished(frame, sample_rate))
    }
}
