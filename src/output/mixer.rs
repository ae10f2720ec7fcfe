//! Patch mixer
//!
//! Sums every live patch into mono blocks and keeps the frame counter that
//! serves as the output clock. Patches are dropped as soon as the clock has
//! passed their stop time; a realtime caller can take them back instead, so
//! their buffers are freed off the audio thread.

use crate::synth::Patch;

/// Mixes scheduled patches block by block
#[derive(Debug)]
pub struct Mixer {
    sample_rate: u32,
    frame: u64,
    patches: Vec<Patch>,
}

impl Mixer {
    pub fn new(sample_rate: u32) -> Self {
        Self::with_capacity(sample_rate, 64)
    }

    /// Mixer that holds up to `capacity` live patches without reallocating
    pub fn with_capacity(sample_rate: u32, capacity: usize) -> Self {
        Self {
            sample_rate,
            frame: 0,
            patches: Vec::with_capacity(capacity),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frames rendered so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Clock time of the next frame to be rendered, in seconds
    pub fn current_time(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }

    /// Number of patches still holding resources
    pub fn live_patches(&self) -> usize {
        self.patches.len()
    }

    /// Queue a patch; it sounds once the clock reaches its onset
    pub fn add(&mut self, patch: Patch) {
        self.patches.push(patch);
    }

    /// Render the next `out.len()` frames, overwriting `out`
    pub fn render(&mut self, out: &mut [f32]) {
        self.render_and_reclaim(out, drop);
    }

    /// Render like [`Mixer::render`], handing every finished patch to `reclaim`
    pub fn render_and_reclaim(&mut self, out: &mut [f32], mut reclaim: impl FnMut(Patch)) {
        out.fill(0.0);
        for patch in &mut self.patches {
            patch.render_into(out, self.frame, self.sample_rate);
        }
        self.frame += out.len() as u64;

        let mut i = 0;
        while i < self.patches.len() {
            if self.patches[i].is_finished(self.frame, self.sample_rate) {
                reclaim(self.patches.swap_remove(i));
            } else {
                i += 1;
            }
        }
    }
}
