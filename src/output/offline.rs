//! Offline output
//!
//! A deterministic output whose clock only moves when [`OfflineOutput::advance`]
//! is called. Rendered audio is kept in memory and every submitted trigger is
//! logged, which makes scheduling behavior observable without a sound card.
//!
//! The handle is cheap to clone; clones share the same clock and buffers, so
//! one clone can be handed to the scheduler while another inspects results.

use super::mixer::Mixer;
use super::{AudioOutput, OutputState};
use crate::config::EngineConfig;
use crate::engine::Layer;
use crate::error::Result;
use crate::synth::Patch;
use std::cell::RefCell;
use std::rc::Rc;

/// A trigger as it was handed to the output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerRecord {
    pub layer: Layer,
    pub time: f64,
    pub volume: f32,
}

#[derive(Debug)]
struct OfflineInner {
    mixer: Mixer,
    state: OutputState,
    block_size: usize,
    block: Vec<f32>,
    rendered: Vec<f32>,
    triggers: Vec<TriggerRecord>,
}

/// Manually clocked output rendering into memory
#[derive(Debug, Clone)]
pub struct OfflineOutput {
    inner: Rc<RefCell<OfflineInner>>,
}

impl OfflineOutput {
    /// Create a suspended offline output
    ///
    /// # Arguments
    /// * `sample_rate` - Clock and render rate in Hz
    /// * `block_size` - Frames rendered per block
    pub fn new(sample_rate: u32, block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            inner: Rc::new(RefCell::new(OfflineInner {
                mixer: Mixer::new(sample_rate),
                state: OutputState::Suspended,
                block_size,
                block: vec![0.0; block_size],
                rendered: Vec::new(),
                triggers: Vec::new(),
            })),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.offline_sample_rate, config.render_block_size)
    }

    /// Move the clock forward by `seconds`, rendering every frame on the way
    ///
    /// Does nothing while suspended.
    pub fn advance(&self, seconds: f64) {
        let mut inner = self.inner.borrow_mut();
        if inner.state == OutputState::Suspended {
            return;
        }

        let sample_rate = inner.mixer.sample_rate() as f64;
        let mut remaining = (seconds.max(0.0) * sample_rate).round() as usize;
        let OfflineInner {
            mixer,
            block,
            rendered,
            block_size,
            ..
        } = &mut *inner;

        while remaining > 0 {
            let len = remaining.min(*block_size);
            mixer.render(&mut block[..len]);
            rendered.extend_from_slice(&block[..len]);
            remaining -= len;
        }
    }

    /// Freeze the clock, as a host does when audio is paused
    pub fn suspend(&self) {
        self.inner.borrow_mut().state = OutputState::Suspended;
    }

    /// Every trigger submitted so far, in submission order
    pub fn triggers(&self) -> Vec<TriggerRecord> {
        self.inner.borrow().triggers.clone()
    }

    /// Triggers submitted for one layer
    pub fn triggers_for(&self, layer: Layer) -> Vec<TriggerRecord> {
        self.inner
            .borrow()
            .triggers
            .iter()
            .filter(|t| t.layer == layer)
            .copied()
            .collect()
    }

    /// All audio rendered so far (mono)
    pub fn rendered(&self) -> Vec<f32> {
        self.inner.borrow().rendered.clone()
    }

    /// Patches not yet reclaimed
    pub fn live_patches(&self) -> usize {
        self.inner.borrow().mixer.live_patches()
    }
}

impl AudioOutput for OfflineOutput {
    fn current_time(&self) -> f64 {
        self.inner.borrow().mixer.current_time()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.borrow().mixer.sample_rate()
    }

    fn state(&self) -> OutputState {
        self.inner.borrow().state
    }

    fn resume(&mut self) -> Result<()> {
        self.inner.borrow_mut().state = OutputState::Running;
        Ok(())
    }

    fn submit(&mut self, patch: Patch) {
        let mut inner = self.inner.borrow_mut();
        if let Some(last) = inner.triggers.last() {
            if patch.time() < last.time {
                log::warn!(
                    "Trigger at {:.4}s submitted after one at {:.4}s",
                    patch.time(),
                    last.time
                );
            }
        }
        inner.triggers.push(TriggerRecord {
            layer: patch.layer(),
            time: patch.time(),
            volume: patch.volume(),
        });
        inner.mixer.add(patch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::Synthesizer;

    #[test]
    fn test_starts_suspended_and_frozen() {
        let output = OfflineOutput::new(1000, 64);
        assert_eq!(output.state(), OutputState::Suspended);
        output.advance(1.0);
        assert_eq!(output.current_time(), 0.0);
        assert!(output.rendered().is_empty());
    }

    #[test]
    fn test_advance_renders_frames() {
        let mut output = OfflineOutput::new(1000, 64);
        output.resume().unwrap();
        output.advance(0.5);
        assert_eq!(output.current_time(), 0.5);
        assert_eq!(output.rendered().len(), 500);
    }

    #[test]
    fn test_clones_share_state() {
        let mut output = OfflineOutput::new(48000, 128);
        let observer = output.clone();
        output.resume().unwrap();

        let patch = Synthesizer::with_seed(5).synthesize(Layer::Eighth, 0.01, 0.5, 48000);
        output.submit(patch);
        observer.advance(0.2);

        let triggers = observer.triggers();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].layer, Layer::Eighth);
        assert_eq!(triggers[0].volume, 0.5);
        assert!(observer.rendered().iter().any(|&s| s.abs() > 0.1));
        assert_eq!(observer.live_patches(), 0);
    }

    #[test]
    fn test_suspend_freezes_clock() {
        let mut output = OfflineOutput::new(1000, 64);
        output.resume().unwrap();
        output.advance(0.1);
        output.suspend();
        output.advance(0.1);
        assert_eq!(output.current_time(), 0.1);
    }
}
