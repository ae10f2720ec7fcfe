//! Silent output
//!
//! Stands in when no audio device can be opened. Its clock follows wall time
//! so the playhead keeps moving; every patch is discarded.

use super::{AudioOutput, OutputState};
use crate::error::Result;
use crate::synth::Patch;
use std::time::Instant;

/// Wall-clock output that plays nothing
#[derive(Debug)]
pub struct NullOutput {
    epoch: Instant,
    sample_rate: u32,
}

impl NullOutput {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            epoch: Instant::now(),
            sample_rate,
        }
    }
}

impl Default for NullOutput {
    fn default() -> Self {
        Self::new(48000)
    }
}

impl AudioOutput for NullOutput {
    fn current_time(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn state(&self) -> OutputState {
        OutputState::Running
    }

    fn resume(&mut self) -> Result<()> {
        Ok(())
    }

    fn submit(&mut self, patch: Patch) {
        log::trace!("Discarding {} trigger at {:.3}s", patch.layer(), patch.time());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Layer;
    use crate::synth::Synthesizer;

    #[test]
    fn test_clock_moves_forward() {
        let output = NullOutput::default();
        let first = output.current_time();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(output.current_time() > first);
        assert_eq!(output.state(), OutputState::Running);
    }

    #[test]
    fn test_submit_is_harmless() {
        let mut output = NullOutput::new(44100);
        let patch = Synthesizer::with_seed(0).synthesize(Layer::Half, 0.0, 0.5, 44100);
        output.submit(patch);
        assert!(output.resume().is_ok());
        assert_eq!(output.sample_rate(), 44100);
    }
}
