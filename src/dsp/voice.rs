//! Voice chains
//!
//! A chain is one source routed through zero or more filters into an
//! automated gain stage, active between a start and a stop time on the output
//! clock. Chains are rendered block by block in clock order.

use super::biquad::Biquad;
use super::param::Automation;
use super::source::Source;

/// Convert a clock time to the first frame at or after it
#[inline]
pub fn time_to_frame(time: f64, sample_rate: u32) -> u64 {
    (time.max(0.0) * sample_rate as f64).ceil() as u64
}

/// Source -> filters -> gain, scheduled on the output clock
#[derive(Debug, Clone)]
pub struct Chain {
    source: Source,
    filters: Vec<Biquad>,
    gain: Automation,
    start_time: f64,
    stop_time: f64,
}

impl Chain {
    /// Create a chain
    ///
    /// # Arguments
    /// * `source` - Raw signal
    /// * `filters` - Filters applied in order
    /// * `gain` - Amplitude envelope
    /// * `start_time` - Clock time of the first sample
    /// * `stop_time` - Clock time after which the chain is silent and can be dropped
    pub fn new(
        source: Source,
        filters: Vec<Biquad>,
        gain: Automation,
        start_time: f64,
        stop_time: f64,
    ) -> Self {
        Self {
            source,
            filters,
            gain,
            start_time,
            stop_time: stop_time.max(start_time),
        }
    }

    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    pub fn gain(&self) -> &Automation {
        &self.gain
    }

    pub fn filters(&self) -> &[Biquad] {
        &self.filters
    }

    /// Mix this chain's output for frames `first_frame..first_frame + out.len()`
    /// into `out`
    pub fn render_into(&mut self, out: &mut [f32], first_frame: u64, sample_rate: u32) {
        let start_frame = time_to_frame(self.start_time, sample_rate);
        let stop_frame = time_to_frame(self.stop_time, sample_rate);
        let end_frame = first_frame + out.len() as u64;

        if end_frame <= start_frame || first_frame >= stop_frame {
            return;
        }

        let from = start_frame.max(first_frame);
        let to = stop_frame.min(end_frame);
        for frame in from..to {
            let t = frame as f64 / sample_rate as f64;
            let offset = (frame - start_frame) as usize;

            let mut sample = self.source.next_sample(offset, t, sample_rate);
            for filter in &mut self.filters {
                sample = filter.process(sample);
            }
            out[(frame - first_frame) as usize] += sample * self.gain.value_at(t);
        }
    }

    /// Whether the chain has no audible frames at or after `frame`
    pub fn is_finished(&self, frame: u64, sample_rate: u32) -> bool {
        frame >= time_to_frame(self.stop_time, sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::source::Waveform;

    fn dc_chain(start: f64, stop: f64) -> Chain {
        Chain::new(
            Source::buffer(vec![1.0; 1000]),
            Vec::new(),
            Automation::constant(0.5, start),
            start,
            stop,
        )
    }

    #[test]
    fn test_time_to_frame() {
        assert_eq!(time_to_frame(0.0, 1000), 0);
        assert_eq!(time_to_frame(0.0101, 1000), 11);
        assert_eq!(time_to_frame(-1.0, 1000), 0);
    }

    #[test]
    fn test_silent_before_start_and_after_stop() {
        let sr = 80;
        let mut chain = dc_chain(0.125, 0.25);
        let mut out = vec![0.0f32; 30];
        chain.render_into(&mut out, 0, sr);

        assert!(out[..10].iter().all(|&s| s == 0.0));
        assert!(out[10..20].iter().all(|&s| s == 0.5));
        assert!(out[20..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_render_across_blocks_matches_single_block() {
        let sr = 8000;
        let make = || {
            Chain::new(
                Source::oscillator(Waveform::Triangle, Automation::constant(250.0, 0.0)),
                vec![Biquad::high_pass(100.0, sr)],
                Automation::decay(1.0, 0.001, 0.02, 0.01),
                0.001,
                0.021,
            )
        };

        let mut whole = vec![0.0f32; 256];
        make().render_into(&mut whole, 0, sr);

        let mut blocks = vec![0.0f32; 256];
        let mut chain = make();
        for (i, block) in blocks.chunks_mut(64).enumerate() {
            chain.render_into(block, i as u64 * 64, sr);
        }

        assert_eq!(whole, blocks);
    }

    #[test]
    fn test_is_finished() {
        let chain = dc_chain(0.0, 0.5);
        assert!(!chain.is_finished(499, 1000));
        assert!(chain.is_finished(500, 1000));
    }

    #[test]
    fn test_stop_never_before_start() {
        let chain = dc_chain(1.0, 0.5);
        assert_eq!(chain.stop_time(), 1.0);
    }
}
