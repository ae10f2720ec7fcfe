//! Signal sources: oscillators and noise buffers

use super::param::Automation;
use rand::Rng;
use std::f64::consts::TAU;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
}

impl Waveform {
    /// Sample of the waveform at `phase` (in cycles, 0.0 to 1.0)
    #[inline]
    pub fn sample(self, phase: f64) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin() as f32,
            Waveform::Triangle => {
                let value = if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                };
                value as f32
            }
        }
    }
}

/// Where a chain's raw signal comes from
#[derive(Debug, Clone)]
pub enum Source {
    /// Periodic waveform with an automated frequency in Hz
    Oscillator {
        waveform: Waveform,
        frequency: Automation,
        phase: f64,
    },
    /// Pre-rendered buffer played once from its first sample
    Buffer { samples: Vec<f32> },
}

impl Source {
    pub fn oscillator(waveform: Waveform, frequency: Automation) -> Self {
        Source::Oscillator {
            waveform,
            frequency,
            phase: 0.0,
        }
    }

    pub fn buffer(samples: Vec<f32>) -> Self {
        Source::Buffer { samples }
    }

    /// Produce the sample at `offset` frames after the source started
    ///
    /// Oscillators must be pulled at consecutive offsets; `t` is the absolute
    /// clock time used to read the frequency automation.
    #[inline]
    pub fn next_sample(&mut self, offset: usize, t: f64, sample_rate: u32) -> f32 {
        match self {
            Source::Oscillator {
                waveform,
                frequency,
                phase,
            } => {
                let sample = waveform.sample(*phase);
                *phase = (*phase + frequency.value_at(t) as f64 / sample_rate as f64).fract();
                sample
            }
            Source::Buffer { samples } => samples.get(offset).copied().unwrap_or(0.0),
        }
    }
}

/// Fill a buffer with white noise: independent uniform samples in [-1, 1]
///
/// # Arguments
/// * `rng` - Random source
/// * `duration_secs` - Buffer length in seconds
/// * `sample_rate` - Samples per second
pub fn white_noise<R: Rng + ?Sized>(rng: &mut R, duration_secs: f64, sample_rate: u32) -> Vec<f32> {
    let len = (sample_rate as f64 * duration_secs) as usize;
    (0..len).map(|_| rng.gen_range(-1.0f32..=1.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_sine_shape() {
        assert_relative_eq!(Waveform::Sine.sample(0.0), 0.0);
        assert_relative_eq!(Waveform::Sine.sample(0.25), 1.0);
        assert_relative_eq!(Waveform::Sine.sample(0.75), -1.0);
    }

    #[test]
    fn test_triangle_shape() {
        assert_relative_eq!(Waveform::Triangle.sample(0.0), 0.0);
        assert_relative_eq!(Waveform::Triangle.sample(0.25), 1.0);
        assert_relative_eq!(Waveform::Triangle.sample(0.5), 0.0);
        assert_relative_eq!(Waveform::Triangle.sample(0.75), -1.0);
        assert_relative_eq!(Waveform::Triangle.sample(0.125), 0.5);
    }

    #[test]
    fn test_white_noise_length_and_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        let noise = white_noise(&mut rng, 0.05, 48000);
        assert_eq!(noise.len(), 2400);
        assert!(noise.iter().all(|s| (-1.0..=1.0).contains(s)));

        // Roughly zero mean, not constant
        let mean: f32 = noise.iter().sum::<f32>() / noise.len() as f32;
        assert!(mean.abs() < 0.1);
        assert!(noise.iter().any(|&s| s > 0.5));
        assert!(noise.iter().any(|&s| s < -0.5));
    }

    #[test]
    fn test_oscillator_frequency() {
        // 1 kHz at 48 kHz: 48 samples per cycle, so zero crossings repeat every 48
        let sr = 48000;
        let mut source = Source::oscillator(Waveform::Sine, Automation::constant(1000.0, 0.0));
        let samples: Vec<f32> = (0..480)
            .map(|i| source.next_sample(i, i as f64 / sr as f64, sr))
            .collect();
        let rising = samples
            .windows(2)
            .filter(|w| w[0] < 0.0 && w[1] >= 0.0)
            .count();
        assert_eq!(rising, 9);
    }

    #[test]
    fn test_buffer_source_runs_out_to_silence() {
        let mut source = Source::buffer(vec![0.5, -0.5]);
        assert_eq!(source.next_sample(0, 0.0, 48000), 0.5);
        assert_eq!(source.next_sample(1, 0.0, 48000), -0.5);
        assert_eq!(source.next_sample(2, 0.0, 48000), 0.0);
    }
}
