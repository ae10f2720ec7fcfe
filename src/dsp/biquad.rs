//! Biquad filters
//!
//! Second-order IIR sections used to shape noise bursts. Coefficients follow
//! the Audio EQ Cookbook formulas.

use std::f64::consts::PI;

/// Filter response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Remove below frequency
    HighPass,
    /// Pass a band around frequency (0 dB peak gain)
    BandPass,
}

/// Default Q for highpass sections (Butterworth)
pub const BUTTERWORTH_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Biquad filter coefficients
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (a0 + a1*z^-1 + a2*z^-2)
/// Normalized: all coefficients divided by a0
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct BiquadCoeffs {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl BiquadCoeffs {
    fn calculate(kind: FilterKind, sample_rate: f64, frequency: f64, q: f64) -> Self {
        // Clamp frequency to valid range (below Nyquist, even at tiny rates)
        let max_freq = (sample_rate / 2.0 - 1.0).max(sample_rate * 0.45);
        let freq = frequency.clamp(10.0f64.min(max_freq), max_freq);
        let q = q.clamp(0.1, 30.0);

        let w0 = 2.0 * PI * freq / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let (b0, b1, b2, a0, a1, a2) = match kind {
            FilterKind::HighPass => (
                (1.0 + cos_w0) / 2.0,
                -(1.0 + cos_w0),
                (1.0 + cos_w0) / 2.0,
                1.0 + alpha,
                -2.0 * cos_w0,
                1.0 - alpha,
            ),
            FilterKind::BandPass => (
                alpha,
                0.0,
                -alpha,
                1.0 + alpha,
                -2.0 * cos_w0,
                1.0 - alpha,
            ),
        };

        BiquadCoeffs {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// A single biquad section with its own history
#[derive(Debug, Clone)]
pub struct Biquad {
    kind: FilterKind,
    frequency: f64,
    coeffs: BiquadCoeffs,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl Biquad {
    /// Create a filter section
    ///
    /// # Arguments
    /// * `kind` - Filter response
    /// * `frequency` - Cutoff (highpass) or center (bandpass) in Hz
    /// * `q` - Quality factor
    /// * `sample_rate` - Rate of the signal being filtered
    pub fn new(kind: FilterKind, frequency: f64, q: f64, sample_rate: u32) -> Self {
        Self {
            kind,
            frequency,
            coeffs: BiquadCoeffs::calculate(kind, sample_rate as f64, frequency, q),
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Butterworth highpass at `frequency`
    pub fn high_pass(frequency: f64, sample_rate: u32) -> Self {
        Self::new(FilterKind::HighPass, frequency, BUTTERWORTH_Q, sample_rate)
    }

    /// Bandpass centered on `frequency`
    pub fn band_pass(frequency: f64, q: f64, sample_rate: u32) -> Self {
        Self::new(FilterKind::BandPass, frequency, q, sample_rate)
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Process a single sample
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let input = input as f64;
        let c = &self.coeffs;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output as f32
    }

    /// Clear filter history
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frequency: f64, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * frequency * i as f64 / sample_rate as f64).sin() as f32)
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        let sum: f32 = samples.iter().map(|s| s * s).sum();
        (sum / samples.len() as f32).sqrt()
    }

    fn filtered_rms(filter: &mut Biquad, input: &[f32]) -> f32 {
        let output: Vec<f32> = input.iter().map(|&s| filter.process(s)).collect();
        // Skip the transient
        rms(&output[output.len() / 4..])
    }

    #[test]
    fn test_high_pass_attenuates_lows() {
        let sr = 48000;
        let low = sine(100.0, sr, 9600);
        let high = sine(10000.0, sr, 9600);

        let low_rms = filtered_rms(&mut Biquad::high_pass(5000.0, sr), &low);
        let high_rms = filtered_rms(&mut Biquad::high_pass(5000.0, sr), &high);

        assert!(low_rms < 0.01, "100 Hz leaked through: {}", low_rms);
        assert!(high_rms > 0.6, "10 kHz was attenuated: {}", high_rms);
    }

    #[test]
    fn test_band_pass_peaks_at_center() {
        let sr = 48000;
        let center = filtered_rms(&mut Biquad::band_pass(1000.0, 2.0, sr), &sine(1000.0, sr, 9600));
        let far = filtered_rms(&mut Biquad::band_pass(1000.0, 2.0, sr), &sine(15000.0, sr, 9600));

        assert!(center > 0.6);
        assert!(far < center / 4.0);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut filter = Biquad::high_pass(1000.0, 48000);
        filter.process(1.0);
        filter.process(-1.0);
        filter.reset();
        assert_eq!(filter.process(0.0), 0.0);
    }

    #[test]
    fn test_frequency_clamped_below_nyquist() {
        let mut filter = Biquad::high_pass(40000.0, 48000);
        let out = filter.process(1.0);
        assert!(out.is_finite());
        assert_eq!(filter.kind(), FilterKind::HighPass);
        assert_eq!(filter.frequency(), 40000.0);
    }

    #[test]
    fn test_tiny_sample_rate_stays_finite() {
        for sample_rate in [1, 16, 21, 22] {
            let mut filter = Biquad::high_pass(5000.0, sample_rate);
            let mut bandpass = Biquad::band_pass(1000.0, 0.5, sample_rate);
            for (i, x) in sine(3.0, sample_rate, 64).into_iter().enumerate() {
                let y = bandpass.process(filter.process(x + (i % 2) as f32));
                assert!(y.is_finite(), "non-finite output at {} Hz", sample_rate);
            }
        }
    }
}
