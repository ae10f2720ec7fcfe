//! Parameter automation
//!
//! A value set at an absolute clock time that can ramp exponentially toward a
//! target by a later time. Exponential curves never reach zero, so ramps are
//! expressed against a small positive floor instead of silence.

/// Default decay floor, relative to the starting value
pub const DECAY_FLOOR: f32 = 0.01;

/// Deeper decay floor for tonal voices whose tails are more audible
pub const DEEP_DECAY_FLOOR: f32 = 0.001;

/// Automated parameter: a step to `start_value` at `start_time`, optionally
/// followed by an exponential ramp to `target` reached at `end_time`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Automation {
    start_value: f32,
    start_time: f64,
    ramp: Option<(f32, f64)>,
}

impl Automation {
    /// A value that holds from `time` onward
    pub fn constant(value: f32, time: f64) -> Self {
        Self {
            start_value: value,
            start_time: time,
            ramp: None,
        }
    }

    /// Exponential ramp from `from` at `start` to `to` at `end`
    ///
    /// # Example
    /// ```
    /// use rhythmtree::dsp::Automation;
    ///
    /// let freq = Automation::exponential(150.0, 0.0, 0.01, 0.5);
    /// assert_eq!(freq.value_at(0.0), 150.0);
    /// assert!(freq.value_at(0.25) < 2.0);
    /// ```
    pub fn exponential(from: f32, start: f64, to: f32, end: f64) -> Self {
        Self {
            start_value: from,
            start_time: start,
            ramp: Some((to, end)),
        }
    }

    /// Exponential decay from `peak` to `peak * floor` over `duration` seconds
    pub fn decay(peak: f32, start: f64, duration: f64, floor: f32) -> Self {
        Self::exponential(peak, start, peak * floor, start + duration)
    }

    /// Value at absolute time `t`
    pub fn value_at(&self, t: f64) -> f32 {
        let Some((target, end)) = self.ramp else {
            return self.start_value;
        };

        if t <= self.start_time {
            return self.start_value;
        }
        if t >= end {
            return target;
        }
        // Exponential interpolation needs two values of the same sign
        if self.start_value <= 0.0 || target <= 0.0 {
            return self.start_value;
        }

        let progress = (t - self.start_time) / (end - self.start_time);
        let ratio = (target / self.start_value) as f64;
        (self.start_value as f64 * ratio.powf(progress)) as f32
    }

    pub fn start_value(&self) -> f32 {
        self.start_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant() {
        let param = Automation::constant(0.5, 1.0);
        assert_eq!(param.value_at(0.0), 0.5);
        assert_eq!(param.value_at(10.0), 0.5);
    }

    #[test]
    fn test_exponential_endpoints() {
        let param = Automation::exponential(1.0, 2.0, 0.01, 3.0);
        assert_eq!(param.value_at(1.0), 1.0);
        assert_eq!(param.value_at(2.0), 1.0);
        assert_eq!(param.value_at(3.0), 0.01);
        assert_eq!(param.value_at(4.0), 0.01);
    }

    #[test]
    fn test_exponential_midpoint_is_geometric_mean() {
        let param = Automation::exponential(1.0, 0.0, 0.01, 1.0);
        assert_relative_eq!(param.value_at(0.5), 0.1, epsilon = 1e-5);
    }

    #[test]
    fn test_decay_floor_is_relative() {
        let param = Automation::decay(0.4, 0.0, 0.05, DECAY_FLOOR);
        assert_relative_eq!(param.value_at(0.05), 0.004, epsilon = 1e-7);
    }

    #[test]
    fn test_zero_peak_stays_silent() {
        let param = Automation::decay(0.0, 0.0, 1.0, DECAY_FLOOR);
        assert_eq!(param.value_at(0.5), 0.0);
        assert_eq!(param.value_at(2.0), 0.0);
    }

    #[test]
    fn test_monotonic_decay() {
        let param = Automation::decay(1.0, 0.0, 1.5, DECAY_FLOOR);
        let mut last = f32::MAX;
        for i in 0..=150 {
            let v = param.value_at(i as f64 * 0.01);
            assert!(v <= last);
            last = v;
        }
    }
}
