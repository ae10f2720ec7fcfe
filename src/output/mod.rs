//! Audio outputs
//!
//! An output owns the audio clock and accepts patches to play at absolute
//! times on that clock. The scheduler never renders samples itself; it only
//! hands over patches timestamped in the near future.

mod mixer;
mod null;
mod offline;
#[cfg(feature = "realtime")]
mod realtime;

pub use mixer::Mixer;
pub use null::NullOutput;
pub use offline::{OfflineOutput, TriggerRecord};
#[cfg(feature = "realtime")]
pub use realtime::RealtimeOutput;

use crate::error::Result;
use crate::synth::Patch;
use std::fmt;

/// Whether the output clock is advancing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputState {
    /// Clock frozen; submitted patches wait
    #[default]
    Suspended,
    /// Clock advancing and audio flowing
    Running,
}

impl fmt::Display for OutputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputState::Suspended => write!(f, "Suspended"),
            OutputState::Running => write!(f, "Running"),
        }
    }
}

/// Sink for scheduled patches with its own sample-accurate clock
pub trait AudioOutput {
    /// Current clock time in seconds
    fn current_time(&self) -> f64;

    /// Sample rate the clock counts in
    fn sample_rate(&self) -> u32;

    /// Whether the clock is running
    fn state(&self) -> OutputState;

    /// Resume a suspended clock
    fn resume(&mut self) -> Result<()>;

    /// Hand over a patch to play at its own onset time
    ///
    /// The output drops the patch once its stop time has passed.
    fn submit(&mut self, patch: Patch);
}

/// Open the default system output
///
/// Fails when the crate was built without the `realtime` feature or when no
/// device is available. Callers are expected to fall back to [`NullOutput`].
pub fn connect_default() -> Result<Box<dyn AudioOutput>> {
    #[cfg(feature = "realtime")]
    {
        let output = RealtimeOutput::open()?;
        Ok(Box::new(output))
    }

    #[cfg(not(feature = "realtime"))]
    {
        Err(crate::error::RhythmError::OutputUnavailable {
            reason: "built without the `realtime` feature".to_string(),
        })
    }
}
