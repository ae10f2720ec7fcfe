//! Rhythm Engine Module
//!
//! Timing core of the rhythm tree:
//! - Layer definitions and the active layer set
//! - Transport (tempo, volume, playhead)
//! - Look-ahead scheduler and its recurring pass

pub mod driver;
pub mod layer;
pub mod scheduler;
pub mod transport;

pub use driver::PassLoop;
pub use layer::{Layer, LayerSet, Timbre, STEPS_PER_MEASURE};
pub use scheduler::{Connector, PassOutcome, PassToken, Scheduler, MAX_STEPS_PER_PASS};
pub use transport::{
    is_valid_tempo, measure_duration, seconds_per_beat, seconds_per_step, Transport,
    TransportState, DEFAULT_TEMPO,
};
