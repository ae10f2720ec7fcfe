//! DSP primitives
//!
//! The building blocks synthesis recipes are assembled from:
//! oscillators and noise buffers, biquad filters, automated gain, and the
//! chain that wires them together on the output clock.

mod biquad;
mod param;
mod source;
mod voice;

pub use biquad::{Biquad, FilterKind, BUTTERWORTH_Q};
pub use param::{Automation, DECAY_FLOOR, DEEP_DECAY_FLOOR};
pub use source::{white_noise, Source, Waveform};
pub use voice::{time_to_frame, Chain};
