//! Rhythmtree - Polyrhythm Scheduler and Drum Synthesizer
//!
//! Plays up to six layered rhythmic subdivisions of one 4/4 measure, each
//! with its own procedurally synthesized percussion voice.
//!
//! # Architecture
//!
//! The system is split into three parts:
//! - Engine: transport, layer set and the look-ahead scheduler
//! - Synth: one short-lived sound patch per trigger
//! - Output: the audio clock and the mixer that plays scheduled patches
//!
//! The scheduler runs a pass every few tens of milliseconds and hands the
//! output every sound due within the next ~100 ms, each stamped with its exact
//! onset on the output clock.

pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod output;
pub mod synth;

pub use error::{Result, RhythmError};
