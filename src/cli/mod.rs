//! CLI Module
//!
//! Command-line host for the rhythm tree: plays the scheduler in a terminal
//! and prints the layer table.

pub mod commands;

use crate::engine::LayerSet;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rhythmtree - layered polyrhythm player
#[derive(Parser, Debug)]
#[command(name = "rhythmtree")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play the active layers with a terminal playhead
    #[command(name = "play")]
    Play(PlayArgs),

    /// Print every layer with its stride, timbre and onset grid
    #[command(name = "layers")]
    Layers,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct PlayArgs {
    /// Tempo in beats per minute (40-200)
    #[arg(short, long, value_parser = parse_tempo)]
    pub tempo: Option<f64>,

    /// Master volume (0.0-1.0)
    #[arg(long, value_parser = parse_volume)]
    pub volume: Option<f32>,

    /// Active layers, comma separated (e.g. `quarter,16th`)
    #[arg(short, long)]
    pub layers: Option<LayerSet>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(short, long, value_parser = parse_duration)]
    pub duration: Option<f64>,

    /// Engine configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Tempo range offered to users; the engine itself accepts any positive tempo
pub const TEMPO_RANGE: std::ops::RangeInclusive<f64> = 40.0..=200.0;

fn parse_tempo(s: &str) -> Result<f64, String> {
    let bpm: f64 = s.parse().map_err(|_| format!("`{}` is not a number", s))?;
    if !TEMPO_RANGE.contains(&bpm) {
        return Err(format!(
            "tempo must be within {}-{} bpm",
            TEMPO_RANGE.start(),
            TEMPO_RANGE.end()
        ));
    }
    Ok(bpm)
}

fn parse_volume(s: &str) -> Result<f32, String> {
    let volume: f32 = s.parse().map_err(|_| format!("`{}` is not a number", s))?;
    if !(0.0..=1.0).contains(&volume) {
        return Err("volume must be within 0.0-1.0".to_string());
    }
    Ok(volume)
}

fn parse_duration(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|_| format!("`{}` is not a number", s))?;
    if !(secs > 0.0 && std::time::Duration::try_from_secs_f64(secs).is_ok()) {
        return Err("duration must be a positive number of seconds".to_string());
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Layer;

    #[test]
    fn test_parse_play_args() {
        let cli = Cli::try_parse_from([
            "rhythmtree",
            "play",
            "--tempo",
            "120",
            "--layers",
            "whole,8th",
            "--duration",
            "2",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Play(args)) => {
                assert_eq!(args.tempo, Some(120.0));
                assert_eq!(args.layers, Some([Layer::Whole, Layer::Eighth].into()));
                assert_eq!(args.duration, Some(2.0));
                assert!(args.volume.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_tempo_outside_range_rejected() {
        assert!(Cli::try_parse_from(["rhythmtree", "play", "--tempo", "20"]).is_err());
        assert!(Cli::try_parse_from(["rhythmtree", "play", "--volume", "1.5"]).is_err());
    }

    #[test]
    fn test_duration_must_be_positive() {
        for bad in ["-1", "0", "inf", "NaN", "1e300", "soon"] {
            assert!(
                Cli::try_parse_from(["rhythmtree", "play", "--duration", bad]).is_err(),
                "accepted --duration {}",
                bad
            );
        }
        assert!(Cli::try_parse_from(["rhythmtree", "play", "--duration", "0.5"]).is_ok());
    }

    #[test]
    fn test_unknown_layer_rejected() {
        assert!(Cli::try_parse_from(["rhythmtree", "play", "--layers", "64th"]).is_err());
    }
}
