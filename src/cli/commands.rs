//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use log::info;
use tokio::time::{self, MissedTickBehavior};

use super::PlayArgs;
use crate::config::EngineConfig;
use crate::engine::{Layer, LayerSet, PassLoop, Scheduler, STEPS_PER_MEASURE};
use crate::error::Result;

/// Terminal redraw period (~60 fps)
const FRAME_PERIOD: Duration = Duration::from_millis(16);

/// Build the engine configuration for `play`
///
/// Starts from the config file if one is given, then applies the
/// command-line overrides.
pub fn engine_config(args: &PlayArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(tempo) = args.tempo {
        config.tempo = tempo;
    }
    if let Some(volume) = args.volume {
        config.volume = volume;
    }
    if let Some(layers) = args.layers {
        config.active_layers = layers;
    }
    config.validate()?;
    Ok(config)
}

/// Play until Ctrl-C or until `--duration` elapses.
pub async fn play(args: PlayArgs) -> anyhow::Result<()> {
    let config = engine_config(&args).context("invalid engine configuration")?;
    info!(
        "Playing [{}] at {} bpm, volume {:.2}",
        config.active_layers, config.tempo, config.volume
    );

    let mut scheduler = Scheduler::with_default_output(config);
    let token = scheduler.start();
    let mut pass_loop = PassLoop::for_scheduler(&scheduler, token);

    let mut frames = time::interval(FRAME_PERIOD);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let deadline = async {
        match args.duration {
            Some(secs) => time::sleep(Duration::from_secs_f64(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut stdout = std::io::stdout();
    loop {
        tokio::select! {
            _ = pass_loop.tick() => {
                if !pass_loop.run_once(&mut scheduler) {
                    break;
                }
            }
            _ = frames.tick() => {
                let line = playhead_line(
                    scheduler.progress(),
                    scheduler.transport().active_layers(),
                    scheduler.current_time(),
                );
                write!(stdout, "\r{}", line)?;
                stdout.flush()?;
            }
            _ = &mut deadline => break,
            result = &mut ctrl_c => {
                result.context("failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    scheduler.stop();
    writeln!(stdout)?;
    info!("Stopped at {:.3}s", scheduler.current_time());
    Ok(())
}

/// Print the layer table.
pub fn layers() {
    print!("{}", layer_table());
}

/// Label, stride, subdivisions, timbre and onset grid for every layer
pub fn layer_table() -> String {
    let mut out = format!(
        "{:<8} {:>6} {:>5} {:<10} {}\n",
        "LAYER", "STRIDE", "HITS", "TIMBRE", "ONSETS"
    );
    for layer in Layer::ALL {
        out.push_str(&format!(
            "{:<8} {:>6} {:>5} {:<10} {}\n",
            layer.label(),
            layer.stride(),
            layer.subdivisions(),
            layer.timbre().to_string(),
            onset_grid(layer)
        ));
    }
    out
}

/// One measure of 32nd steps, `x` where `layer` fires
pub fn onset_grid(layer: Layer) -> String {
    (0..STEPS_PER_MEASURE)
        .map(|step| if layer.fires_at(step) { 'x' } else { '.' })
        .collect()
}

/// Single status line: playhead bar, step and clock
pub fn playhead_line(progress: f64, layers: LayerSet, time: f64) -> String {
    let position = (progress * STEPS_PER_MEASURE as f64) as usize;
    let bar: String = (0..STEPS_PER_MEASURE)
        .map(|step| {
            if step == position {
                '|'
            } else if layers.firing_at(step).next().is_some() {
                'x'
            } else {
                '.'
            }
        })
        .collect();
    format!(
        "[{}] step {:>2}/{} {:>8.3}s",
        bar, position, STEPS_PER_MEASURE, time
    )
}
