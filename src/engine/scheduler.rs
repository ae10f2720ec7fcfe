//! Look-ahead scheduler
//!
//! A coarse, jittery software timer calls [`Scheduler::run_pass`] every
//! ~25 ms. Each pass schedules every step whose onset falls within a short
//! horizon (~100 ms) of the output clock, stamping each sound with its exact
//! clock time. Timing precision therefore comes from the timestamps handed to
//! the output, never from when the timer happens to fire.
//!
//! The scheduler is single-threaded: it is owned by one event loop and never
//! shared. The output it feeds may render on its own thread.

use super::layer::{Layer, LayerSet};
use super::transport::Transport;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::output::{self, AudioOutput, NullOutput, OutputState};
use crate::synth::Synthesizer;

/// Upper bound on steps scheduled by a single pass
///
/// A tempo so high that one 32nd note no longer moves the clock would
/// otherwise keep a pass spinning forever.
pub const MAX_STEPS_PER_PASS: usize = 1024;

/// Opens the output on first start
pub type Connector = Box<dyn FnMut() -> Result<Box<dyn AudioOutput>>>;

/// Cancellation token for one run of the recurring pass
///
/// Every `start()` issues a fresh token and `stop()` invalidates it, so a
/// pass loop left over from an earlier run can never schedule again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassToken {
    epoch: u64,
}

/// Result of one look-ahead pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Pass ran; `steps` steps were scheduled carrying `triggers` sounds
    Scheduled { steps: usize, triggers: usize },
    /// Token is stale or the transport is stopped; the loop should end
    Cancelled,
}

impl PassOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PassOutcome::Cancelled)
    }
}

/// Transport plus synthesizer plus output, driven by look-ahead passes
pub struct Scheduler {
    config: EngineConfig,
    transport: Transport,
    synth: Synthesizer,
    output: Option<Box<dyn AudioOutput>>,
    connect: Connector,
    epoch: u64,
}

impl Scheduler {
    /// Create a scheduler that opens its output through `connect` on first start
    ///
    /// If `connect` fails the scheduler keeps working against a silent output.
    /// Unusable config fields fall back to their defaults.
    pub fn new<F>(config: EngineConfig, connect: F) -> Self
    where
        F: FnMut() -> Result<Box<dyn AudioOutput>> + 'static,
    {
        let config = config.sanitized();
        Self {
            transport: Transport::from_config(&config),
            config,
            synth: Synthesizer::new(),
            output: None,
            connect: Box::new(connect),
            epoch: 0,
        }
    }

    /// Create a scheduler on the default system output
    pub fn with_default_output(config: EngineConfig) -> Self {
        Self::new(config, output::connect_default)
    }

    /// Replace the synthesizer (for reproducible noise)
    pub fn with_synthesizer(mut self, synth: Synthesizer) -> Self {
        self.synth = synth;
        self
    }

    // ========================================================================
    // Setters
    // ========================================================================

    /// Tempo in beats per minute, used from the next scheduled step on
    ///
    /// Non-finite or non-positive values are ignored.
    pub fn set_tempo(&mut self, bpm: f64) {
        self.transport.set_tempo(bpm);
    }

    /// Master volume for sounds triggered from now on
    pub fn set_volume(&mut self, volume: f32) {
        self.transport.set_volume(volume);
    }

    /// Replace the active layers from the next evaluated step on
    pub fn set_active_layers(&mut self, layers: LayerSet) {
        log::debug!("Active layers: [{}]", layers);
        self.transport.set_active_layers(layers);
    }

    /// Flip one layer, returning whether it is now active
    pub fn toggle_layer(&mut self, layer: Layer) -> bool {
        let active = self.transport.toggle_layer(layer);
        log::debug!("{} layer {}", layer, if active { "on" } else { "off" });
        active
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Start playback from the top of the measure
    ///
    /// Opens the output on first use and resumes it if suspended, then runs
    /// the first pass immediately. When already running nothing changes and
    /// the current token is returned.
    pub fn start(&mut self) -> PassToken {
        if self.transport.is_running() {
            log::debug!("Start ignored: already running");
            return self.current_token();
        }

        let now = {
            let output = self.output_mut();
            if output.state() == OutputState::Suspended {
                if let Err(e) = output.resume() {
                    log::warn!("Could not resume audio output: {}", e);
                }
            }
            output.current_time()
        };

        self.transport.start(now, self.config.start_offset_secs);
        self.epoch += 1;
        let token = self.current_token();
        self.run_pass(token);
        token
    }

    /// Stop scheduling
    ///
    /// Sounds already handed to the output play out; cutting them would click.
    pub fn stop(&mut self) {
        if self.transport.stop() {
            self.epoch += 1;
        }
    }

    /// Clear every layer and stop if running
    pub fn reset(&mut self) {
        self.transport.set_active_layers(LayerSet::empty());
        self.stop();
    }

    /// Run one look-ahead pass
    ///
    /// Schedules, in increasing time order, every step whose onset is earlier
    /// than the output clock plus the look-ahead horizon.
    pub fn run_pass(&mut self, token: PassToken) -> PassOutcome {
        if token != self.current_token() || !self.transport.is_running() {
            return PassOutcome::Cancelled;
        }
        let Some(output) = self.output.as_mut() else {
            return PassOutcome::Cancelled;
        };

        let horizon = output.current_time() + self.config.schedule_ahead_secs;
        let sample_rate = output.sample_rate();
        let mut steps = 0;
        let mut triggers = 0;

        while self.transport.next_event_time() < horizon {
            if steps == MAX_STEPS_PER_PASS {
                log::warn!(
                    "Pass stopped after {} steps at {:.4}s (tempo {})",
                    steps,
                    self.transport.next_event_time(),
                    self.transport.tempo()
                );
                break;
            }
            let time = self.transport.next_event_time();
            let volume = self.transport.volume();
            for layer in self.transport.due_layers() {
                log::trace!("step {:>2}: {} at {:.4}s", self.transport.step(), layer, time);
                output.submit(self.synth.synthesize(layer, time, volume, sample_rate));
                triggers += 1;
            }
            self.transport.advance();
            steps += 1;
        }

        PassOutcome::Scheduled { steps, triggers }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Playhead within the measure, in 1/32 increments; 0 when stopped
    pub fn progress(&self) -> f64 {
        self.transport.progress()
    }

    /// Output clock time in seconds, 0 before the output exists
    pub fn current_time(&self) -> f64 {
        self.output.as_ref().map_or(0.0, |o| o.current_time())
    }

    pub fn is_running(&self) -> bool {
        self.transport.is_running()
    }

    /// Token of the current run, if running
    pub fn token(&self) -> Option<PassToken> {
        self.is_running().then(|| self.current_token())
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn current_token(&self) -> PassToken {
        PassToken { epoch: self.epoch }
    }

    /// The output, opened on first call
    fn output_mut(&mut self) -> &mut Box<dyn AudioOutput> {
        let output = match self.output.take() {
            Some(output) => output,
            None => self.connect_output(),
        };
        self.output.insert(output)
    }

    fn connect_output(&mut self) -> Box<dyn AudioOutput> {
        match (self.connect)() {
            Ok(output) => {
                log::debug!("Audio output connected at {} Hz", output.sample_rate());
                output
            }
            Err(e) => {
                log::warn!("{}; continuing without sound", e);
                Box::new(NullOutput::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RhythmError;
    use crate::output::OfflineOutput;

    fn offline_scheduler() -> (Scheduler, OfflineOutput) {
        let config = EngineConfig::default();
        let output = OfflineOutput::from_config(&config);
        let handle = output.clone();
        let scheduler = Scheduler::new(config, move || Ok(Box::new(handle.clone()) as Box<dyn AudioOutput>))
            .with_synthesizer(Synthesizer::with_seed(11));
        (scheduler, output)
    }

    #[test]
    fn test_output_opened_lazily() {
        let (scheduler, _output) = offline_scheduler();
        assert_eq!(scheduler.current_time(), 0.0);
        assert_eq!(scheduler.progress(), 0.0);
        assert!(scheduler.token().is_none());
    }

    #[test]
    fn test_start_resumes_suspended_output() {
        let (mut scheduler, output) = offline_scheduler();
        assert_eq!(output.state(), OutputState::Suspended);
        scheduler.start();
        assert_eq!(output.state(), OutputState::Running);
        assert!(scheduler.is_running());
    }

    #[test]
    fn test_first_pass_runs_on_start() {
        let (mut scheduler, output) = offline_scheduler();
        scheduler.start();
        // First step at 0.1s is not before the 0.1s horizon
        assert!(output.triggers().is_empty());

        output.advance(0.025);
        let token = scheduler.token().unwrap();
        let outcome = scheduler.run_pass(token);
        assert_eq!(outcome, PassOutcome::Scheduled { steps: 1, triggers: 2 });
    }

    #[test]
    fn test_connector_called_once() {
        let config = EngineConfig::default();
        let output = OfflineOutput::from_config(&config);
        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let counter = calls.clone();
        let mut scheduler = Scheduler::new(config, move || {
            counter.set(counter.get() + 1);
            Ok(Box::new(output.clone()) as Box<dyn AudioOutput>)
        });

        scheduler.start();
        scheduler.stop();
        scheduler.start();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_failed_connect_degrades_to_silence() {
        let mut scheduler = Scheduler::new(EngineConfig::default(), || {
            Err(RhythmError::OutputUnavailable {
                reason: "no device".to_string(),
            })
        });
        let token = scheduler.start();
        assert!(scheduler.is_running());
        assert!(!scheduler.run_pass(token).is_cancelled());
        scheduler.set_tempo(120.0);
        scheduler.stop();
        assert_eq!(scheduler.progress(), 0.0);
    }

    #[test]
    fn test_stale_token_is_cancelled() {
        let (mut scheduler, _output) = offline_scheduler();
        let first = scheduler.start();
        scheduler.stop();
        assert!(scheduler.run_pass(first).is_cancelled());

        let second = scheduler.start();
        assert_ne!(first, second);
        assert!(scheduler.run_pass(first).is_cancelled());
        assert!(!scheduler.run_pass(second).is_cancelled());
    }

    #[test]
    fn test_reset_clears_layers_and_stops() {
        let (mut scheduler, _output) = offline_scheduler();
        scheduler.start();
        scheduler.reset();
        assert!(!scheduler.is_running());
        assert!(scheduler.transport().active_layers().is_empty());
    }

    #[test]
    fn test_invalid_config_tempo_falls_back_to_default() {
        let config = EngineConfig {
            tempo: -80.0,
            ..EngineConfig::default()
        };
        let scheduler = Scheduler::new(config, || Ok(Box::new(NullOutput::default()) as Box<dyn AudioOutput>));
        assert_eq!(scheduler.transport().tempo(), 80.0);
        assert_eq!(scheduler.config().tempo, 80.0);
    }

    #[test]
    fn test_pass_is_bounded_at_extreme_tempo() {
        let (mut scheduler, output) = offline_scheduler();
        scheduler.set_tempo(1e300);
        let token = scheduler.start();
        output.advance(0.05);
        assert_eq!(
            scheduler.run_pass(token),
            PassOutcome::Scheduled {
                steps: MAX_STEPS_PER_PASS,
                triggers: MAX_STEPS_PER_PASS / 2 + MAX_STEPS_PER_PASS / 8
            }
        );
    }

    #[test]
    fn test_invalid_tempo_keeps_previous() {
        let (mut scheduler, _output) = offline_scheduler();
        scheduler.set_tempo(-5.0);
        assert_eq!(scheduler.transport().tempo(), 80.0);
        scheduler.set_tempo(150.0);
        assert_eq!(scheduler.transport().tempo(), 150.0);
    }
}
