//! Recurring look-ahead pass
//!
//! Wraps a tokio interval so the scheduler's pass runs every
//! `lookahead_interval_ms` until the run it was started for is stopped.

use super::scheduler::{PassToken, Scheduler};
use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Timer bound to one run of the scheduler
pub struct PassLoop {
    token: PassToken,
    interval: Interval,
}

impl PassLoop {
    /// First tick fires one `period` from now; the start pass already ran.
    pub fn new(token: PassToken, period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        let mut interval = time::interval_at(Instant::now() + period, period);
        // A late timer only shortens the look-ahead window; never burst
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { token, interval }
    }

    /// Loop at the scheduler's configured interval
    pub fn for_scheduler(scheduler: &Scheduler, token: PassToken) -> Self {
        Self::new(token, scheduler.config().lookahead_interval())
    }

    pub fn token(&self) -> PassToken {
        self.token
    }

    /// Wait for the next tick
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }

    /// Run one pass, returning `false` once this loop's run has ended
    pub fn run_once(&self, scheduler: &mut Scheduler) -> bool {
        !scheduler.run_pass(self.token).is_cancelled()
    }

    /// Tick and pass until the run is stopped or restarted
    pub async fn run(mut self, scheduler: &mut Scheduler) {
        loop {
            self.tick().await;
            if !self.run_once(scheduler) {
                log::debug!("Pass loop ended");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::output::{AudioOutput, OfflineOutput};

    fn scheduler() -> (Scheduler, OfflineOutput) {
        let config = EngineConfig::default();
        let output = OfflineOutput::from_config(&config);
        let handle = output.clone();
        let scheduler = Scheduler::new(config, move || {
            Ok(Box::new(handle.clone()) as Box<dyn AudioOutput>)
        });
        (scheduler, output)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_waits_one_period() {
        let token = {
            let (mut scheduler, _output) = scheduler();
            scheduler.start()
        };
        let mut pass_loop = PassLoop::new(token, Duration::from_millis(25));
        let before = Instant::now();
        pass_loop.tick().await;
        assert!(Instant::now() - before >= Duration::from_millis(25));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_ends_after_stop() {
        let (mut scheduler, output) = scheduler();
        let token = scheduler.start();
        let mut pass_loop = PassLoop::for_scheduler(&scheduler, token);

        for _ in 0..4 {
            pass_loop.tick().await;
            output.advance(0.025);
            assert!(pass_loop.run_once(&mut scheduler));
        }
        assert!(!output.triggers().is_empty());

        scheduler.stop();
        pass_loop.run(&mut scheduler).await;
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_old_loop_ignores_new_run() {
        let (mut scheduler, _output) = scheduler();
        let first = scheduler.start();
        scheduler.stop();
        let second = scheduler.start();

        let stale = PassLoop::new(first, Duration::from_millis(25));
        let live = PassLoop::new(second, Duration::from_millis(25));
        assert!(!stale.run_once(&mut scheduler));
        assert!(live.run_once(&mut scheduler));
        assert_eq!(live.token(), second);
    }
}
