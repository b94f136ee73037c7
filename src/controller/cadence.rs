//! Cadence driver with statum state machine
//!
//! Emits a report on every tick of a fixed interval and, in between, whenever
//! the tracker asks for an immediate update. The driver owns the sink, so an
//! emit and the final release can never overlap.
//!
//! # State Machine
//!
//! ```text
//! Running ──(shutdown)──► Draining ──(sink released)──► Stopped
//! ```

use crate::controller::synthesizer::{EmitOutcome, ReportSynthesizer};
use chrono::{DateTime, Local};
use statum::{machine, state};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

#[state]
#[derive(Debug, Clone)]
pub enum CadenceState {
    Running,
    Draining,
    Stopped,
}

/// What caused an emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitTrigger {
    Tick,
    Input,
}

/// Counters published after every emission attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CadenceStats {
    pub ticks: u64,
    pub input_emits: u64,
    pub reports_sent: u64,
    pub skipped_passthrough: u64,
    pub sink_failures: u64,
    pub last_emit: Option<DateTime<Local>>,
}

#[machine]
pub struct CadenceDriver<S: CadenceState> {
    synthesizer: ReportSynthesizer,
    tick_interval: Duration,
    emit_wakeup: Arc<Notify>,
    stats: CadenceStats,
    stats_sender: watch::Sender<CadenceStats>,
}

impl<S: CadenceState> CadenceDriver<S> {
    pub fn stats(&self) -> &CadenceStats {
        &self.stats
    }

    pub fn subscribe(&self) -> watch::Receiver<CadenceStats> {
        self.stats_sender.subscribe()
    }
}

impl CadenceDriver<Running> {
    pub fn create(
        synthesizer: ReportSynthesizer,
        tick_interval: Duration,
        emit_wakeup: Arc<Notify>,
    ) -> Self {
        info!(
            "Creating cadence driver: tick {:?}, sink '{}'",
            tick_interval,
            synthesizer.sink_name()
        );
        let (stats_sender, _) = watch::channel(CadenceStats::default());

        Self::new(
            synthesizer,
            tick_interval,
            emit_wakeup,
            CadenceStats::default(),
            stats_sender,
        )
    }

    /// Runs one compose-and-send cycle. Sink failures are counted and logged, never retried.
    pub fn emit_once(&mut self, trigger: EmitTrigger) {
        match trigger {
            EmitTrigger::Tick => self.stats.ticks += 1,
            EmitTrigger::Input => self.stats.input_emits += 1,
        }

        match self.synthesizer.emit() {
            Ok(EmitOutcome::Sent(report)) => {
                trace!("Sent report ({:?}): {:?}", trigger, report);
                self.stats.reports_sent += 1;
                self.stats.last_emit = Some(Local::now());
            }
            Ok(EmitOutcome::Skipped) => {
                self.stats.skipped_passthrough += 1;
            }
            Err(e) => {
                warn!("Failed to update virtual controller: {}", e);
                self.stats.sink_failures += 1;
            }
        }

        self.stats_sender.send_replace(self.stats.clone());
    }

    /// Main loop. Returns once `shutdown` is cancelled; an emit already in progress completes first.
    pub async fn run_until_shutdown(
        mut self,
        shutdown: CancellationToken,
    ) -> CadenceDriver<Draining> {
        info!("Starting cadence loop");

        let wakeup = Arc::clone(&self.emit_wakeup);
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received by cadence loop");
                    break;
                }

                _ = wakeup.notified() => {
                    self.emit_once(EmitTrigger::Input);
                }

                _ = ticker.tick() => {
                    self.emit_once(EmitTrigger::Tick);
                }
            }
        }

        debug!("Transitioning to Draining state");
        self.transition()
    }
}

impl CadenceDriver<Draining> {
    /// Releases the sink and transitions to Stopped.
    pub fn drain(mut self) -> CadenceDriver<Stopped> {
        info!("Draining cadence driver");
        self.synthesizer.release_sink();
        self.stats_sender.send_replace(self.stats.clone());

        info!(
            "Cadence driver stopped: {} reports sent, {} sink failures",
            self.stats.reports_sent, self.stats.sink_failures
        );
        self.transition()
    }
}

impl CadenceDriver<Stopped> {
    pub fn into_stats(self) -> CadenceStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::report::ControllerReport;
    use crate::controller::sink::{ControllerSink, SinkError};
    use crate::controller::synthesizer::ComposeOptions;
    use crate::input::SharedInputState;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FlakySink {
        fail_next: bool,
        released: Arc<AtomicBool>,
    }

    impl ControllerSink for FlakySink {
        fn submit(&mut self, _report: &ControllerReport) -> Result<(), SinkError> {
            if std::mem::take(&mut self.fail_next) {
                return Err(SinkError::Rejected("transient".to_string()));
            }
            Ok(())
        }

        fn release(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn driver(state: SharedInputState, released: Arc<AtomicBool>) -> CadenceDriver<Running> {
        let sink = FlakySink {
            fail_next: true,
            released,
        };
        let synthesizer =
            ReportSynthesizer::new(state, Box::new(sink), ComposeOptions::default());
        CadenceDriver::create(synthesizer, Duration::from_millis(16), Arc::new(Notify::new()))
    }

    #[test]
    fn sink_failure_is_counted_and_next_tick_succeeds() {
        let mut driver = driver(SharedInputState::default(), Arc::new(AtomicBool::new(false)));
        driver.emit_once(EmitTrigger::Tick);
        driver.emit_once(EmitTrigger::Tick);

        let stats = driver.stats();
        assert_eq!(stats.ticks, 2);
        assert_eq!(stats.sink_failures, 1);
        assert_eq!(stats.reports_sent, 1);
        assert!(stats.last_emit.is_some());
    }

    #[test]
    fn passthrough_emits_are_counted_as_skipped() {
        let state = SharedInputState::new(true);
        let mut driver = driver(state, Arc::new(AtomicBool::new(false)));
        driver.emit_once(EmitTrigger::Input);

        assert_eq!(driver.stats().input_emits, 1);
        assert_eq!(driver.stats().skipped_passthrough, 1);
        assert_eq!(driver.stats().reports_sent, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_releases_sink_within_one_tick() {
        let released = Arc::new(AtomicBool::new(false));
        let driver = driver(SharedInputState::default(), Arc::clone(&released));
        let stats = driver.subscribe();
        let shutdown = CancellationToken::new();

        let token = shutdown.clone();
        let task = tokio::spawn(async move { driver.run_until_shutdown(token).await.drain() });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(stats.borrow().ticks >= 6);

        shutdown.cancel();
        let stopped = tokio::time::timeout(Duration::from_millis(16), task)
            .await
            .expect("cadence loop did not stop within one tick")
            .unwrap();

        assert!(released.load(Ordering::SeqCst));
        assert_eq!(stopped.into_stats().sink_failures, 1);
    }
}
