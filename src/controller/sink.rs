//! Virtual controller sinks
//!
//! A sink is the endpoint that finally presents a [`ControllerReport`] to the
//! consuming software, e.g. a ViGEm Xbox 360 target. Bus and driver setup is
//! the caller's job; the crate only needs [`ControllerSink::submit`] and
//! [`ControllerSink::release`].

use crate::controller::report::ControllerReport;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The device refused this report; the next tick will try again with fresh state
    #[error("Sink rejected report: {0}")]
    Rejected(String),

    #[error("Sink disconnected: {0}")]
    Disconnected(String),
}

pub trait ControllerSink: Send + 'static {
    fn submit(&mut self, report: &ControllerReport) -> Result<(), SinkError>;

    /// Releases the underlying device. Called exactly once during teardown.
    fn release(&mut self) {}

    fn name(&self) -> &str;
}

/// Publishes every accepted report on a watch channel.
#[derive(Debug)]
pub struct WatchSink {
    sender: watch::Sender<ControllerReport>,
}

impl WatchSink {
    pub fn new() -> (Self, watch::Receiver<ControllerReport>) {
        let (sender, receiver) = watch::channel(ControllerReport::default());
        (Self { sender }, receiver)
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerReport> {
        self.sender.subscribe()
    }
}

impl ControllerSink for WatchSink {
    fn submit(&mut self, report: &ControllerReport) -> Result<(), SinkError> {
        self.sender
            .send(*report)
            .map_err(|_| SinkError::Disconnected("no report subscribers left".to_string()))
    }

    fn name(&self) -> &str {
        "watch"
    }
}

/// Logs each report that differs from the previous one.
#[derive(Debug, Default)]
pub struct LogSink {
    last: Option<ControllerReport>,
    submitted: u64,
}

impl ControllerSink for LogSink {
    fn submit(&mut self, report: &ControllerReport) -> Result<(), SinkError> {
        self.submitted += 1;
        if self.last != Some(*report) {
            debug!(
                "Report: buttons={:#06x} LT={} RT={} L=({}, {}) R=({}, {})",
                report.buttons.bits(),
                report.left_trigger,
                report.right_trigger,
                report.thumb_lx,
                report.thumb_ly,
                report.thumb_rx,
                report.thumb_ry
            );
            self.last = Some(*report);
        }
        Ok(())
    }

    fn release(&mut self) {
        info!("Log sink released after {} reports", self.submitted);
    }

    fn name(&self) -> &str {
        "log"
    }
}
