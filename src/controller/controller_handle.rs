//! Controller Handle - Unified API for the translation pipeline
//!
//! Builds the shared input state, the tracker the hook layer talks to and the
//! cadence task that owns the sink, and manages their lifecycle.

use crate::config::RuntimeConfig;
use crate::controller::cadence::{CadenceDriver, CadenceStats};
use crate::controller::sink::ControllerSink;
use crate::controller::synthesizer::{ComposeOptions, ReportSynthesizer};
use crate::input::{InputTracker, SharedInputState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Configuration for the complete pipeline.
///
/// Split into tracker, synthesizer and cadence settings on spawn.
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerSettings {
    /// Period of the cadence timer
    ///
    /// 16ms matches a 60Hz consumer. Mouse events do not wait for it; they
    /// wake the cadence task directly.
    pub tick_interval: Duration,

    /// Stick units per raw mouse count
    pub mouse_sensitivity: f32,

    /// Set D-pad bits for held movement keys in addition to the left stick
    pub dpad_mirror: bool,

    /// Start with translation disabled
    pub start_in_passthrough: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&RuntimeConfig::default())
    }
}

impl From<&RuntimeConfig> for ControllerSettings {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            tick_interval: config.tick_interval(),
            mouse_sensitivity: config.mouse_sensitivity,
            dpad_mirror: config.dpad_mirror,
            start_in_passthrough: config.start_in_passthrough,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The cadence task panicked or was aborted before it could release the sink
    #[error("Cadence task failed: {0}")]
    TaskFailed(String),

    #[error("Controller already shut down")]
    AlreadyShutDown,
}

/// Handle for the running pipeline.
///
/// The tracker returned by [`ControllerHandle::tracker`] is handed to the hook
/// layer. Teardown is requested either through the exit key or
/// [`ControllerHandle::request_shutdown`] and carried out by
/// [`ControllerHandle::shutdown`].
#[derive(Debug)]
pub struct ControllerHandle {
    tracker: Arc<InputTracker>,
    shutdown: CancellationToken,
    stats_receiver: watch::Receiver<CadenceStats>,
    task_handle: Option<JoinHandle<CadenceStats>>,
}

impl ControllerHandle {
    /// Spawns the cadence task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(settings: ControllerSettings, sink: Box<dyn ControllerSink>) -> Self {
        info!("Initializing controller pipeline with settings: {:?}", settings);

        let state = SharedInputState::new(settings.start_in_passthrough);
        let emit_wakeup = Arc::new(Notify::new());
        let shutdown = CancellationToken::new();

        let tracker = Arc::new(InputTracker::new(
            state.clone(),
            settings.mouse_sensitivity,
            Arc::clone(&emit_wakeup),
            shutdown.clone(),
        ));

        let options = ComposeOptions {
            dpad_mirror: settings.dpad_mirror,
        };
        let synthesizer = ReportSynthesizer::new(state, sink, options);
        let driver = CadenceDriver::create(synthesizer, settings.tick_interval, emit_wakeup);
        let stats_receiver = driver.subscribe();

        let token = shutdown.clone();
        let task_handle = tokio::spawn(async move {
            let draining = driver.run_until_shutdown(token).await;
            draining.drain().into_stats()
        });
        debug!("Cadence task spawned");

        info!("Controller pipeline initialized successfully");
        Self {
            tracker,
            shutdown,
            stats_receiver,
            task_handle: Some(task_handle),
        }
    }

    pub fn tracker(&self) -> Arc<InputTracker> {
        Arc::clone(&self.tracker)
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn subscribe_stats(&self) -> watch::Receiver<CadenceStats> {
        self.stats_receiver.clone()
    }

    /// Resolves once teardown has been requested (exit key or [`Self::request_shutdown`]).
    pub async fn exit_requested(&self) {
        self.shutdown.cancelled().await
    }

    pub fn request_shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Stops the cadence task, waits for the in-flight emit and the sink release.
    pub async fn shutdown(&mut self) -> Result<CadenceStats, ControllerError> {
        debug!("Sending shutdown signal to cadence task");
        self.shutdown.cancel();

        let Some(handle) = self.task_handle.take() else {
            warn!("Controller pipeline already shut down");
            return Err(ControllerError::AlreadyShutDown);
        };

        match handle.await {
            Ok(stats) => {
                info!("Controller pipeline shut down");
                Ok(stats)
            }
            Err(e) => {
                error!("Cadence task failed: {}", e);
                Err(ControllerError::TaskFailed(e.to_string()))
            }
        }
    }
}
