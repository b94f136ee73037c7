//! Report synthesizer
//!
//! Turns an [`InputState`] snapshot into a [`ControllerReport`] and forwards
//! it to the sink. The state lock is only held while composing; the sink call
//! happens after it is released.

use crate::controller::report::{clamp_axis, ControllerReport, TRIGGER_MAX};
use crate::controller::sink::{ControllerSink, SinkError};
use crate::input::{InputState, SharedInputState};
use crate::mapping::{StickAxis, TriggerSide, AXIS_BINDINGS, BUTTON_BINDINGS, DPAD_BINDINGS};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Also set D-pad bits for held movement keys
    pub dpad_mirror: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self { dpad_mirror: true }
    }
}

/// Result of one emission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    Sent(ControllerReport),
    /// Passthrough is on; nothing was composed or sent
    Skipped,
}

/// Composes a report from a state snapshot. Pure; calling it twice on the same state yields the same report.
pub fn compose_report(state: &InputState, options: &ComposeOptions) -> ControllerReport {
    let mut report = ControllerReport::default();

    let (mut left_x, mut left_y) = (0i32, 0i32);
    for binding in AXIS_BINDINGS {
        if state.is_held(binding.key) {
            match binding.axis {
                StickAxis::X => left_x += binding.value,
                StickAxis::Y => left_y += binding.value,
            }
        }
    }
    report.thumb_lx = clamp_axis(left_x);
    report.thumb_ly = clamp_axis(left_y);

    let (pending_x, pending_y) = state.pending_delta();
    report.thumb_rx = clamp_axis(pending_x);
    report.thumb_ry = clamp_axis(pending_y);

    for (key, button) in BUTTON_BINDINGS {
        if state.is_held(key) {
            report.buttons |= button;
        }
    }
    if options.dpad_mirror {
        for (key, button) in DPAD_BINDINGS {
            if state.is_held(key) {
                report.buttons |= button;
            }
        }
    }

    if state.trigger_pressed(TriggerSide::Left) {
        report.left_trigger = TRIGGER_MAX;
    }
    if state.trigger_pressed(TriggerSide::Right) {
        report.right_trigger = TRIGGER_MAX;
    }

    report
}

pub struct ReportSynthesizer {
    state: SharedInputState,
    sink: Box<dyn ControllerSink>,
    options: ComposeOptions,
}

impl ReportSynthesizer {
    pub fn new(
        state: SharedInputState,
        sink: Box<dyn ControllerSink>,
        options: ComposeOptions,
    ) -> Self {
        info!("Creating report synthesizer for sink '{}'", sink.name());
        Self {
            state,
            sink,
            options,
        }
    }

    /// Composes a report from the current state without sending it.
    pub fn compose(&self) -> ControllerReport {
        compose_report(&self.state.lock(), &self.options)
    }

    /// Composes the current state and hands it to the sink.
    ///
    /// On success the mouse movement that went into the report is consumed.
    /// On failure the movement stays pending and is picked up by the next emit.
    pub fn emit(&mut self) -> Result<EmitOutcome, SinkError> {
        let report = {
            let state = self.state.lock();
            if state.passthrough_enabled() {
                return Ok(EmitOutcome::Skipped);
            }
            compose_report(&state, &self.options)
        };

        self.sink.submit(&report)?;

        self.state
            .lock()
            .consume_delta(i32::from(report.thumb_rx), i32::from(report.thumb_ry));
        Ok(EmitOutcome::Sent(report))
    }

    pub fn release_sink(&mut self) {
        debug!("Releasing sink '{}'", self.sink.name());
        self.sink.release();
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }
}
