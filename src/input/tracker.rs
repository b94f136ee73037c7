//! Input state tracker
//!
//! Folds raw [`InputEvent`]s into the process-wide [`InputState`]. The state
//! lives behind a single mutex shared with the cadence task, so a report is
//! always composed from one consistent snapshot and events are applied in the
//! order the hook layer delivers them.

use crate::controller::report::{clamp_axis, AXIS_MAX, AXIS_MIN};
use crate::input::{EventOutcome, InputEvent, InputHandler, KeyCode, MouseButton};
use crate::mapping::{self, HeldKeys, TriggerSide, EXIT_KEY, SUPPRESSING_KEYS, TOGGLE_KEY};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Logical input state between two reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub(crate) held: HeldKeys,
    pub(crate) left_button: bool,
    pub(crate) right_button: bool,

    // Unconsumed mouse movement in stick units, always within the axis range
    pub(crate) pending_delta_x: i32,
    pub(crate) pending_delta_y: i32,

    pub(crate) passthrough_enabled: bool,

    // Edge detection for the control keys so auto-repeat does not re-fire them
    toggle_held: bool,
    exit_held: bool,
}

impl InputState {
    pub fn is_held(&self, keys: HeldKeys) -> bool {
        self.held.intersects(keys)
    }

    pub fn held_keys(&self) -> HeldKeys {
        self.held
    }

    pub fn trigger_pressed(&self, side: TriggerSide) -> bool {
        match side {
            TriggerSide::Left => self.left_button,
            TriggerSide::Right => self.right_button,
        }
    }

    pub fn pending_delta(&self) -> (i32, i32) {
        (self.pending_delta_x, self.pending_delta_y)
    }

    pub fn passthrough_enabled(&self) -> bool {
        self.passthrough_enabled
    }

    /// Removes movement that has been delivered in a report.
    ///
    /// Movement that arrived after the report was composed stays pending.
    pub(crate) fn consume_delta(&mut self, consumed_x: i32, consumed_y: i32) {
        self.pending_delta_x = clamp_axis(self.pending_delta_x - consumed_x) as i32;
        self.pending_delta_y = clamp_axis(self.pending_delta_y - consumed_y) as i32;
    }
}

/// Cloneable handle to the shared [`InputState`].
#[derive(Debug, Clone, Default)]
pub struct SharedInputState(Arc<Mutex<InputState>>);

impl SharedInputState {
    pub fn new(passthrough_enabled: bool) -> Self {
        Self(Arc::new(Mutex::new(InputState {
            passthrough_enabled,
            ..InputState::default()
        })))
    }

    pub fn lock(&self) -> MutexGuard<'_, InputState> {
        self.0.lock()
    }

    pub fn snapshot(&self) -> InputState {
        self.0.lock().clone()
    }
}

/// Applies input events to the shared state.
///
/// Called from the hook layer's delivery thread. Never blocks beyond the
/// state lock, which the cadence task only holds while composing a report.
#[derive(Debug)]
pub struct InputTracker {
    state: SharedInputState,
    mouse_sensitivity: f32,
    emit_wakeup: Arc<Notify>,
    shutdown: CancellationToken,
}

impl InputTracker {
    pub fn new(
        state: SharedInputState,
        mouse_sensitivity: f32,
        emit_wakeup: Arc<Notify>,
        shutdown: CancellationToken,
    ) -> Self {
        debug!(
            "Creating InputTracker with mouse sensitivity {}",
            mouse_sensitivity
        );
        Self {
            state,
            mouse_sensitivity,
            emit_wakeup,
            shutdown,
        }
    }

    pub fn state(&self) -> &SharedInputState {
        &self.state
    }

    fn handle_key(&self, state: &mut InputState, key: KeyCode, pressed: bool) -> EventOutcome {
        let mut outcome = EventOutcome::default();

        if key == TOGGLE_KEY {
            if pressed && !state.toggle_held {
                state.passthrough_enabled = !state.passthrough_enabled;
                outcome.toggled = Some(state.passthrough_enabled);
                info!(
                    "Input translation toggled {}",
                    if state.passthrough_enabled { "off" } else { "on" }
                );
            }
            state.toggle_held = pressed;
        } else if key == EXIT_KEY {
            if pressed && !state.exit_held {
                info!("Exit key pressed, requesting teardown");
                outcome.exit_requested = true;
                self.shutdown.cancel();
            }
            state.exit_held = pressed;
        } else if let Some(flag) = mapping::held_flag(key) {
            state.held.set(flag, pressed);
            debug!("Key {} {}", key, if pressed { "down" } else { "up" });
        }

        outcome.suppress = !state.passthrough_enabled && state.is_held(SUPPRESSING_KEYS);
        outcome
    }

    fn handle_mouse_move(&self, state: &mut InputState, dx: i32, dy: i32) -> EventOutcome {
        if state.passthrough_enabled {
            return EventOutcome::default();
        }

        if dx != 0 || dy != 0 {
            // Screen y grows downwards, stick y grows upwards
            state.pending_delta_x = accumulate(state.pending_delta_x, dx, self.mouse_sensitivity);
            state.pending_delta_y =
                accumulate(state.pending_delta_y, dy.saturating_neg(), self.mouse_sensitivity);
        }

        EventOutcome {
            suppress: true,
            emit_now: true,
            ..EventOutcome::default()
        }
    }

    fn handle_mouse_button(
        &self,
        state: &mut InputState,
        button: MouseButton,
        pressed: bool,
    ) -> EventOutcome {
        match mapping::trigger_for(button) {
            Some(TriggerSide::Left) => state.left_button = pressed,
            Some(TriggerSide::Right) => state.right_button = pressed,
            None => {}
        }

        if state.passthrough_enabled {
            return EventOutcome::default();
        }

        EventOutcome {
            suppress: true,
            emit_now: true,
            ..EventOutcome::default()
        }
    }
}

impl InputHandler for InputTracker {
    fn handle_input_event(&self, event: InputEvent) -> EventOutcome {
        let outcome = {
            let mut state = self.state.lock();
            match event {
                InputEvent::KeyDown(key) => self.handle_key(&mut state, key, true),
                InputEvent::KeyUp(key) => self.handle_key(&mut state, key, false),
                InputEvent::MouseMove { dx, dy } => self.handle_mouse_move(&mut state, dx, dy),
                InputEvent::MouseButtonDown(button) => {
                    self.handle_mouse_button(&mut state, button, true)
                }
                InputEvent::MouseButtonUp(button) => {
                    self.handle_mouse_button(&mut state, button, false)
                }
            }
        };

        if outcome.emit_now {
            self.emit_wakeup.notify_one();
        }
        outcome
    }
}

/// Adds one scaled mouse delta and clamps to the axis range.
fn accumulate(pending: i32, delta: i32, sensitivity: f32) -> i32 {
    let scaled = (f64::from(delta) * f64::from(sensitivity)).trunc();
    clamp_axis_f64(f64::from(pending) + scaled)
}

fn clamp_axis_f64(value: f64) -> i32 {
    value.clamp(f64::from(AXIS_MIN), f64::from(AXIS_MAX)) as i32
}
