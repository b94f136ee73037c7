//! Fixed key map from keyboard and mouse to the gamepad.
//!
//! All bindings are compile-time tables. The tracker uses [`held_flag`] to
//! decide which keys it records; the synthesizer walks the tables to build a
//! report.

use crate::controller::report::{Buttons, AXIS_MAX, AXIS_MIN};
use crate::input::{KeyCode, MouseButton};
use bitflags::bitflags;

bitflags! {
    /// Keys whose pressed state is tracked.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HeldKeys: u16 {
        const W     = 1 << 0;
        const A     = 1 << 1;
        const S     = 1 << 2;
        const D     = 1 << 3;
        const SPACE = 1 << 4;
        const Q     = 1 << 5;
        const E     = 1 << 6;
        const Z     = 1 << 7;
        const C     = 1 << 8;
    }
}

impl Default for HeldKeys {
    fn default() -> Self {
        HeldKeys::empty()
    }
}

/// Flips passthrough on each press.
pub const TOGGLE_KEY: KeyCode = KeyCode::G;

/// Requests teardown.
pub const EXIT_KEY: KeyCode = KeyCode::J;

/// While any of these is held (and translation is on) native key events are swallowed.
pub const SUPPRESSING_KEYS: HeldKeys = HeldKeys::all();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickAxis {
    X,
    Y,
}

/// Contribution of one held key to a left-stick axis.
#[derive(Debug, Clone, Copy)]
pub struct AxisBinding {
    pub key: HeldKeys,
    pub axis: StickAxis,
    pub value: i32,
}

pub const AXIS_BINDINGS: [AxisBinding; 4] = [
    AxisBinding { key: HeldKeys::W, axis: StickAxis::Y, value: AXIS_MAX },
    AxisBinding { key: HeldKeys::S, axis: StickAxis::Y, value: AXIS_MIN },
    AxisBinding { key: HeldKeys::A, axis: StickAxis::X, value: AXIS_MIN },
    AxisBinding { key: HeldKeys::D, axis: StickAxis::X, value: AXIS_MAX },
];

/// Face and shoulder buttons.
pub const BUTTON_BINDINGS: [(HeldKeys, Buttons); 5] = [
    (HeldKeys::SPACE, Buttons::A),
    (HeldKeys::Q, Buttons::X),
    (HeldKeys::E, Buttons::B),
    (HeldKeys::Z, Buttons::LEFT_SHOULDER),
    (HeldKeys::C, Buttons::RIGHT_SHOULDER),
];

/// D-pad bits mirrored from the movement keys when enabled.
pub const DPAD_BINDINGS: [(HeldKeys, Buttons); 4] = [
    (HeldKeys::W, Buttons::DPAD_UP),
    (HeldKeys::S, Buttons::DPAD_DOWN),
    (HeldKeys::A, Buttons::DPAD_LEFT),
    (HeldKeys::D, Buttons::DPAD_RIGHT),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSide {
    Left,
    Right,
}

/// Mouse button driving a trigger; `None` for buttons with no binding.
pub fn trigger_for(button: MouseButton) -> Option<TriggerSide> {
    match button {
        MouseButton::Left => Some(TriggerSide::Left),
        MouseButton::Right => Some(TriggerSide::Right),
        _ => None,
    }
}

/// Tracked flag for a key, `None` for keys the key map does not use.
pub fn held_flag(key: KeyCode) -> Option<HeldKeys> {
    match key {
        KeyCode::W => Some(HeldKeys::W),
        KeyCode::A => Some(HeldKeys::A),
        KeyCode::S => Some(HeldKeys::S),
        KeyCode::D => Some(HeldKeys::D),
        KeyCode::Space => Some(HeldKeys::SPACE),
        KeyCode::Q => Some(HeldKeys::Q),
        KeyCode::E => Some(HeldKeys::E),
        KeyCode::Z => Some(HeldKeys::Z),
        KeyCode::C => Some(HeldKeys::C),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_axis_binding_is_full_deflection() {
        for binding in AXIS_BINDINGS {
            assert!(binding.value == AXIS_MAX || binding.value == AXIS_MIN);
        }
    }

    #[test]
    fn control_keys_are_not_tracked() {
        assert_eq!(held_flag(TOGGLE_KEY), None);
        assert_eq!(held_flag(EXIT_KEY), None);
        assert_eq!(held_flag(KeyCode::Other(0x70)), None);
    }

    #[test]
    fn only_left_and_right_buttons_drive_triggers() {
        assert_eq!(trigger_for(MouseButton::Left), Some(TriggerSide::Left));
        assert_eq!(trigger_for(MouseButton::Right), Some(TriggerSide::Right));
        assert_eq!(trigger_for(MouseButton::Middle), None);
    }
}
