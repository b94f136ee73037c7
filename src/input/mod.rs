//! Input side of the pipeline
//!
//! 1. [`InputEvent`] - the event vocabulary delivered by the OS hook layer
//! 2. [`tracker`] - folds events into the shared [`InputState`]
//! 3. [`script`] - text adapter that turns lines like `down W` into events
//!
//! The hook layer itself (low-level keyboard hooks, driver-level mouse capture)
//! lives outside this crate and talks to it through [`InputHandler`].

pub mod script;
pub mod tracker;

pub use script::{parse_line, ScriptError};
pub use tracker::{InputState, InputTracker, SharedInputState};

use std::fmt;

// Virtual-key codes as delivered by low-level keyboard hooks
const VK_SPACE: u32 = 0x20;

/// Keyboard key as seen by the tracker.
///
/// Only keys with a role in the key map get their own variant; everything
/// else is carried as [`KeyCode::Other`] and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    Q,
    E,
    Z,
    C,
    G,
    J,
    Space,
    Other(u32),
}

impl KeyCode {
    /// Maps a Windows virtual-key code onto a [`KeyCode`].
    pub fn from_virtual_key(vk: u32) -> Self {
        match vk {
            0x57 => KeyCode::W,
            0x41 => KeyCode::A,
            0x53 => KeyCode::S,
            0x44 => KeyCode::D,
            0x51 => KeyCode::Q,
            0x45 => KeyCode::E,
            0x5A => KeyCode::Z,
            0x43 => KeyCode::C,
            0x47 => KeyCode::G,
            0x4A => KeyCode::J,
            VK_SPACE => KeyCode::Space,
            other => KeyCode::Other(other),
        }
    }

    /// Parses a key name: a single letter or digit (any case) or `space`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("space") {
            return Some(KeyCode::Space);
        }

        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphanumeric() => {
                Some(Self::from_virtual_key(c.to_ascii_uppercase() as u32))
            }
            _ => None,
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Space => write!(f, "Space"),
            KeyCode::Other(vk) => write!(f, "VK({:#04x})", vk),
            named => write!(f, "{:?}", named),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    X1,
    X2,
}

impl MouseButton {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "left" => Some(MouseButton::Left),
            "right" => Some(MouseButton::Right),
            "middle" => Some(MouseButton::Middle),
            "x1" => Some(MouseButton::X1),
            "x2" => Some(MouseButton::X2),
            _ => None,
        }
    }
}

/// Discrete input event delivered by the hook layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    /// Relative mouse movement in raw counts (positive y points down, as on screen)
    MouseMove { dx: i32, dy: i32 },
    MouseButtonDown(MouseButton),
    MouseButtonUp(MouseButton),
}

/// What the hook layer has to do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    /// Drop the native event instead of forwarding it to the rest of the OS
    pub suppress: bool,

    /// The event asked for a report outside the regular tick
    pub emit_now: bool,

    /// New passthrough value if this event flipped it
    pub toggled: Option<bool>,

    /// The exit key was pressed; teardown has been requested
    pub exit_requested: bool,
}

/// Receiver for input events, one method per event kind.
///
/// Hook adapters call these from their delivery thread and must honour the
/// returned [`EventOutcome::suppress`] decision.
pub trait InputHandler: Send + Sync {
    fn handle_input_event(&self, event: InputEvent) -> EventOutcome;

    fn key_down(&self, key: KeyCode) -> EventOutcome {
        self.handle_input_event(InputEvent::KeyDown(key))
    }

    fn key_up(&self, key: KeyCode) -> EventOutcome {
        self.handle_input_event(InputEvent::KeyUp(key))
    }

    fn mouse_move(&self, dx: i32, dy: i32) -> EventOutcome {
        self.handle_input_event(InputEvent::MouseMove { dx, dy })
    }

    fn mouse_button_down(&self, button: MouseButton) -> EventOutcome {
        self.handle_input_event(InputEvent::MouseButtonDown(button))
    }

    fn mouse_button_up(&self, button: MouseButton) -> EventOutcome {
        self.handle_input_event(InputEvent::MouseButtonUp(button))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_are_case_insensitive() {
        assert_eq!(KeyCode::from_name("w"), Some(KeyCode::W));
        assert_eq!(KeyCode::from_name("W"), Some(KeyCode::W));
        assert_eq!(KeyCode::from_name("SPACE"), Some(KeyCode::Space));
    }

    #[test]
    fn untracked_keys_keep_their_code() {
        assert_eq!(KeyCode::from_name("k"), Some(KeyCode::Other(0x4B)));
        assert_eq!(KeyCode::from_name("7"), Some(KeyCode::Other(0x37)));
        assert_eq!(KeyCode::from_name("f1"), None);
        assert_eq!(KeyCode::from_name(""), None);
    }
}
