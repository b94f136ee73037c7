//! Keyboard and mouse to virtual gamepad translation.
//!
//! Raw input events are folded into a shared [`input::InputState`] by the
//! [`input::InputTracker`]. A cadence task composes that state into
//! [`controller::ControllerReport`]s and hands them to a
//! [`controller::ControllerSink`], both on a fixed tick and immediately after
//! qualifying mouse events.
//!
//! ```text
//! OS hook ──► InputTracker ──► SharedInputState ◄── CadenceDriver ──► ControllerSink
//!                  │                                      ▲
//!                  └────────────── wakeup ────────────────┘
//! ```

pub mod config;
pub mod controller;
pub mod input;
pub mod mapping;
