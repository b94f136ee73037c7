//! Line-based text adapter for input events.
//!
//! Stands in for the OS hook layer when replaying recorded input or driving
//! the pipeline from a terminal. One event per line:
//!
//! ```text
//! down W
//! up space
//! move 100 -50
//! mouse_down left
//! mouse_up right
//! # comments and blank lines are skipped
//! ```

use crate::input::{InputEvent, KeyCode, MouseButton};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("Unknown key '{0}'")]
    UnknownKey(String),

    #[error("Unknown mouse button '{0}'")]
    UnknownButton(String),

    #[error("Invalid mouse delta '{0}'")]
    InvalidDelta(String),

    #[error("'{command}' expects {expected} argument(s), got {got}")]
    WrongArity {
        command: String,
        expected: usize,
        got: usize,
    },
}

/// Parses one line into an event; `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<InputEvent>, ScriptError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default().to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    let event = match command.as_str() {
        "down" | "up" => {
            expect_args(&command, &args, 1)?;
            let key = KeyCode::from_name(args[0])
                .ok_or_else(|| ScriptError::UnknownKey(args[0].to_string()))?;
            if command == "down" {
                InputEvent::KeyDown(key)
            } else {
                InputEvent::KeyUp(key)
            }
        }
        "move" => {
            expect_args(&command, &args, 2)?;
            InputEvent::MouseMove {
                dx: parse_delta(args[0])?,
                dy: parse_delta(args[1])?,
            }
        }
        "mouse_down" | "mouse_up" => {
            expect_args(&command, &args, 1)?;
            let button = MouseButton::from_name(args[0])
                .ok_or_else(|| ScriptError::UnknownButton(args[0].to_string()))?;
            if command == "mouse_down" {
                InputEvent::MouseButtonDown(button)
            } else {
                InputEvent::MouseButtonUp(button)
            }
        }
        other => return Err(ScriptError::UnknownCommand(other.to_string())),
    };

    Ok(Some(event))
}

fn expect_args(command: &str, args: &[&str], expected: usize) -> Result<(), ScriptError> {
    if args.len() != expected {
        return Err(ScriptError::WrongArity {
            command: command.to_string(),
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

fn parse_delta(text: &str) -> Result<i32, ScriptError> {
    text.parse()
        .map_err(|_| ScriptError::InvalidDelta(text.to_string()))
}
