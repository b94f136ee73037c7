//! Controller side of the pipeline
//!
//! 1. [`synthesizer`] - composes [`ControllerReport`]s from the shared input state
//! 2. [`cadence`] - drives emission on a fixed tick and on input wakeups
//! 3. [`controller_handle`] - wires tracker, synthesizer and cadence task together
//!
//! # Architecture
//!
//! ```text
//! InputTracker ──► SharedInputState ──► ReportSynthesizer ──► ControllerSink
//!      │                                      ▲
//!      └──────── Notify (emit now) ───► CadenceDriver (16ms tick)
//! ```

pub mod cadence;
pub mod controller_handle;
pub mod report;
pub mod sink;
pub mod synthesizer;

pub use cadence::{CadenceDriver, CadenceState, CadenceStats, EmitTrigger};
pub use controller_handle::{ControllerError, ControllerHandle, ControllerSettings};
pub use report::{Buttons, ControllerReport, AXIS_MAX, AXIS_MIN, TRIGGER_MAX};
pub use sink::{ControllerSink, LogSink, SinkError, WatchSink};
pub use synthesizer::{compose_report, ComposeOptions, EmitOutcome, ReportSynthesizer};
