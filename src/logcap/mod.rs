// src/logcap/mod.rs

//! Simulator log capture.
//!
//! A session merges up to two producers into one file: the structured
//! `log stream` of the simulator, and optionally the app's console via a
//! relaunch. Stopping a session escalates both producers with the same
//! routine the process supervisor uses, then returns the file's contents.

pub mod engine;
pub mod filter;
pub mod session;

pub use engine::LogCaptureEngine;
pub use filter::SubsystemFilter;
pub use session::{CaptureMode, LogCaptureSession, SessionState, SessionSummary, StartedCapture};
