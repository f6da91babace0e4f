// src/logcap/session.rs

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::exec::ProcessHandle;
use crate::logcap::filter::SubsystemFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Structured log stream only.
    Structured,
    /// Structured stream plus the app's console, which relaunches the app.
    StructuredWithConsole,
}

impl CaptureMode {
    pub fn from_console_flag(capture_console: bool) -> Self {
        if capture_console {
            CaptureMode::StructuredWithConsole
        } else {
            CaptureMode::Structured
        }
    }
}

/// Sessions are never reactivated once stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Stopped,
}

/// One log-capture session and the producers writing into its file.
pub struct LogCaptureSession {
    pub id: String,
    pub simulator_id: String,
    pub bundle_id: String,
    pub mode: CaptureMode,
    pub filter: SubsystemFilter,
    pub producers: Vec<Box<dyn ProcessHandle>>,
    pub log_path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub state: SessionState,
}

impl std::fmt::Debug for LogCaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogCaptureSession")
            .field("id", &self.id)
            .field("simulator_id", &self.simulator_id)
            .field("bundle_id", &self.bundle_id)
            .field("mode", &self.mode)
            .field("filter", &self.filter)
            .field("producers", &self.producers.len())
            .field("log_path", &self.log_path)
            .field("created_at", &self.created_at)
            .field("state", &self.state)
            .finish()
    }
}

/// Returned by `start_capture`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedCapture {
    pub session_id: String,
    pub log_file_path: PathBuf,
}

/// Read-only view of an active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: String,
    pub simulator_id: String,
    pub bundle_id: String,
    pub mode: CaptureMode,
    pub log_path: PathBuf,
    pub created_at: DateTime<Utc>,
}
