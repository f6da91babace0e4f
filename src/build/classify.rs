// src/build/classify.rs

//! Failure classification for build-tool output.
//!
//! A handful of literal markers map to a short label. The tool's own text is
//! always kept verbatim as the detail.

use crate::errors::XcpilotError;
use crate::exec::CommandResult;

const MARKERS: &[(&str, &str)] = &[
    ("does not contain a scheme named", "Scheme not found"),
    ("is not currently configured for the", "Scheme not found"),
    ("** TEST FAILED **", "Tests failed"),
    ("** BUILD FAILED **", "Build failed"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    /// `None` when no marker was recognised.
    pub label: Option<String>,
    pub detail: String,
}

impl FailureReport {
    pub fn into_error(self) -> XcpilotError {
        XcpilotError::Tool {
            label: self.label,
            detail: self.detail,
        }
    }
}

/// First matching label in `text`, scheme problems taking precedence.
pub fn failure_label(text: &str) -> Option<&'static str> {
    MARKERS
        .iter()
        .find(|(marker, _)| text.contains(marker))
        .map(|(_, label)| *label)
}

/// Classify a failed run. Returns `None` for a successful one.
pub fn classify_failure(result: &CommandResult) -> Option<FailureReport> {
    let detail = result.error()?;
    Some(FailureReport {
        label: failure_label(&detail).map(str::to_string),
        detail,
    })
}
