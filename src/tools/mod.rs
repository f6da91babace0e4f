// src/tools/mod.rs

//! Typed wrappers over the simulator, device, package and UI-automation tools.

pub mod devicectl;
pub mod simctl;
pub mod swift_package;
pub mod ui_automation;

pub use devicectl::Devicectl;
pub use simctl::{DataNetwork, Simctl};
pub use swift_package::{RunningPackage, SwiftConfiguration, SwiftPackage, SwiftPackageRequest};
pub use ui_automation::{HardwareButton, UiAction, UiAutomation};

use crate::build::failure_label;
use crate::errors::{Result, XcpilotError};
use crate::exec::CommandResult;

/// Turn a completed run into its stdout, or a tool error carrying the
/// verbatim diagnostic text.
pub(crate) fn into_output(result: CommandResult, label: &str) -> Result<String> {
    match result.error() {
        None => Ok(result.stdout),
        Some(detail) => Err(XcpilotError::Tool {
            label: Some(failure_label(&detail).unwrap_or(label).to_string()),
            detail,
        }),
    }
}
