// src/response.rs

//! The normalized `{success, output, error}` shape returned by every
//! [`Toolbox`](crate::app::Toolbox) operation.

use serde::Serialize;

use crate::build::BuildOutcome;
use crate::errors::{Result, XcpilotError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResponse {
    pub success: bool,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResponse {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn from_result<T: Into<String>>(result: Result<T>) -> Self {
        match result {
            Ok(output) => Self::ok(output),
            Err(err) => err.into(),
        }
    }
}

impl From<XcpilotError> for ToolResponse {
    fn from(err: XcpilotError) -> Self {
        Self::failure(err.to_string())
    }
}

impl From<BuildOutcome> for ToolResponse {
    fn from(outcome: BuildOutcome) -> Self {
        let summary = outcome.test_summary.as_ref().map(ToString::to_string);
        match outcome.failure {
            None => {
                let mut output = outcome.result.stdout;
                if let Some(summary) = summary {
                    if !output.is_empty() && !output.ends_with('\n') {
                        output.push('\n');
                    }
                    output.push_str(&summary);
                }
                Self::ok(output)
            }
            Some(failure) => Self {
                success: false,
                output: summary.unwrap_or_default(),
                error: Some(failure.into_error().to_string()),
            },
        }
    }
}
