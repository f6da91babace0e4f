// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Every failure is one of four classes (see [`ErrorClass`]):
//! - validation: a request was rejected before anything was spawned
//! - dependency: a required external binary is missing
//! - tool: the external process ran and reported failure
//! - system: spawn, I/O or signal delivery failed

use thiserror::Error;

#[derive(Error, Debug)]
pub enum XcpilotError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Missing dependency '{tool}': {remediation}")]
    Dependency { tool: String, remediation: String },

    /// The external tool ran and failed. `detail` is its own diagnostic text.
    #[error("{}", tool_message(.label.as_deref(), .detail))]
    Tool {
        label: Option<String>,
        detail: String,
    },

    #[error("Could not parse {what}: {reason}")]
    Parse { what: String, reason: String },

    #[error("System error: {0}")]
    System(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification used when reporting errors upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Dependency,
    Tool,
    System,
    NotFound,
}

impl XcpilotError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn dependency(tool: impl Into<String>, remediation: impl Into<String>) -> Self {
        Self::Dependency {
            tool: tool.into(),
            remediation: remediation.into(),
        }
    }

    /// Wrap an OS-level failure together with what we were doing at the time.
    pub fn system(context: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::System(format!("{context}: {err}"))
    }

    pub fn parse(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            reason: reason.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) | Self::ConfigError(_) | Self::TomlError(_) => {
                ErrorClass::Validation
            }
            Self::Dependency { .. } => ErrorClass::Dependency,
            Self::Tool { .. } | Self::Parse { .. } => ErrorClass::Tool,
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::System(_) | Self::IoError(_) | Self::Other(_) => ErrorClass::System,
        }
    }
}

fn tool_message(label: Option<&str>, detail: &str) -> String {
    match label {
        Some(label) => format!("{label}: {detail}"),
        None => detail.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, XcpilotError>;
