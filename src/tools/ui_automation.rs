// src/tools/ui_automation.rs

//! UI automation through the `axe` binary.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::{Result, XcpilotError};
use crate::exec::{ensure_binary, CommandExecutor, CommandSpec};
use crate::tools::into_output;
use crate::tools::simctl::require;

const AXE_REMEDIATION: &str =
    "The 'axe' binary is required for UI automation. Install it (brew install cameroncooke/axe/axe) or set [tools].axe in the config.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareButton {
    ApplePay,
    Home,
    Lock,
    SideButton,
    Siri,
}

impl HardwareButton {
    pub fn as_str(self) -> &'static str {
        match self {
            HardwareButton::ApplePay => "apple-pay",
            HardwareButton::Home => "home",
            HardwareButton::Lock => "lock",
            HardwareButton::SideButton => "side-button",
            HardwareButton::Siri => "siri",
        }
    }
}

impl fmt::Display for HardwareButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HardwareButton {
    type Err = XcpilotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "apple-pay" => Ok(HardwareButton::ApplePay),
            "home" => Ok(HardwareButton::Home),
            "lock" => Ok(HardwareButton::Lock),
            "side-button" => Ok(HardwareButton::SideButton),
            "siri" => Ok(HardwareButton::Siri),
            other => Err(XcpilotError::validation(format!("unknown button '{other}'"))),
        }
    }
}

/// One UI-automation verb.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Tap {
        x: i32,
        y: i32,
    },
    Swipe {
        from: (i32, i32),
        to: (i32, i32),
        duration: Option<f64>,
    },
    Button(HardwareButton),
    /// HID keycode.
    Key(u8),
    KeySequence(Vec<u8>),
    Type(String),
}

impl UiAction {
    pub fn verb(&self) -> &'static str {
        match self {
            UiAction::Tap { .. } => "tap",
            UiAction::Swipe { .. } => "swipe",
            UiAction::Button(_) => "button",
            UiAction::Key(_) => "key",
            UiAction::KeySequence(_) => "key-sequence",
            UiAction::Type(_) => "type",
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            UiAction::Swipe {
                duration: Some(d), ..
            } if *d <= 0.0 => Err(XcpilotError::validation("swipe duration must be positive")),
            UiAction::KeySequence(keys) if keys.is_empty() => {
                Err(XcpilotError::validation("key sequence must not be empty"))
            }
            UiAction::Type(text) if text.is_empty() => {
                Err(XcpilotError::validation("text to type must not be empty"))
            }
            _ => Ok(()),
        }
    }

    /// Verb-specific arguments, not including the binary or `--udid`.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![self.verb().to_string()];
        match self {
            UiAction::Tap { x, y } => {
                args.extend(["-x".to_string(), x.to_string(), "-y".to_string(), y.to_string()]);
            }
            UiAction::Swipe { from, to, duration } => {
                args.extend([
                    "--start-x".to_string(),
                    from.0.to_string(),
                    "--start-y".to_string(),
                    from.1.to_string(),
                    "--end-x".to_string(),
                    to.0.to_string(),
                    "--end-y".to_string(),
                    to.1.to_string(),
                ]);
                if let Some(d) = duration {
                    args.push("--duration".to_string());
                    args.push(d.to_string());
                }
            }
            UiAction::Button(button) => args.push(button.as_str().to_string()),
            UiAction::Key(code) => args.push(code.to_string()),
            UiAction::KeySequence(codes) => {
                args.push("--keycodes".to_string());
                args.push(
                    codes
                        .iter()
                        .map(u8::to_string)
                        .collect::<Vec<_>>()
                        .join(","),
                );
            }
            UiAction::Type(text) => args.push(text.clone()),
        }
        args
    }
}

pub struct UiAutomation {
    executor: Arc<dyn CommandExecutor>,
    axe: String,
}

impl UiAutomation {
    pub fn new(executor: Arc<dyn CommandExecutor>, axe: impl Into<String>) -> Self {
        Self {
            executor,
            axe: axe.into(),
        }
    }

    /// Run one verb against a simulator.
    ///
    /// A missing `axe` binary is reported before anything is spawned.
    pub async fn perform(&self, simulator_id: &str, action: &UiAction) -> Result<String> {
        require("simulatorId", simulator_id)?;
        action.validate()?;
        let axe = ensure_binary(&self.axe, AXE_REMEDIATION)?;

        let mut argv = vec![axe.display().to_string()];
        argv.extend(action.args());
        argv.push("--udid".to_string());
        argv.push(simulator_id.to_string());

        let result = self
            .executor
            .run(CommandSpec::new(format!("axe {}", action.verb()), argv))
            .await?;
        into_output(result, &format!("Failed to {}", action.verb()))
    }
}
