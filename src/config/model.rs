// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::BackendPreference;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [tools]
/// xcodebuild = "/Applications/Xcode.app/Contents/Developer/usr/bin/xcodebuild"
/// axe = "axe"
///
/// [build]
/// default_configuration = "Debug"
/// incremental = true
///
/// [supervisor]
/// grace_ms = 3000
///
/// [log_capture]
/// log_dir = "/tmp/xcpilot-logs"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub tools: ToolsSection,

    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub supervisor: SupervisorSection,

    #[serde(default)]
    pub log_capture: LogCaptureSection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`
/// (see `config::validate`) or [`ConfigFile::default`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub tools: ToolsSection,
    pub build: BuildSection,
    pub supervisor: SupervisorSection,
    pub log_capture: LogCaptureSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            tools: raw.tools,
            build: raw.build,
            supervisor: raw.supervisor,
            log_capture: raw.log_capture,
        }
    }

    /// Grace period between SIGTERM and SIGKILL.
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.supervisor.grace_ms)
    }

    /// Directory where session log files are created.
    pub fn log_dir(&self) -> PathBuf {
        self.log_capture
            .log_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Backend preference applied when a request does not say otherwise.
    pub fn backend_preference(&self) -> BackendPreference {
        if self.build.incremental {
            BackendPreference::Incremental
        } else {
            BackendPreference::Conventional
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[tools]` section: where to find each external binary.
///
/// Bare names are resolved on `PATH` at spawn time.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    #[serde(default = "default_xcodebuild")]
    pub xcodebuild: String,
    #[serde(default = "default_xcrun")]
    pub xcrun: String,
    #[serde(default = "default_swift")]
    pub swift: String,
    #[serde(default = "default_axe")]
    pub axe: String,
    #[serde(default = "default_xcodemake")]
    pub xcodemake: String,
    #[serde(default = "default_make")]
    pub make: String,
}

fn default_xcodebuild() -> String {
    "xcodebuild".to_string()
}

fn default_xcrun() -> String {
    "xcrun".to_string()
}

fn default_swift() -> String {
    "swift".to_string()
}

fn default_axe() -> String {
    "axe".to_string()
}

fn default_xcodemake() -> String {
    "xcodemake".to_string()
}

fn default_make() -> String {
    "make".to_string()
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            xcodebuild: default_xcodebuild(),
            xcrun: default_xcrun(),
            swift: default_swift(),
            axe: default_axe(),
            xcodemake: default_xcodemake(),
            make: default_make(),
        }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Used when a request does not name a configuration.
    #[serde(default = "default_configuration")]
    pub default_configuration: String,

    /// Prefer the incremental backend for plain builds.
    #[serde(default)]
    pub incremental: bool,
}

fn default_configuration() -> String {
    "Debug".to_string()
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            default_configuration: default_configuration(),
            incremental: false,
        }
    }
}

/// `[supervisor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorSection {
    /// Milliseconds to wait after SIGTERM before sending SIGKILL.
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
}

fn default_grace_ms() -> u64 {
    3000
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            grace_ms: default_grace_ms(),
        }
    }
}

/// `[log_capture]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LogCaptureSection {
    /// If `None`, session files go to the OS temp directory.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Subsystem added by the `swiftui` filter.
    #[serde(default = "default_ui_framework_subsystem")]
    pub ui_framework_subsystem: String,

    /// Value for `log stream --level`.
    #[serde(default = "default_stream_level")]
    pub level: String,
}

fn default_ui_framework_subsystem() -> String {
    "com.apple.SwiftUI".to_string()
}

fn default_stream_level() -> String {
    "debug".to_string()
}

impl Default for LogCaptureSection {
    fn default() -> Self {
        Self {
            log_dir: None,
            ui_framework_subsystem: default_ui_framework_subsystem(),
            level: default_stream_level(),
        }
    }
}
