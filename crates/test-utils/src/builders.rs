#![allow(dead_code)]

use std::path::{Path, PathBuf};

use xcpilot::build::{BuildIntent, ProjectRef, Selector};
use xcpilot::config::{ConfigFile, RawConfigFile};
use xcpilot::types::Platform;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_tool(mut self, name: &str, path: &str) -> Self {
        let tools = &mut self.config.tools;
        let slot = match name {
            "xcodebuild" => &mut tools.xcodebuild,
            "xcrun" => &mut tools.xcrun,
            "swift" => &mut tools.swift,
            "axe" => &mut tools.axe,
            "xcodemake" => &mut tools.xcodemake,
            "make" => &mut tools.make,
            other => panic!("unknown tool '{other}'"),
        };
        *slot = path.to_string();
        self
    }

    pub fn with_grace_ms(mut self, grace_ms: u64) -> Self {
        self.config.supervisor.grace_ms = grace_ms;
        self
    }

    pub fn with_log_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.log_capture.log_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_default_configuration(mut self, configuration: &str) -> Self {
        self.config.build.default_configuration = configuration.to_string();
        self
    }

    pub fn incremental(mut self, val: bool) -> Self {
        self.config.build.incremental = val;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `BuildIntent` with workspace/scheme defaults filled in.
pub struct IntentBuilder {
    intent: BuildIntent,
}

impl IntentBuilder {
    /// `/tmp/App.xcworkspace`, scheme `App`, iOS Simulator.
    pub fn new() -> Self {
        Self {
            intent: BuildIntent::new(
                ProjectRef::Workspace(PathBuf::from("/tmp/App.xcworkspace")),
                "App",
                Platform::IosSimulator,
            ),
        }
    }

    pub fn project(mut self, path: &str) -> Self {
        self.intent.project = ProjectRef::Project(PathBuf::from(path));
        self
    }

    pub fn workspace(mut self, path: &str) -> Self {
        self.intent.project = ProjectRef::Workspace(PathBuf::from(path));
        self
    }

    pub fn scheme(mut self, scheme: &str) -> Self {
        self.intent.scheme = scheme.to_string();
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.intent.platform = platform;
        self
    }

    pub fn simulator_id(mut self, id: &str) -> Self {
        self.intent.selector = Some(Selector::SimulatorId(id.to_string()));
        self
    }

    pub fn simulator_name(mut self, name: &str, use_latest_os: bool) -> Self {
        self.intent.selector = Some(Selector::SimulatorName {
            name: name.to_string(),
            use_latest_os,
        });
        self
    }

    pub fn device_id(mut self, id: &str) -> Self {
        self.intent.selector = Some(Selector::DeviceId(id.to_string()));
        self
    }

    pub fn configuration(mut self, configuration: &str) -> Self {
        self.intent.configuration = Some(configuration.to_string());
        self
    }

    pub fn arch(mut self, arch: &str) -> Self {
        self.intent.archs.push(arch.to_string());
        self
    }

    pub fn incremental(mut self) -> Self {
        self.intent.backend = xcpilot::types::BackendPreference::Incremental;
        self
    }

    pub fn build(self) -> BuildIntent {
        self.intent
    }
}

impl Default for IntentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
