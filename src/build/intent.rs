// src/build/intent.rs

//! Abstract description of what the caller wants built.

use std::path::{Path, PathBuf};

use crate::errors::{Result, XcpilotError};
use crate::types::{BackendPreference, Platform};

/// The container being built. Exactly one is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRef {
    Project(PathBuf),
    Workspace(PathBuf),
}

impl ProjectRef {
    /// Build from the two optional inputs callers usually have, rejecting
    /// both-or-neither.
    pub fn from_paths(project: Option<PathBuf>, workspace: Option<PathBuf>) -> Result<Self> {
        match (project, workspace) {
            (Some(p), None) => Ok(ProjectRef::Project(p)),
            (None, Some(w)) => Ok(ProjectRef::Workspace(w)),
            (Some(_), Some(_)) => Err(XcpilotError::validation(
                "projectPath and workspacePath are mutually exclusive; provide only one",
            )),
            (None, None) => Err(XcpilotError::validation(
                "either projectPath or workspacePath is required",
            )),
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            ProjectRef::Project(_) => "-project",
            ProjectRef::Workspace(_) => "-workspace",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ProjectRef::Project(p) | ProjectRef::Workspace(p) => p,
        }
    }
}

/// Which device or simulator to target. `None` on the intent means the
/// platform alone decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    DeviceId(String),
    SimulatorId(String),
    SimulatorName { name: String, use_latest_os: bool },
}

impl Selector {
    /// Build from loose inputs, rejecting more than one selector.
    ///
    /// `use_latest_os` only matters together with a simulator name.
    pub fn from_parts(
        device_id: Option<String>,
        simulator_id: Option<String>,
        simulator_name: Option<String>,
        use_latest_os: bool,
    ) -> Result<Option<Self>> {
        let given = [&device_id, &simulator_id, &simulator_name]
            .iter()
            .filter(|v| v.is_some())
            .count();
        if given > 1 {
            return Err(XcpilotError::validation(
                "deviceId, simulatorId and simulatorName are mutually exclusive; provide only one",
            ));
        }

        Ok(if let Some(id) = device_id {
            Some(Selector::DeviceId(id))
        } else if let Some(id) = simulator_id {
            Some(Selector::SimulatorId(id))
        } else {
            simulator_name.map(|name| Selector::SimulatorName {
                name,
                use_latest_os,
            })
        })
    }
}

/// Everything needed to compose one build-tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildIntent {
    pub project: ProjectRef,
    pub scheme: String,
    /// `None` falls back to the configured default (normally `Debug`).
    pub configuration: Option<String>,
    pub selector: Option<Selector>,
    pub platform: Platform,
    pub archs: Vec<String>,
    pub derived_data_path: Option<PathBuf>,
    pub extra_args: Vec<String>,
    pub backend: BackendPreference,
}

impl BuildIntent {
    pub fn new(project: ProjectRef, scheme: impl Into<String>, platform: Platform) -> Self {
        Self {
            project,
            scheme: scheme.into(),
            configuration: None,
            selector: None,
            platform,
            archs: Vec::new(),
            derived_data_path: None,
            extra_args: Vec::new(),
            backend: BackendPreference::Conventional,
        }
    }

    pub fn with_configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = Some(configuration.into());
        self
    }

    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.archs.push(arch.into());
        self
    }

    pub fn with_derived_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.derived_data_path = Some(path.into());
        self
    }

    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_backend(mut self, backend: BackendPreference) -> Self {
        self.backend = backend;
        self
    }

    /// Checks that must pass before anything is spawned.
    pub fn validate(&self) -> Result<()> {
        if self.scheme.trim().is_empty() {
            return Err(XcpilotError::validation("scheme is required"));
        }
        if self.project.path().as_os_str().is_empty() {
            return Err(XcpilotError::validation(format!(
                "{} path must not be empty",
                self.project.flag().trim_start_matches('-')
            )));
        }
        if let Some(configuration) = &self.configuration {
            if configuration.trim().is_empty() {
                return Err(XcpilotError::validation("configuration must not be empty"));
            }
        }

        match &self.selector {
            Some(Selector::DeviceId(id)) => {
                if id.trim().is_empty() {
                    return Err(XcpilotError::validation("deviceId must not be empty"));
                }
                if !self.platform.is_device() {
                    return Err(XcpilotError::validation(format!(
                        "deviceId targets a physical device, but platform is {}",
                        self.platform
                    )));
                }
            }
            Some(Selector::SimulatorId(id)) => {
                if id.trim().is_empty() {
                    return Err(XcpilotError::validation("simulatorId must not be empty"));
                }
                self.require_simulator_platform("simulatorId")?;
            }
            Some(Selector::SimulatorName { name, .. }) => {
                if name.trim().is_empty() {
                    return Err(XcpilotError::validation("simulatorName must not be empty"));
                }
                self.require_simulator_platform("simulatorName")?;
            }
            None => {}
        }

        Ok(())
    }

    fn require_simulator_platform(&self, field: &str) -> Result<()> {
        if self.platform.is_simulator() {
            Ok(())
        } else {
            Err(XcpilotError::validation(format!(
                "{field} requires a simulator platform, but platform is {}",
                self.platform
            )))
        }
    }
}
