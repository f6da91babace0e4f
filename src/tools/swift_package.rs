// src/tools/swift_package.rs

//! `swift build|test|run` for Swift packages.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::errors::{Result, XcpilotError};
use crate::exec::{CommandExecutor, CommandSpec, OutputSink};
use crate::supervisor::ProcessSupervisor;
use crate::tools::into_output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwiftConfiguration {
    #[default]
    Debug,
    Release,
}

impl SwiftConfiguration {
    pub fn as_str(self) -> &'static str {
        match self {
            SwiftConfiguration::Debug => "debug",
            SwiftConfiguration::Release => "release",
        }
    }
}

impl FromStr for SwiftConfiguration {
    type Err = XcpilotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(SwiftConfiguration::Debug),
            "release" => Ok(SwiftConfiguration::Release),
            other => Err(XcpilotError::validation(format!(
                "invalid configuration '{other}' (expected debug or release)"
            ))),
        }
    }
}

/// Options shared by build, test and run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwiftPackageRequest {
    pub package_path: PathBuf,
    pub configuration: SwiftConfiguration,
    pub target: Option<String>,
    pub archs: Vec<String>,
    pub parse_as_library: bool,
}

impl SwiftPackageRequest {
    pub fn new(package_path: impl Into<PathBuf>) -> Self {
        Self {
            package_path: package_path.into(),
            configuration: SwiftConfiguration::Debug,
            target: None,
            archs: Vec::new(),
            parse_as_library: false,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.package_path.as_os_str().is_empty() {
            return Err(XcpilotError::validation("packagePath is required"));
        }
        Ok(())
    }
}

/// A package executable started under the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningPackage {
    pub id: String,
    pub pid: Option<u32>,
}

pub struct SwiftPackage {
    executor: Arc<dyn CommandExecutor>,
    swift: String,
}

impl SwiftPackage {
    pub fn new(executor: Arc<dyn CommandExecutor>, swift: impl Into<String>) -> Self {
        Self {
            executor,
            swift: swift.into(),
        }
    }

    fn base_argv(&self, verb: &str, req: &SwiftPackageRequest) -> Vec<String> {
        let mut argv = vec![
            self.swift.clone(),
            verb.to_string(),
            "--package-path".to_string(),
            req.package_path.display().to_string(),
        ];
        if req.configuration == SwiftConfiguration::Release {
            argv.push("-c".to_string());
            argv.push(req.configuration.as_str().to_string());
        }
        argv
    }

    pub fn build_argv(&self, req: &SwiftPackageRequest) -> Vec<String> {
        let mut argv = self.base_argv("build", req);
        if let Some(target) = &req.target {
            argv.push("--target".to_string());
            argv.push(target.clone());
        }
        for arch in &req.archs {
            argv.push("--arch".to_string());
            argv.push(arch.clone());
        }
        if req.parse_as_library {
            argv.push("-Xswiftc".to_string());
            argv.push("-parse-as-library".to_string());
        }
        argv
    }

    pub fn test_argv(&self, req: &SwiftPackageRequest, filter: Option<&str>) -> Vec<String> {
        let mut argv = self.base_argv("test", req);
        if let Some(filter) = filter {
            argv.push("--filter".to_string());
            argv.push(filter.to_string());
        }
        if req.parse_as_library {
            argv.push("-Xswiftc".to_string());
            argv.push("-parse-as-library".to_string());
        }
        argv
    }

    pub fn run_argv(
        &self,
        req: &SwiftPackageRequest,
        executable: Option<&str>,
        args: &[String],
    ) -> Vec<String> {
        let mut argv = self.base_argv("run", req);
        if let Some(exe) = executable {
            argv.push(exe.to_string());
        }
        if !args.is_empty() {
            argv.push("--".to_string());
            argv.extend(args.iter().cloned());
        }
        argv
    }

    pub async fn build(&self, req: &SwiftPackageRequest) -> Result<String> {
        req.validate()?;
        let result = self
            .executor
            .run(CommandSpec::new("swift build", self.build_argv(req)))
            .await?;
        into_output(result, "Swift package build failed")
    }

    pub async fn test(&self, req: &SwiftPackageRequest, filter: Option<&str>) -> Result<String> {
        req.validate()?;
        let result = self
            .executor
            .run(CommandSpec::new("swift test", self.test_argv(req, filter)))
            .await?;
        into_output(result, "Swift package tests failed")
    }

    /// Start `swift run` detached and hand it to `supervisor`.
    pub fn run_detached(
        &self,
        supervisor: &ProcessSupervisor,
        req: &SwiftPackageRequest,
        executable: Option<&str>,
        args: &[String],
        sink: OutputSink,
    ) -> Result<RunningPackage> {
        req.validate()?;
        let spec = CommandSpec::new("swift run", self.run_argv(req, executable, args));
        let description = spec.command_line();
        let handle = self.executor.spawn_detached(spec, sink)?;
        let pid = handle.pid();

        let id = format!("swift-run-{}", Uuid::new_v4());
        supervisor.register(id.clone(), handle, Utc::now(), description)?;
        info!(process = %id, ?pid, "swift run started");

        Ok(RunningPackage { id, pid })
    }
}
