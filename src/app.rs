// src/app.rs

//! Application façade.
//!
//! [`Toolbox`] owns one executor, one filesystem, one process supervisor and
//! one log-capture engine for the lifetime of the process, and exposes every
//! operation as a [`ToolResponse`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::build::{BuildComposer, BuildIntent, ProjectRef};
use crate::config::ConfigFile;
use crate::errors::Result;
use crate::exec::{CommandExecutor, OutputSink, RealCommandExecutor};
use crate::fs::{FileSystem, RealFileSystem};
use crate::logcap::{LogCaptureEngine, SubsystemFilter};
use crate::response::ToolResponse;
use crate::supervisor::ProcessSupervisor;
use crate::tools::{
    DataNetwork, Devicectl, RunningPackage, Simctl, SwiftPackage, SwiftPackageRequest, UiAction,
    UiAutomation,
};

pub struct Toolbox {
    config: ConfigFile,
    composer: BuildComposer,
    simctl: Simctl,
    devicectl: Devicectl,
    swift: SwiftPackage,
    ui: UiAutomation,
    supervisor: Arc<ProcessSupervisor>,
    log_capture: Arc<LogCaptureEngine>,
}

impl Toolbox {
    pub fn new(
        config: ConfigFile,
        executor: Arc<dyn CommandExecutor>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let tools = &config.tools;
        Self {
            composer: BuildComposer::from_config(executor.clone(), fs.clone(), &config),
            simctl: Simctl::new(executor.clone(), tools.xcrun.clone()),
            devicectl: Devicectl::new(executor.clone(), tools.xcrun.clone()),
            swift: SwiftPackage::new(executor.clone(), tools.swift.clone()),
            ui: UiAutomation::new(executor.clone(), tools.axe.clone()),
            supervisor: Arc::new(ProcessSupervisor::new(config.grace())),
            log_capture: Arc::new(LogCaptureEngine::from_config(executor, fs, &config)),
            config,
        }
    }

    /// Production wiring: real processes, real filesystem.
    pub fn with_real_backends(config: ConfigFile) -> Self {
        Self::new(
            config,
            Arc::new(RealCommandExecutor::new()),
            Arc::new(RealFileSystem),
        )
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn composer(&self) -> &BuildComposer {
        &self.composer
    }

    pub fn supervisor(&self) -> Arc<ProcessSupervisor> {
        self.supervisor.clone()
    }

    pub fn log_capture(&self) -> Arc<LogCaptureEngine> {
        self.log_capture.clone()
    }

    pub async fn build(&self, intent: &BuildIntent) -> ToolResponse {
        match self.composer.build(intent).await {
            Ok(outcome) => outcome.into(),
            Err(err) => err.into(),
        }
    }

    pub async fn test(&self, intent: &BuildIntent) -> ToolResponse {
        match self.composer.test(intent).await {
            Ok(outcome) => outcome.into(),
            Err(err) => err.into(),
        }
    }

    pub async fn clean(&self, intent: &BuildIntent) -> ToolResponse {
        match self.composer.clean(intent).await {
            Ok(outcome) => outcome.into(),
            Err(err) => err.into(),
        }
    }

    pub async fn list_schemes(&self, project: &ProjectRef) -> ToolResponse {
        ToolResponse::from_result(self.composer.list_schemes(project).await.map(|schemes| {
            if schemes.is_empty() {
                "No schemes found".to_string()
            } else {
                schemes.join("\n")
            }
        }))
    }

    pub async fn show_build_settings(&self, intent: &BuildIntent) -> ToolResponse {
        ToolResponse::from_result(self.composer.show_build_settings(intent).await)
    }

    pub async fn app_path(&self, intent: &BuildIntent) -> ToolResponse {
        ToolResponse::from_result(
            self.composer
                .app_path(intent)
                .await
                .map(|p| p.display().to_string()),
        )
    }

    pub async fn list_simulators(&self) -> ToolResponse {
        ToolResponse::from_result(self.simctl.list_devices().await.map(|list| list.to_string()))
    }

    pub async fn screenshot(&self, simulator_id: &str, output: &Path) -> ToolResponse {
        ToolResponse::from_result(
            self.simctl
                .screenshot(simulator_id, output)
                .await
                .map(|p| format!("Screenshot saved to {}", p.display())),
        )
    }

    pub async fn launch_app(&self, simulator_id: &str, bundle_id: &str, args: &[String]) -> ToolResponse {
        ToolResponse::from_result(self.simctl.launch_app(simulator_id, bundle_id, args).await)
    }

    pub async fn set_status_bar(&self, simulator_id: &str, network: DataNetwork) -> ToolResponse {
        ToolResponse::from_result(self.simctl.set_status_bar(simulator_id, network).await)
    }

    pub async fn set_location(&self, simulator_id: &str, latitude: f64, longitude: f64) -> ToolResponse {
        ToolResponse::from_result(
            self.simctl
                .set_location(simulator_id, latitude, longitude)
                .await,
        )
    }

    pub async fn install_on_device(&self, device_id: &str, app_path: &Path) -> ToolResponse {
        ToolResponse::from_result(self.devicectl.install_app(device_id, app_path).await)
    }

    pub async fn terminate_on_device(&self, device_id: &str, pid: u32) -> ToolResponse {
        ToolResponse::from_result(self.devicectl.terminate_process(device_id, pid).await)
    }

    pub async fn ui(&self, simulator_id: &str, action: &UiAction) -> ToolResponse {
        ToolResponse::from_result(self.ui.perform(simulator_id, action).await)
    }

    pub async fn swift_build(&self, req: &SwiftPackageRequest) -> ToolResponse {
        ToolResponse::from_result(self.swift.build(req).await)
    }

    pub async fn swift_test(&self, req: &SwiftPackageRequest, filter: Option<&str>) -> ToolResponse {
        ToolResponse::from_result(self.swift.test(req, filter).await)
    }

    /// Start a package executable under the supervisor; output goes to `log`
    /// when given, otherwise it is discarded.
    pub fn start_package(
        &self,
        req: &SwiftPackageRequest,
        executable: Option<&str>,
        args: &[String],
        log: Option<PathBuf>,
    ) -> Result<RunningPackage> {
        let sink = log.map_or(OutputSink::Null, OutputSink::AppendTo);
        self.swift
            .run_detached(&self.supervisor, req, executable, args, sink)
    }

    pub fn swift_run(
        &self,
        req: &SwiftPackageRequest,
        executable: Option<&str>,
        args: &[String],
        log: Option<PathBuf>,
    ) -> ToolResponse {
        ToolResponse::from_result(self.start_package(req, executable, args, log).map(
            |running| match running.pid {
                Some(pid) => format!("Started {} (pid {pid})", running.id),
                None => format!("Started {}", running.id),
            },
        ))
    }

    pub async fn stop_process(&self, id: &str) -> ToolResponse {
        ToolResponse::from_result(self.supervisor.stop(id).await.map(|report| {
            format!(
                "Stopped {} ({}), started at {}, {:?}",
                report.id,
                report.description,
                report.started_at.to_rfc3339(),
                report.termination
            )
        }))
    }

    pub fn list_processes(&self) -> ToolResponse {
        let processes = self.supervisor.list();
        if processes.is_empty() {
            return ToolResponse::ok("No running processes");
        }
        let lines: Vec<String> = processes
            .iter()
            .map(|p| format!("{}  {}  {}", p.id, p.started_at.to_rfc3339(), p.description))
            .collect();
        ToolResponse::ok(lines.join("\n"))
    }

    pub async fn start_log_capture(
        &self,
        simulator_id: &str,
        bundle_id: &str,
        capture_console: bool,
        filter: SubsystemFilter,
    ) -> ToolResponse {
        ToolResponse::from_result(
            self.log_capture
                .start_capture(simulator_id, bundle_id, capture_console, filter)
                .await
                .map(|started| {
                    format!(
                        "Log capture started with session ID: {}\nLog file: {}",
                        started.session_id,
                        started.log_file_path.display()
                    )
                }),
        )
    }

    pub async fn stop_log_capture(&self, session_id: &str) -> ToolResponse {
        ToolResponse::from_result(self.log_capture.stop_capture(session_id).await)
    }

    /// Stop every log session and supervised process.
    pub async fn shutdown(&self) {
        let sessions = self.log_capture.stop_all().await;
        let processes = self.supervisor.stop_all().await;
        for (id, res) in sessions {
            if let Err(err) = res {
                warn!(session = %id, error = %err, "failed to stop log capture during shutdown");
            }
        }
        for (id, res) in processes {
            if let Err(err) = res {
                warn!(process = %id, error = %err, "failed to stop process during shutdown");
            }
        }
        info!("shutdown complete");
    }
}
