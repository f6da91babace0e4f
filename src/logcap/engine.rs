// src/logcap/engine.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ConfigFile;
use crate::errors::{Result, XcpilotError};
use crate::exec::{CommandExecutor, CommandSpec, OutputSink, ProcessHandle};
use crate::fs::FileSystem;
use crate::logcap::filter::SubsystemFilter;
use crate::logcap::session::{
    CaptureMode, LogCaptureSession, SessionState, SessionSummary, StartedCapture,
};
use crate::supervisor::{escalate, DEFAULT_GRACE};

const LOG_FILE_PREFIX: &str = "xcpilot_sim_log_";

/// Owns every log-capture session for the lifetime of the process.
///
/// Sessions are independent: any number may target the same simulator or
/// bundle, each with its own file and producers.
pub struct LogCaptureEngine {
    executor: Arc<dyn CommandExecutor>,
    fs: Arc<dyn FileSystem>,
    xcrun: String,
    log_dir: PathBuf,
    ui_subsystem: String,
    level: String,
    grace: Duration,
    sessions: Mutex<BTreeMap<String, LogCaptureSession>>,
}

impl LogCaptureEngine {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        fs: Arc<dyn FileSystem>,
        log_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executor,
            fs,
            xcrun: "xcrun".to_string(),
            log_dir: log_dir.into(),
            ui_subsystem: "com.apple.SwiftUI".to_string(),
            level: "debug".to_string(),
            grace: DEFAULT_GRACE,
            sessions: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn from_config(
        executor: Arc<dyn CommandExecutor>,
        fs: Arc<dyn FileSystem>,
        cfg: &ConfigFile,
    ) -> Self {
        let mut engine = Self::new(executor, fs, cfg.log_dir()).with_grace(cfg.grace());
        engine.xcrun = cfg.tools.xcrun.clone();
        engine.ui_subsystem = cfg.log_capture.ui_framework_subsystem.clone();
        engine.level = cfg.log_capture.level.clone();
        engine
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, LogCaptureSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn log_path_for(&self, session_id: &str) -> PathBuf {
        self.log_dir
            .join(format!("{LOG_FILE_PREFIX}{session_id}.log"))
    }

    /// Relaunches the app attached to a pseudo-terminal so its console
    /// output can be captured.
    pub fn console_spec(&self, simulator_id: &str, bundle_id: &str) -> CommandSpec {
        CommandSpec::new(
            "simctl launch --console-pty",
            [
                self.xcrun.as_str(),
                "simctl",
                "launch",
                "--console-pty",
                "--terminate-running-process",
                simulator_id,
                bundle_id,
            ],
        )
    }

    pub fn stream_spec(
        &self,
        simulator_id: &str,
        bundle_id: &str,
        filter: &SubsystemFilter,
    ) -> CommandSpec {
        let mut argv = vec![
            self.xcrun.clone(),
            "simctl".to_string(),
            "spawn".to_string(),
            simulator_id.to_string(),
            "log".to_string(),
            "stream".to_string(),
            format!("--level={}", self.level),
        ];
        if let Some(predicate) = filter.predicate(bundle_id, &self.ui_subsystem) {
            argv.push("--predicate".to_string());
            argv.push(predicate);
        }
        CommandSpec::new("simctl log stream", argv)
    }

    /// Start a session and its producers.
    ///
    /// The session is registered before anything is spawned. If a producer
    /// fails to spawn, the ones already running are torn down, the session is
    /// dropped and its file deleted before the error is returned.
    pub async fn start_capture(
        &self,
        simulator_id: &str,
        bundle_id: &str,
        capture_console: bool,
        filter: SubsystemFilter,
    ) -> Result<StartedCapture> {
        if simulator_id.trim().is_empty() {
            return Err(XcpilotError::validation("simulatorId is required"));
        }
        if bundle_id.trim().is_empty() {
            return Err(XcpilotError::validation("bundleId is required"));
        }

        let id = Uuid::new_v4().to_string();
        let log_path = self.log_path_for(&id);
        self.fs.write(&log_path, b"")?;

        let mode = CaptureMode::from_console_flag(capture_console);
        let mut specs = Vec::with_capacity(2);
        if mode == CaptureMode::StructuredWithConsole {
            specs.push(self.console_spec(simulator_id, bundle_id));
        }
        specs.push(self.stream_spec(simulator_id, bundle_id, &filter));

        self.lock().insert(
            id.clone(),
            LogCaptureSession {
                id: id.clone(),
                simulator_id: simulator_id.to_string(),
                bundle_id: bundle_id.to_string(),
                mode,
                filter,
                producers: Vec::new(),
                log_path: log_path.clone(),
                created_at: Utc::now(),
                state: SessionState::Active,
            },
        );
        debug!(session = %id, "session registered");

        let mut producers: Vec<Box<dyn ProcessHandle>> = Vec::with_capacity(specs.len());
        for spec in specs {
            let label = spec.label().to_string();
            match self
                .executor
                .spawn_detached(spec, OutputSink::AppendTo(log_path.clone()))
            {
                Ok(handle) => producers.push(handle),
                Err(err) => {
                    warn!(session = %id, producer = %label, error = %err, "producer failed to start");
                    self.teardown(&id, producers).await;
                    self.lock().remove(&id);
                    self.delete_log(&log_path);
                    return Err(err);
                }
            }
        }

        let orphans = {
            let mut sessions = self.lock();
            match sessions.get_mut(&id) {
                Some(session) if session.state == SessionState::Active => {
                    session.producers.extend(producers);
                    None
                }
                _ => Some(producers),
            }
        };
        if let Some(orphans) = orphans {
            self.teardown(&id, orphans).await;
            return Err(XcpilotError::NotFound(format!(
                "log capture session '{id}' was stopped while starting"
            )));
        }

        info!(
            session = %id,
            simulator = %simulator_id,
            bundle = %bundle_id,
            ?mode,
            log_file = ?log_path,
            "log capture started"
        );

        Ok(StartedCapture {
            session_id: id,
            log_file_path: log_path,
        })
    }

    /// Stop a session and return everything its producers wrote.
    ///
    /// An unknown id fails before touching the filesystem.
    pub async fn stop_capture(&self, session_id: &str) -> Result<String> {
        let (producers, log_path) = {
            let mut sessions = self.lock();
            let session = sessions
                .get_mut(session_id)
                .filter(|s| s.state == SessionState::Active)
                .ok_or_else(|| {
                    XcpilotError::NotFound(format!("no active log capture session '{session_id}'"))
                })?;
            session.state = SessionState::Stopped;
            (
                std::mem::take(&mut session.producers),
                session.log_path.clone(),
            )
        };

        self.teardown(session_id, producers).await;

        let text = self.fs.read_to_string(&log_path);
        self.delete_log(&log_path);
        self.lock().remove(session_id);

        let text = text?;
        info!(session = %session_id, bytes = text.len(), "log capture stopped");
        Ok(text)
    }

    /// Active sessions, ordered by id.
    pub fn active_sessions(&self) -> Vec<SessionSummary> {
        self.lock()
            .values()
            .filter(|s| s.state == SessionState::Active)
            .map(|s| SessionSummary {
                id: s.id.clone(),
                simulator_id: s.simulator_id.clone(),
                bundle_id: s.bundle_id.clone(),
                mode: s.mode,
                log_path: s.log_path.clone(),
                created_at: s.created_at,
            })
            .collect()
    }

    pub fn is_active(&self, session_id: &str) -> bool {
        self.lock()
            .get(session_id)
            .is_some_and(|s| s.state == SessionState::Active)
    }

    /// Stop every active session.
    pub async fn stop_all(&self) -> Vec<(String, Result<String>)> {
        let ids: Vec<String> = self.active_sessions().into_iter().map(|s| s.id).collect();
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            let res = self.stop_capture(&id).await;
            results.push((id, res));
        }
        results
    }

    async fn teardown(&self, session_id: &str, producers: Vec<Box<dyn ProcessHandle>>) {
        for mut handle in producers {
            let pid = handle.pid();
            match escalate(handle.as_mut(), self.grace).await {
                Ok(kind) => debug!(session = %session_id, ?pid, ?kind, "producer stopped"),
                Err(err) => {
                    warn!(session = %session_id, ?pid, error = %err, "producer did not stop cleanly")
                }
            }
        }
    }

    fn delete_log(&self, path: &Path) {
        if let Err(err) = self.fs.remove_file(path) {
            warn!(path = ?path, error = %err, "failed to delete session log");
        }
    }
}
