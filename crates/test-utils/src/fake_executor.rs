use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use xcpilot::errors::{Result, XcpilotError};
use xcpilot::exec::{
    BoxFuture, CommandExecutor, CommandResult, CommandSpec, ExitInfo, OutputSink, ProcessHandle,
};
use xcpilot::fs::FileSystem;
use xcpilot::fs::mock::MockFileSystem;

static NEXT_PID: AtomicU32 = AtomicU32::new(40_000);

/// A successful result with the given stdout.
pub fn ok_result(stdout: &str) -> CommandResult {
    CommandResult::new(true, stdout, "", Some(0), Some(1))
}

/// A failed result with the given stderr and exit code.
pub fn failed_result(stderr: &str, code: i32) -> CommandResult {
    CommandResult::new(false, "", stderr, Some(code), Some(1))
}

/// Scripted reply to `run`.
#[derive(Debug, Clone)]
pub enum RunReply {
    Result(CommandResult),
    /// Launch failure: binary not found.
    Missing(String),
    /// Launch failure: any other OS error.
    SystemFailure(String),
}

impl RunReply {
    fn into_result(self) -> Result<CommandResult> {
        match self {
            RunReply::Result(r) => Ok(r),
            RunReply::Missing(tool) => Err(XcpilotError::dependency(
                tool.clone(),
                format!("'{tool}' could not be found"),
            )),
            RunReply::SystemFailure(msg) => Err(XcpilotError::System(msg)),
        }
    }
}

/// How a fake process reacts to signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitMode {
    /// Exits as soon as SIGTERM arrives.
    OnTerminate,
    /// Ignores SIGTERM, dies on SIGKILL.
    OnKill,
    /// Never exits, even after SIGKILL.
    Never,
}

/// Scripted behaviour for `spawn_detached`.
#[derive(Debug, Clone)]
pub struct SpawnReply {
    /// Appended to the sink's file (if a mock filesystem is attached).
    pub output: Option<String>,
    pub exit_mode: ExitMode,
    /// If set, `terminate` fails with this system error.
    pub terminate_error: Option<String>,
    /// If set, the spawn itself fails with this system error.
    pub fail: Option<String>,
}

impl Default for SpawnReply {
    fn default() -> Self {
        Self {
            output: None,
            exit_mode: ExitMode::OnTerminate,
            terminate_error: None,
            fail: None,
        }
    }
}

impl SpawnReply {
    pub fn writes(output: &str) -> Self {
        Self {
            output: Some(output.to_string()),
            ..Self::default()
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail: Some(msg.to_string()),
            ..Self::default()
        }
    }

    pub fn exit_mode(mut self, mode: ExitMode) -> Self {
        self.exit_mode = mode;
        self
    }

    pub fn terminate_error(mut self, msg: &str) -> Self {
        self.terminate_error = Some(msg.to_string());
        self
    }
}

/// A fake executor that:
/// - records every spec it was given
/// - answers `run` from pattern rules (first rule whose pattern occurs in the
///   command line wins; otherwise an empty success)
/// - hands out [`FakeProcessHandle`]s for detached spawns.
#[derive(Default)]
pub struct FakeExecutor {
    run_rules: Mutex<Vec<(String, RunReply)>>,
    spawn_rules: Mutex<Vec<(String, SpawnReply)>>,
    runs: Mutex<Vec<CommandSpec>>,
    spawns: Mutex<Vec<(CommandSpec, OutputSink)>>,
    probes: Mutex<Vec<FakeProcessProbe>>,
    fs: Option<MockFileSystem>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detached output is appended into `fs` for `OutputSink::AppendTo`.
    pub fn with_fs(fs: MockFileSystem) -> Self {
        Self {
            fs: Some(fs),
            ..Self::default()
        }
    }

    pub fn on_run(&self, pattern: &str, reply: CommandResult) -> &Self {
        self.on_run_reply(pattern, RunReply::Result(reply))
    }

    pub fn on_run_reply(&self, pattern: &str, reply: RunReply) -> &Self {
        self.run_rules
            .lock()
            .unwrap()
            .push((pattern.to_string(), reply));
        self
    }

    pub fn on_spawn(&self, pattern: &str, reply: SpawnReply) -> &Self {
        self.spawn_rules
            .lock()
            .unwrap()
            .push((pattern.to_string(), reply));
        self
    }

    /// Every `run` spec, in call order.
    pub fn runs(&self) -> Vec<CommandSpec> {
        self.runs.lock().unwrap().clone()
    }

    /// Argument vectors of every `run`, in call order.
    pub fn run_argvs(&self) -> Vec<Vec<String>> {
        self.runs().iter().map(|s| s.argv().to_vec()).collect()
    }

    pub fn spawns(&self) -> Vec<(CommandSpec, OutputSink)> {
        self.spawns.lock().unwrap().clone()
    }

    /// Probes for every handle handed out, in spawn order.
    pub fn probes(&self) -> Vec<FakeProcessProbe> {
        self.probes.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.runs.lock().unwrap().len() + self.spawns.lock().unwrap().len()
    }

    fn find<T: Clone>(rules: &Mutex<Vec<(String, T)>>, line: &str) -> Option<T> {
        rules
            .lock()
            .unwrap()
            .iter()
            .find(|(pattern, _)| line.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone())
    }
}

impl CommandExecutor for FakeExecutor {
    fn run(&self, spec: CommandSpec) -> BoxFuture<'_, Result<CommandResult>> {
        Box::pin(async move {
            let line = spec.argv().join(" ");
            self.runs.lock().unwrap().push(spec);
            match Self::find(&self.run_rules, &line) {
                Some(reply) => reply.into_result(),
                None => Ok(ok_result("")),
            }
        })
    }

    fn spawn_detached(
        &self,
        spec: CommandSpec,
        sink: OutputSink,
    ) -> Result<Box<dyn ProcessHandle>> {
        let line = spec.argv().join(" ");
        let reply = Self::find(&self.spawn_rules, &line).unwrap_or_default();
        self.spawns.lock().unwrap().push((spec.clone(), sink.clone()));

        if let Some(msg) = reply.fail {
            return Err(XcpilotError::System(msg));
        }

        if let (Some(output), OutputSink::AppendTo(path), Some(fs)) =
            (&reply.output, &sink, &self.fs)
        {
            fs.append(path, output.as_bytes())?;
        }

        let handle = FakeProcessHandle::new(spec.label(), reply.exit_mode, reply.terminate_error);
        self.probes.lock().unwrap().push(handle.probe());
        Ok(Box::new(handle))
    }
}

struct ProbeState {
    label: String,
    pid: u32,
    terminate_calls: AtomicUsize,
    kill_calls: AtomicUsize,
    exited: watch::Sender<Option<ExitInfo>>,
}

/// Test-side view of a [`FakeProcessHandle`], usable after the handle has
/// been moved into the code under test.
#[derive(Clone)]
pub struct FakeProcessProbe {
    state: Arc<ProbeState>,
}

impl FakeProcessProbe {
    pub fn label(&self) -> &str {
        &self.state.label
    }

    pub fn pid(&self) -> u32 {
        self.state.pid
    }

    pub fn terminate_calls(&self) -> usize {
        self.state.terminate_calls.load(Ordering::SeqCst)
    }

    pub fn kill_calls(&self) -> usize {
        self.state.kill_calls.load(Ordering::SeqCst)
    }

    pub fn has_exited(&self) -> bool {
        self.state.exited.borrow().is_some()
    }

    /// Make the process exit on its own with `code`.
    pub fn exit(&self, code: i32) {
        self.state.exited.send_replace(Some(ExitInfo {
            code: Some(code),
            signal: None,
        }));
    }
}

/// A process handle that never touches the OS.
pub struct FakeProcessHandle {
    mode: ExitMode,
    terminate_error: Option<String>,
    state: Arc<ProbeState>,
}

impl FakeProcessHandle {
    pub fn new(label: &str, mode: ExitMode, terminate_error: Option<String>) -> Self {
        let (exited, _) = watch::channel(None);
        Self {
            mode,
            terminate_error,
            state: Arc::new(ProbeState {
                label: label.to_string(),
                pid: NEXT_PID.fetch_add(1, Ordering::SeqCst),
                terminate_calls: AtomicUsize::new(0),
                kill_calls: AtomicUsize::new(0),
                exited,
            }),
        }
    }

    pub fn probe(&self) -> FakeProcessProbe {
        FakeProcessProbe {
            state: Arc::clone(&self.state),
        }
    }

    fn exit_with_signal(&self, signal: i32) {
        if self.state.exited.borrow().is_none() {
            self.state.exited.send_replace(Some(ExitInfo {
                code: None,
                signal: Some(signal),
            }));
        }
    }
}

impl ProcessHandle for FakeProcessHandle {
    fn pid(&self) -> Option<u32> {
        Some(self.state.pid)
    }

    fn terminate(&mut self) -> Result<()> {
        self.state.terminate_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = &self.terminate_error {
            return Err(XcpilotError::system(
                format!("sending SIGTERM to '{}'", self.state.label),
                msg,
            ));
        }
        if self.mode == ExitMode::OnTerminate {
            self.exit_with_signal(15);
        }
        Ok(())
    }

    fn kill(&mut self) -> Result<()> {
        self.state.kill_calls.fetch_add(1, Ordering::SeqCst);
        if self.mode != ExitMode::Never {
            self.exit_with_signal(9);
        }
        Ok(())
    }

    fn wait(&mut self) -> BoxFuture<'_, Result<ExitInfo>> {
        let mut rx = self.state.exited.subscribe();
        Box::pin(async move {
            let exited = rx
                .wait_for(Option::is_some)
                .await
                .map(|info| *info)
                .map_err(|_| XcpilotError::System("fake process channel closed".to_string()))?;
            Ok(exited.unwrap_or(ExitInfo {
                code: None,
                signal: None,
            }))
        })
    }
}

/// Convenience: path of the single file a detached spawn appended to.
pub fn sink_path(sink: &OutputSink) -> Option<PathBuf> {
    match sink {
        OutputSink::AppendTo(path) => Some(path.clone()),
        OutputSink::Null => None,
    }
}
