// src/exec/backend.rs

//! Pluggable command executor abstraction.
//!
//! Every component that runs an external tool talks to a
//! `dyn CommandExecutor` instead of `tokio::process` directly. Production code
//! uses [`RealCommandExecutor`]; tests substitute a fake that records the
//! specs it was given and returns scripted results.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::{Result, XcpilotError};
use crate::exec::process::{BoxFuture, LocalProcessHandle, ProcessHandle};
use crate::exec::spec::{CommandResult, CommandSpec, OutputSink};

/// Trait abstracting how external invocations are executed.
pub trait CommandExecutor: Send + Sync {
    /// Run to completion, capturing stdout/stderr in full.
    ///
    /// Returns `Err` only when the process could not be launched at all
    /// (or the spec itself is invalid); a nonzero exit is `Ok` with
    /// `success == false`.
    fn run(&self, spec: CommandSpec) -> BoxFuture<'_, Result<CommandResult>>;

    /// Launch without waiting for completion.
    ///
    /// Returns as soon as the OS has accepted the spawn.
    fn spawn_detached(&self, spec: CommandSpec, sink: OutputSink)
    -> Result<Box<dyn ProcessHandle>>;
}

/// Real executor used in production, backed by `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct RealCommandExecutor;

impl RealCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for RealCommandExecutor {
    fn run(&self, spec: CommandSpec) -> BoxFuture<'_, Result<CommandResult>> {
        Box::pin(async move {
            let mut cmd = build_command(&spec)?;
            cmd.stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            info!(label = %spec.label(), cmd = %spec.command_line(), "starting command");

            let child = cmd.spawn().map_err(|e| launch_error(&spec, e))?;
            let pid = child.id();

            let output = child.wait_with_output().await.map_err(|e| {
                XcpilotError::system(format!("waiting for '{}'", spec.label()), e)
            })?;

            let result = CommandResult::new(
                output.status.success(),
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr),
                output.status.code(),
                pid,
            );

            if result.success {
                info!(label = %spec.label(), pid, "command finished");
            } else {
                warn!(
                    label = %spec.label(),
                    pid,
                    exit_code = ?result.exit_code,
                    "command failed"
                );
            }

            Ok(result)
        })
    }

    fn spawn_detached(
        &self,
        spec: CommandSpec,
        sink: OutputSink,
    ) -> Result<Box<dyn ProcessHandle>> {
        let mut cmd = build_command(&spec)?;
        cmd.stdin(Stdio::null()).kill_on_drop(true);

        match &sink {
            OutputSink::Null => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
            }
            OutputSink::AppendTo(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| XcpilotError::system(format!("opening {path:?}"), e))?;
                let err_file = file
                    .try_clone()
                    .map_err(|e| XcpilotError::system(format!("duplicating {path:?}"), e))?;
                cmd.stdout(Stdio::from(file)).stderr(Stdio::from(err_file));
            }
        }

        let child = cmd.spawn().map_err(|e| launch_error(&spec, e))?;
        info!(
            label = %spec.label(),
            pid = ?child.id(),
            cmd = %spec.command_line(),
            "spawned detached process"
        );

        Ok(Box::new(LocalProcessHandle::new(child, spec.label())))
    }
}

fn build_command(spec: &CommandSpec) -> Result<Command> {
    let program = spec.program().ok_or_else(|| {
        XcpilotError::validation(format!("command '{}' has an empty argument vector", spec.label()))
    })?;

    let mut cmd = if spec.is_shell() {
        let mut c = Command::new("sh");
        c.arg("-c").arg(spec.command_line());
        c
    } else {
        let mut c = Command::new(program);
        c.args(spec.args());
        c
    };

    cmd.envs(spec.envs());
    if let Some(dir) = spec.cwd() {
        debug!(label = %spec.label(), cwd = ?dir, "setting working directory");
        cmd.current_dir(dir);
    }

    Ok(cmd)
}

/// Map a failure to even start the process into the error taxonomy.
fn launch_error(spec: &CommandSpec, err: std::io::Error) -> XcpilotError {
    let program = if spec.is_shell() {
        "sh"
    } else {
        spec.program().unwrap_or_default()
    };

    match err.kind() {
        ErrorKind::NotFound => XcpilotError::dependency(
            program,
            format!("'{program}' could not be found. Install it or set its path in the [tools] section of the config."),
        ),
        _ => XcpilotError::system(format!("failed to launch '{program}'"), err),
    }
}
