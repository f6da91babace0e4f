// src/exec/process.rs

//! Control handles for detached (long-running) processes.

use std::future::Future;
use std::pin::Pin;

use tokio::process::Child;
use tracing::debug;

use crate::errors::{Result, XcpilotError};

/// Boxed, sendable future used at the trait seams of this crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitInfo {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl ExitInfo {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Trait abstracting control over one spawned process.
///
/// Production code uses [`LocalProcessHandle`]; tests provide handles that
/// never touch the OS.
pub trait ProcessHandle: Send {
    /// OS process id, if the process has not been reaped yet.
    fn pid(&self) -> Option<u32>;

    /// Request a graceful shutdown (SIGTERM).
    fn terminate(&mut self) -> Result<()>;

    /// Forcefully stop the process (SIGKILL).
    fn kill(&mut self) -> Result<()>;

    /// Resolve once the process has exited.
    fn wait(&mut self) -> BoxFuture<'_, Result<ExitInfo>>;
}

/// Handle over a real child process spawned by
/// [`RealCommandExecutor`](crate::exec::RealCommandExecutor).
pub struct LocalProcessHandle {
    child: Child,
    label: String,
}

impl LocalProcessHandle {
    pub fn new(child: Child, label: impl Into<String>) -> Self {
        Self {
            child,
            label: label.into(),
        }
    }

    fn signal(&self, signal: nix::sys::signal::Signal) -> Result<()> {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        let pid = self.child.id().ok_or_else(|| {
            XcpilotError::System(format!(
                "cannot send {signal} to '{}': process already exited",
                self.label
            ))
        })?;

        debug!(label = %self.label, pid, %signal, "sending signal");
        kill(Pid::from_raw(pid as i32), signal).map_err(|errno| {
            XcpilotError::system(
                format!("sending {signal} to '{}' (pid {pid})", self.label),
                errno.desc(),
            )
        })
    }
}

impl ProcessHandle for LocalProcessHandle {
    fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    fn terminate(&mut self) -> Result<()> {
        self.signal(nix::sys::signal::Signal::SIGTERM)
    }

    fn kill(&mut self) -> Result<()> {
        self.signal(nix::sys::signal::Signal::SIGKILL)
    }

    fn wait(&mut self) -> BoxFuture<'_, Result<ExitInfo>> {
        Box::pin(async move {
            let status = self.child.wait().await.map_err(|e| {
                XcpilotError::system(format!("waiting for '{}'", self.label), e)
            })?;

            #[cfg(unix)]
            let signal = {
                use std::os::unix::process::ExitStatusExt;
                status.signal()
            };
            #[cfg(not(unix))]
            let signal = None;

            Ok(ExitInfo {
                code: status.code(),
                signal,
            })
        })
    }
}
