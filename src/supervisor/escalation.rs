// src/supervisor/escalation.rs

//! Graceful-then-forceful process termination.

use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::Result;
use crate::exec::ProcessHandle;

/// Upper bound on waiting for a process to be reaped after SIGKILL.
const KILL_REAP_TIMEOUT: Duration = Duration::from_secs(2);

/// How a process went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationKind {
    /// Exited within the grace period after SIGTERM.
    Graceful,
    /// Needed SIGKILL.
    Forced,
}

/// Send SIGTERM, wait up to `grace` for the process to exit, then SIGKILL.
///
/// SIGKILL is sent at most once and only when the grace timer fired first.
/// A failure to deliver SIGTERM is returned as-is (nothing else is tried);
/// callers are expected to clean up their bookkeeping regardless.
pub async fn escalate(handle: &mut dyn ProcessHandle, grace: Duration) -> Result<TerminationKind> {
    let pid = handle.pid();
    handle.terminate()?;

    let exited = tokio::select! {
        res = handle.wait() => Some(res),
        _ = tokio::time::sleep(grace) => None,
    };

    match exited {
        Some(res) => {
            let info = res?;
            debug!(?pid, code = ?info.code, signal = ?info.signal, "process exited after SIGTERM");
            Ok(TerminationKind::Graceful)
        }
        None => {
            warn!(?pid, grace_ms = grace.as_millis() as u64, "grace period elapsed, sending SIGKILL");
            handle.kill()?;
            match tokio::time::timeout(KILL_REAP_TIMEOUT, handle.wait()).await {
                Ok(Ok(_)) => debug!(?pid, "process reaped after SIGKILL"),
                Ok(Err(err)) => warn!(?pid, error = %err, "waiting after SIGKILL failed"),
                Err(_) => warn!(?pid, "process still not reaped after SIGKILL"),
            }
            Ok(TerminationKind::Forced)
        }
    }
}
