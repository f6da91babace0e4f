// src/supervisor/mod.rs

//! Tracking and stopping of arbitrary long-running processes.
//!
//! Independent of any build logic: callers spawn a process however they like
//! and hand its [`ProcessHandle`] to [`ProcessSupervisor::register`].

pub mod escalation;
pub mod registry;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::errors::{Result, XcpilotError};
use crate::exec::ProcessHandle;

pub use escalation::{escalate, TerminationKind};
pub use registry::{ManagedProcess, ProcessRegistry, ProcessSummary, SharedHandle};

/// Grace period used when none is configured.
pub const DEFAULT_GRACE: Duration = Duration::from_millis(3000);

/// What a successful stop reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopReport {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub description: String,
    pub termination: TerminationKind,
}

pub struct ProcessSupervisor {
    registry: ProcessRegistry,
    grace: Duration,
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE)
    }
}

impl ProcessSupervisor {
    pub fn new(grace: Duration) -> Self {
        Self {
            registry: ProcessRegistry::new(),
            grace,
        }
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    pub fn register(
        &self,
        id: impl Into<String>,
        handle: Box<dyn ProcessHandle>,
        started_at: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Result<()> {
        let process = ManagedProcess {
            id: id.into(),
            handle: Arc::new(tokio::sync::Mutex::new(handle)),
            started_at,
            description: description.into(),
        };
        let id = process.id.clone();
        self.registry.insert(process)?;
        info!(process = %id, "registered process");
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<ManagedProcess> {
        self.registry.get(id)
    }

    pub fn remove(&self, id: &str) -> Option<ManagedProcess> {
        self.registry.remove(id)
    }

    /// Snapshots of every tracked process, ordered by id.
    pub fn list(&self) -> Vec<ProcessSummary> {
        self.registry.summaries()
    }

    /// Stop with the configured grace period.
    pub async fn stop(&self, id: &str) -> Result<StopReport> {
        self.stop_with_grace(id, self.grace).await
    }

    /// Terminate, escalate after `grace`, and drop the entry.
    ///
    /// The entry is removed whatever the outcome, including when the
    /// termination signal itself could not be delivered. Of two concurrent
    /// stops on one id, only the first gets a report; the other sees
    /// `NotFound`.
    pub async fn stop_with_grace(&self, id: &str, grace: Duration) -> Result<StopReport> {
        let not_found = || XcpilotError::NotFound(format!("no process with id '{id}'"));
        let process = self.registry.get(id).ok_or_else(not_found)?;

        let outcome = {
            let mut handle = process.handle.lock().await;
            if !self.registry.holds(id, &process.handle) {
                return Err(not_found());
            }
            let outcome = escalate(&mut **handle, grace).await;
            self.registry.remove_if_same(id, &process.handle);
            outcome
        };

        match outcome {
            Ok(termination) => {
                info!(process = %id, ?termination, "process stopped");
                Ok(StopReport {
                    id: process.id,
                    started_at: process.started_at,
                    description: process.description,
                    termination,
                })
            }
            Err(err) => {
                warn!(process = %id, error = %err, "process stop failed; entry removed");
                Err(err)
            }
        }
    }

    /// Stop everything that is currently tracked.
    pub async fn stop_all(&self) -> Vec<(String, Result<StopReport>)> {
        let mut results = Vec::new();
        for id in self.registry.ids() {
            let res = self.stop(&id).await;
            results.push((id, res));
        }
        results
    }
}
