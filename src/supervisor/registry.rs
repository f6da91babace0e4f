// src/supervisor/registry.rs

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::errors::{Result, XcpilotError};
use crate::exec::ProcessHandle;

/// Handle shared between the registry and whoever is currently stopping it.
pub type SharedHandle = Arc<tokio::sync::Mutex<Box<dyn ProcessHandle>>>;

/// One tracked long-running process.
#[derive(Clone)]
pub struct ManagedProcess {
    pub id: String,
    pub handle: SharedHandle,
    pub started_at: DateTime<Utc>,
    pub description: String,
}

impl std::fmt::Debug for ManagedProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedProcess")
            .field("id", &self.id)
            .field("started_at", &self.started_at)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Read-only view of a [`ManagedProcess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSummary {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub description: String,
}

/// Map from identifier to tracked process.
///
/// The lock is only ever held for a single map operation.
#[derive(Default)]
pub struct ProcessRegistry {
    entries: Mutex<BTreeMap<String, ManagedProcess>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, ManagedProcess>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rejects an identifier that is already registered.
    pub fn insert(&self, process: ManagedProcess) -> Result<()> {
        let mut entries = self.lock();
        if entries.contains_key(&process.id) {
            return Err(XcpilotError::validation(format!(
                "a process with id '{}' is already registered",
                process.id
            )));
        }
        entries.insert(process.id.clone(), process);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<ManagedProcess> {
        self.lock().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<ManagedProcess> {
        self.lock().remove(id)
    }

    /// Whether `id` still maps to this exact handle.
    pub fn holds(&self, id: &str, handle: &SharedHandle) -> bool {
        self.lock()
            .get(id)
            .is_some_and(|p| Arc::ptr_eq(&p.handle, handle))
    }

    /// Remove `id` only if it still maps to `handle`. A different process
    /// registered under the same id is left alone.
    pub fn remove_if_same(&self, id: &str, handle: &SharedHandle) -> Option<ManagedProcess> {
        let mut entries = self.lock();
        if entries
            .get(id)
            .is_some_and(|p| Arc::ptr_eq(&p.handle, handle))
        {
            entries.remove(id)
        } else {
            None
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshots ordered by id.
    pub fn summaries(&self) -> Vec<ProcessSummary> {
        self.lock()
            .values()
            .map(|p| ProcessSummary {
                id: p.id.clone(),
                started_at: p.started_at,
                description: p.description.clone(),
            })
            .collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }
}
