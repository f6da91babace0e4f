// src/exec/which.rs

//! Dependency probes for external binaries.
//!
//! These run before anything is spawned so that a missing tool short-circuits
//! with a fixed remediation message instead of a launch failure.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{Result, XcpilotError};

/// Resolve `name` to an executable path.
///
/// A name containing a path separator is checked as-is; a bare name is
/// searched on `PATH`.
pub fn find_binary(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths)
            .map(|dir| dir.join(name))
            .find(|path| path.is_file())
    })
}

/// Like [`find_binary`], but a miss becomes a dependency error.
pub fn ensure_binary(name: &str, remediation: &str) -> Result<PathBuf> {
    match find_binary(name) {
        Some(path) => {
            debug!(tool = %name, path = ?path, "resolved binary");
            Ok(path)
        }
        None => Err(XcpilotError::dependency(name, remediation)),
    }
}
