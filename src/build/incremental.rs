// src/build/incremental.rs

//! Fast incremental build backend.
//!
//! `xcodemake` records an xcodebuild run into a Makefile next to the project;
//! later builds can replay it with plain `make`, which skips the build
//! system's planning phase.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::build::composer::compose_argv;
use crate::build::intent::BuildIntent;
use crate::errors::Result;
use crate::exec::{find_binary, BoxFuture, CommandExecutor, CommandResult, CommandSpec};
use crate::fs::FileSystem;
use crate::types::{BuildAction, Platform};

/// An alternative build backend tried before the conventional one.
pub trait IncrementalBackend: Send + Sync {
    /// Short name for logs and outcomes.
    fn name(&self) -> &str;

    /// Whether this backend can handle the combination at all right now.
    fn supports(&self, action: BuildAction, platform: Platform) -> bool;

    fn run<'a>(
        &'a self,
        intent: &'a BuildIntent,
        action: BuildAction,
    ) -> BoxFuture<'a, Result<CommandResult>>;
}

/// `make` / `xcodemake` backend. Handles `build` only.
pub struct MakefileBackend {
    executor: Arc<dyn CommandExecutor>,
    fs: Arc<dyn FileSystem>,
    xcodemake: String,
    make: String,
    default_configuration: String,
}

impl MakefileBackend {
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        fs: Arc<dyn FileSystem>,
        xcodemake: impl Into<String>,
        make: impl Into<String>,
        default_configuration: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            fs,
            xcodemake: xcodemake.into(),
            make: make.into(),
            default_configuration: default_configuration.into(),
        }
    }

    /// Directory that holds the project or workspace (and any generated Makefile).
    fn project_dir(intent: &BuildIntent) -> PathBuf {
        match intent.project.path().parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn spec_for(&self, intent: &BuildIntent, action: BuildAction) -> CommandSpec {
        let dir = Self::project_dir(intent);
        let makefile = dir.join("Makefile");

        if self.fs.exists(&makefile) {
            debug!(makefile = ?makefile, "reusing existing Makefile");
            CommandSpec::new("make", [self.make.clone()]).current_dir(dir)
        } else {
            let argv = compose_argv(
                &self.xcodemake,
                intent,
                action,
                &self.default_configuration,
                None,
            );
            CommandSpec::new("xcodemake", argv).current_dir(dir)
        }
    }
}

impl IncrementalBackend for MakefileBackend {
    fn name(&self) -> &str {
        "xcodemake"
    }

    fn supports(&self, action: BuildAction, _platform: Platform) -> bool {
        if action != BuildAction::Build {
            return false;
        }
        let available = find_binary(&self.xcodemake).is_some();
        if !available {
            debug!(tool = %self.xcodemake, "incremental backend unavailable");
        }
        available
    }

    fn run<'a>(
        &'a self,
        intent: &'a BuildIntent,
        action: BuildAction,
    ) -> BoxFuture<'a, Result<CommandResult>> {
        Box::pin(async move {
            let spec = self.spec_for(intent, action);
            info!(label = %spec.label(), scheme = %intent.scheme, "running incremental build");
            self.executor.run(spec).await
        })
    }
}
