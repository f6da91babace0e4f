// src/build/composer.rs

//! Turns a [`BuildIntent`] into a build-tool invocation and runs it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::build::classify::{classify_failure, FailureReport};
use crate::build::destination::destination_for;
use crate::build::incremental::{IncrementalBackend, MakefileBackend};
use crate::build::intent::{BuildIntent, ProjectRef};
use crate::config::ConfigFile;
use crate::errors::Result;
use crate::exec::{CommandExecutor, CommandResult, CommandSpec};
use crate::fs::FileSystem;
use crate::parse::{self, TestSummary};
use crate::types::{BackendPreference, BuildAction};

const RESULT_BUNDLE_NAME: &str = "TestResults.xcresult";

/// Which backend produced a [`BuildOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendUsed {
    Conventional,
    Incremental,
}

/// Result of one build-tool action.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub action: BuildAction,
    pub backend: BackendUsed,
    pub result: CommandResult,
    /// Present exactly when `result.success` is false.
    pub failure: Option<FailureReport>,
    /// Only for `test`, and only when the result bundle could be read.
    pub test_summary: Option<TestSummary>,
}

impl BuildOutcome {
    fn new(action: BuildAction, backend: BackendUsed, result: CommandResult) -> Self {
        let failure = classify_failure(&result);
        Self {
            action,
            backend,
            result,
            failure,
            test_summary: None,
        }
    }

    pub fn success(&self) -> bool {
        self.result.success
    }
}

/// Argument vector for one action, in the fixed order the build tool expects.
///
/// `program` is normally `xcodebuild`; the incremental backend passes its own
/// wrapper binary with the same arguments.
pub fn compose_argv(
    program: &str,
    intent: &BuildIntent,
    action: BuildAction,
    default_configuration: &str,
    result_bundle: Option<&Path>,
) -> Vec<String> {
    let configuration = intent
        .configuration
        .as_deref()
        .unwrap_or(default_configuration);

    let mut argv = vec![
        program.to_string(),
        intent.project.flag().to_string(),
        intent.project.path().display().to_string(),
        "-scheme".to_string(),
        intent.scheme.clone(),
        "-configuration".to_string(),
        configuration.to_string(),
        "-destination".to_string(),
        destination_for(intent),
    ];

    if let Some(derived) = &intent.derived_data_path {
        argv.push("-derivedDataPath".to_string());
        argv.push(derived.display().to_string());
    }

    if !intent.archs.is_empty() {
        argv.push(format!("ARCHS={}", intent.archs.join(" ")));
        argv.push("ONLY_ACTIVE_ARCH=NO".to_string());
    }

    if let Some(bundle) = result_bundle {
        argv.push("-resultBundlePath".to_string());
        argv.push(bundle.display().to_string());
    }

    argv.extend(intent.extra_args.iter().cloned());
    argv.push(action.as_arg().to_string());
    argv
}

/// Composes and runs build-tool invocations.
pub struct BuildComposer {
    executor: Arc<dyn CommandExecutor>,
    fs: Arc<dyn FileSystem>,
    xcodebuild: String,
    xcrun: String,
    default_configuration: String,
    scratch_dir: PathBuf,
    incremental: Option<Arc<dyn IncrementalBackend>>,
}

impl BuildComposer {
    /// Composer with no incremental backend, scratch space in the OS temp dir.
    pub fn new(
        executor: Arc<dyn CommandExecutor>,
        fs: Arc<dyn FileSystem>,
        xcodebuild: impl Into<String>,
        xcrun: impl Into<String>,
        default_configuration: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            fs,
            xcodebuild: xcodebuild.into(),
            xcrun: xcrun.into(),
            default_configuration: default_configuration.into(),
            scratch_dir: std::env::temp_dir(),
            incremental: None,
        }
    }

    /// Production wiring: tool paths from `[tools]`, `make`/`xcodemake`
    /// as the incremental backend.
    pub fn from_config(
        executor: Arc<dyn CommandExecutor>,
        fs: Arc<dyn FileSystem>,
        cfg: &ConfigFile,
    ) -> Self {
        let backend = MakefileBackend::new(
            executor.clone(),
            fs.clone(),
            cfg.tools.xcodemake.clone(),
            cfg.tools.make.clone(),
            cfg.build.default_configuration.clone(),
        );
        Self::new(
            executor,
            fs,
            cfg.tools.xcodebuild.clone(),
            cfg.tools.xcrun.clone(),
            cfg.build.default_configuration.clone(),
        )
        .with_incremental(Arc::new(backend))
    }

    pub fn with_incremental(mut self, backend: Arc<dyn IncrementalBackend>) -> Self {
        self.incremental = Some(backend);
        self
    }

    /// Where temporary result-bundle directories are created.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn argv(
        &self,
        intent: &BuildIntent,
        action: BuildAction,
        result_bundle: Option<&Path>,
    ) -> Vec<String> {
        compose_argv(
            &self.xcodebuild,
            intent,
            action,
            &self.default_configuration,
            result_bundle,
        )
    }

    pub async fn build(&self, intent: &BuildIntent) -> Result<BuildOutcome> {
        intent.validate()?;
        self.execute(intent, BuildAction::Build).await
    }

    pub async fn clean(&self, intent: &BuildIntent) -> Result<BuildOutcome> {
        intent.validate()?;
        self.execute(intent, BuildAction::Clean).await
    }

    /// Run tests, then read the structured result bundle.
    ///
    /// The bundle phase only ever adds a summary; pass/fail comes from the
    /// test run itself. The temporary directory is removed in every case.
    pub async fn test(&self, intent: &BuildIntent) -> Result<BuildOutcome> {
        intent.validate()?;

        let tmp = self
            .scratch_dir
            .join(format!("xcpilot-test-{}", Uuid::new_v4()));
        self.fs.create_dir_all(&tmp)?;
        let bundle = tmp.join(RESULT_BUNDLE_NAME);

        let argv = self.argv(intent, BuildAction::Test, Some(&bundle));
        let run = self
            .executor
            .run(CommandSpec::new("xcodebuild test", argv))
            .await;

        let result = match run {
            Ok(result) => result,
            Err(err) => {
                self.remove_scratch(&tmp);
                return Err(err);
            }
        };

        let mut outcome = BuildOutcome::new(BuildAction::Test, BackendUsed::Conventional, result);
        outcome.test_summary = self.read_summary(&bundle).await;
        self.remove_scratch(&tmp);

        Ok(outcome)
    }

    /// Scheme names declared by a project or workspace.
    pub async fn list_schemes(&self, project: &ProjectRef) -> Result<Vec<String>> {
        let argv = vec![
            self.xcodebuild.clone(),
            "-list".to_string(),
            project.flag().to_string(),
            project.path().display().to_string(),
        ];
        let result = self
            .executor
            .run(CommandSpec::new("xcodebuild -list", argv))
            .await?;
        match classify_failure(&result) {
            Some(failure) => Err(failure.into_error()),
            None => Ok(parse::parse_schemes(&result.stdout)),
        }
    }

    /// Raw `-showBuildSettings` output.
    pub async fn show_build_settings(&self, intent: &BuildIntent) -> Result<String> {
        intent.validate()?;
        let outcome = self
            .run_conventional(intent, BuildAction::ShowBuildSettings)
            .await?;
        match outcome.failure {
            Some(failure) => Err(failure.into_error()),
            None => Ok(outcome.result.stdout),
        }
    }

    /// Path of the built product, derived from the build settings.
    pub async fn app_path(&self, intent: &BuildIntent) -> Result<PathBuf> {
        let settings = self.show_build_settings(intent).await?;
        parse::app_path(&settings)
    }

    async fn execute(&self, intent: &BuildIntent, action: BuildAction) -> Result<BuildOutcome> {
        if intent.backend == BackendPreference::Incremental {
            if let Some(outcome) = self.try_incremental(intent, action).await {
                return Ok(outcome);
            }
        }
        self.run_conventional(intent, action).await
    }

    /// `None` means "fall back to the conventional tool".
    async fn try_incremental(
        &self,
        intent: &BuildIntent,
        action: BuildAction,
    ) -> Option<BuildOutcome> {
        let backend = self.incremental.as_ref()?;
        if !backend.supports(action, intent.platform) {
            debug!(
                backend = %backend.name(),
                %action,
                platform = %intent.platform,
                "incremental backend does not support request"
            );
            return None;
        }

        match backend.run(intent, action).await {
            Ok(result) if result.success => Some(BuildOutcome::new(
                action,
                BackendUsed::Incremental,
                result,
            )),
            Ok(result) => {
                warn!(
                    backend = %backend.name(),
                    exit_code = ?result.exit_code,
                    "incremental build failed, falling back to xcodebuild"
                );
                None
            }
            Err(err) => {
                warn!(
                    backend = %backend.name(),
                    error = %err,
                    "incremental backend could not run, falling back to xcodebuild"
                );
                None
            }
        }
    }

    async fn run_conventional(
        &self,
        intent: &BuildIntent,
        action: BuildAction,
    ) -> Result<BuildOutcome> {
        let argv = self.argv(intent, action, None);
        let label = format!("xcodebuild {action}");
        info!(label = %label, scheme = %intent.scheme, "running build tool");
        let result = self.executor.run(CommandSpec::new(label, argv)).await?;
        Ok(BuildOutcome::new(action, BackendUsed::Conventional, result))
    }

    async fn read_summary(&self, bundle: &Path) -> Option<TestSummary> {
        if !self.fs.exists(bundle) {
            warn!(bundle = ?bundle, "test result bundle was not produced");
            return None;
        }

        let argv = vec![
            self.xcrun.clone(),
            "xcresulttool".to_string(),
            "get".to_string(),
            "test-results".to_string(),
            "summary".to_string(),
            "--path".to_string(),
            bundle.display().to_string(),
        ];
        let result = match self
            .executor
            .run(CommandSpec::new("xcresulttool summary", argv))
            .await
        {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "could not run xcresulttool");
                return None;
            }
        };

        if !result.success {
            warn!(exit_code = ?result.exit_code, "xcresulttool failed");
            return None;
        }

        match parse::parse_test_summary(&result.stdout) {
            Ok(summary) => Some(summary),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable test summary");
                None
            }
        }
    }

    fn remove_scratch(&self, dir: &Path) {
        if let Err(err) = self.fs.remove_dir_all(dir) {
            warn!(dir = ?dir, error = %err, "failed to remove temporary directory");
        }
    }
}
