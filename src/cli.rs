// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::build::{BuildIntent, ProjectRef, Selector};
use crate::errors::Result;
use crate::tools::{HardwareButton, SwiftConfiguration, SwiftPackageRequest, UiAction};
use crate::types::{BackendPreference, Platform};

/// Command-line arguments for `xcpilot`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "xcpilot",
    version,
    about = "Drive xcodebuild, simctl, devicectl, swift and axe from one place.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Xcpilot.toml` in the current working directory, if present.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `XCPILOT_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the response as JSON instead of plain text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Build a scheme.
    Build(BuildArgs),
    /// Run a scheme's tests and summarise the result bundle.
    Test(BuildArgs),
    /// Clean a scheme's build products.
    Clean(BuildArgs),
    /// List the schemes of a project or workspace.
    Schemes(ProjectArgs),
    /// Print `-showBuildSettings` output.
    Settings(BuildArgs),
    /// Print the path of the built product.
    AppPath(BuildArgs),
    /// List available simulators.
    Sims,
    /// Save a simulator screenshot.
    Screenshot {
        #[arg(long)]
        simulator_id: String,
        #[arg(long, value_name = "PATH")]
        output: PathBuf,
    },
    /// Capture simulator logs until Ctrl-C or `--duration` elapses.
    Logs(LogsArgs),
    /// Run a Swift package executable until Ctrl-C or `--duration` elapses.
    SwiftRun(SwiftRunArgs),
    /// Drive the simulator UI.
    Ui {
        #[arg(long)]
        simulator_id: String,
        #[command(subcommand)]
        action: UiCommand,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ProjectArgs {
    /// Path to an `.xcodeproj`.
    #[arg(long, value_name = "PATH")]
    pub project: Option<PathBuf>,

    /// Path to an `.xcworkspace`.
    #[arg(long, value_name = "PATH")]
    pub workspace: Option<PathBuf>,
}

impl ProjectArgs {
    pub fn into_project_ref(self) -> Result<ProjectRef> {
        ProjectRef::from_paths(self.project, self.workspace)
    }
}

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[arg(long)]
    pub scheme: String,

    /// Defaults to `[build].default_configuration`.
    #[arg(long)]
    pub configuration: Option<String>,

    #[arg(long, default_value = "iOS Simulator")]
    pub platform: Platform,

    #[arg(long, value_name = "UDID")]
    pub simulator_id: Option<String>,

    #[arg(long, value_name = "NAME")]
    pub simulator_name: Option<String>,

    #[arg(long, value_name = "UDID")]
    pub device_id: Option<String>,

    /// Add `OS=latest` to a name-based simulator destination.
    #[arg(long)]
    pub use_latest_os: bool,

    #[arg(long = "arch", value_name = "ARCH")]
    pub archs: Vec<String>,

    #[arg(long, value_name = "PATH")]
    pub derived_data_path: Option<PathBuf>,

    /// Try `xcodemake` first, falling back to `xcodebuild`.
    #[arg(long)]
    pub incremental: bool,

    /// Extra arguments passed to the build tool verbatim.
    #[arg(last = true)]
    pub extra: Vec<String>,
}

impl BuildArgs {
    pub fn into_intent(self, default_backend: BackendPreference) -> Result<BuildIntent> {
        let project = self.project.into_project_ref()?;
        let selector = Selector::from_parts(
            self.device_id,
            self.simulator_id,
            self.simulator_name,
            self.use_latest_os,
        )?;

        let mut intent = BuildIntent::new(project, self.scheme, self.platform)
            .with_extra_args(self.extra)
            .with_backend(if self.incremental {
                BackendPreference::Incremental
            } else {
                default_backend
            });
        intent.configuration = self.configuration;
        intent.selector = selector;
        intent.archs = self.archs;
        intent.derived_data_path = self.derived_data_path;
        Ok(intent)
    }
}

#[derive(Debug, Clone, Args)]
pub struct LogsArgs {
    #[arg(long)]
    pub simulator_id: String,

    #[arg(long)]
    pub bundle_id: String,

    /// Also relaunch the app and capture its console output.
    #[arg(long)]
    pub console: bool,

    /// `app` (default), `all` or `swiftui`.
    #[arg(long)]
    pub filter: Option<String>,

    /// Extra subsystems to include alongside the app's own.
    #[arg(long = "subsystem", value_name = "SUBSYSTEM")]
    pub subsystems: Vec<String>,

    /// Stop after this many seconds instead of waiting for Ctrl-C.
    #[arg(long, value_name = "SECS")]
    pub duration: Option<u64>,
}

#[derive(Debug, Clone, Args)]
pub struct SwiftRunArgs {
    #[arg(long, value_name = "PATH")]
    pub package_path: PathBuf,

    #[arg(long)]
    pub executable: Option<String>,

    #[arg(long)]
    pub release: bool,

    /// Append the program's output to this file.
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    #[arg(long, value_name = "SECS")]
    pub duration: Option<u64>,

    /// Arguments passed to the executable.
    #[arg(last = true)]
    pub args: Vec<String>,
}

impl SwiftRunArgs {
    pub fn request(&self) -> SwiftPackageRequest {
        let mut req = SwiftPackageRequest::new(self.package_path.clone());
        if self.release {
            req.configuration = SwiftConfiguration::Release;
        }
        req
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum UiCommand {
    Tap {
        #[arg(short)]
        x: i32,
        #[arg(short)]
        y: i32,
    },
    Swipe {
        #[arg(long)]
        start_x: i32,
        #[arg(long)]
        start_y: i32,
        #[arg(long)]
        end_x: i32,
        #[arg(long)]
        end_y: i32,
        /// Seconds.
        #[arg(long)]
        duration: Option<f64>,
    },
    Button {
        /// apple-pay, home, lock, side-button or siri.
        name: HardwareButton,
    },
    Key {
        keycode: u8,
    },
    KeySequence {
        #[arg(long, value_delimiter = ',')]
        keycodes: Vec<u8>,
    },
    Type {
        text: String,
    },
}

impl From<UiCommand> for UiAction {
    fn from(cmd: UiCommand) -> Self {
        match cmd {
            UiCommand::Tap { x, y } => UiAction::Tap { x, y },
            UiCommand::Swipe {
                start_x,
                start_y,
                end_x,
                end_y,
                duration,
            } => UiAction::Swipe {
                from: (start_x, start_y),
                to: (end_x, end_y),
                duration,
            },
            UiCommand::Button { name } => UiAction::Button(name),
            UiCommand::Key { keycode } => UiAction::Key(keycode),
            UiCommand::KeySequence { keycodes } => UiAction::KeySequence(keycodes),
            UiCommand::Type { text } => UiAction::Type(text),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
