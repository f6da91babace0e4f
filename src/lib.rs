// src/lib.rs

pub mod app;
pub mod build;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logcap;
pub mod logging;
pub mod parse;
pub mod response;
pub mod supervisor;
pub mod tools;
pub mod types;

use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use crate::app::Toolbox;
use crate::cli::{CliArgs, Command};
use crate::config::load_or_default;
use crate::logcap::SubsystemFilter;
use crate::response::ToolResponse;

/// High-level entry point used by `main.rs`.
///
/// Loads the config, wires a [`Toolbox`] with real backends, runs one
/// command and returns its response. Anything still running (log sessions,
/// supervised processes) is stopped before returning.
pub async fn run(args: CliArgs) -> Result<ToolResponse> {
    let cfg = load_or_default(args.config.as_deref())?;
    let default_backend = cfg.backend_preference();
    let toolbox = Toolbox::with_real_backends(cfg);

    let response = match args.command {
        Command::Build(b) => match b.into_intent(default_backend) {
            Ok(intent) => toolbox.build(&intent).await,
            Err(err) => err.into(),
        },
        Command::Test(b) => match b.into_intent(default_backend) {
            Ok(intent) => toolbox.test(&intent).await,
            Err(err) => err.into(),
        },
        Command::Clean(b) => match b.into_intent(default_backend) {
            Ok(intent) => toolbox.clean(&intent).await,
            Err(err) => err.into(),
        },
        Command::Settings(b) => match b.into_intent(default_backend) {
            Ok(intent) => toolbox.show_build_settings(&intent).await,
            Err(err) => err.into(),
        },
        Command::AppPath(b) => match b.into_intent(default_backend) {
            Ok(intent) => toolbox.app_path(&intent).await,
            Err(err) => err.into(),
        },
        Command::Schemes(p) => match p.into_project_ref() {
            Ok(project) => toolbox.list_schemes(&project).await,
            Err(err) => err.into(),
        },
        Command::Sims => toolbox.list_simulators().await,
        Command::Screenshot {
            simulator_id,
            output,
        } => toolbox.screenshot(&simulator_id, &output).await,
        Command::Logs(l) => {
            let filter = match SubsystemFilter::resolve(l.filter.as_deref(), &l.subsystems) {
                Ok(filter) => filter,
                Err(err) => return Ok(err.into()),
            };
            let engine = toolbox.log_capture();
            match engine
                .start_capture(&l.simulator_id, &l.bundle_id, l.console, filter)
                .await
            {
                Ok(started) => {
                    info!(
                        session = %started.session_id,
                        log_file = ?started.log_file_path,
                        "capturing logs; press Ctrl-C to stop"
                    );
                    wait_for_stop(l.duration).await;
                    ToolResponse::from_result(engine.stop_capture(&started.session_id).await)
                }
                Err(err) => err.into(),
            }
        }
        Command::SwiftRun(s) => {
            let req = s.request();
            match toolbox.start_package(&req, s.executable.as_deref(), &s.args, s.log.clone()) {
                Ok(running) => {
                    info!(process = %running.id, pid = ?running.pid, "running; press Ctrl-C to stop");
                    wait_for_stop(s.duration).await;
                    toolbox.stop_process(&running.id).await
                }
                Err(err) => err.into(),
            }
        }
        Command::Ui {
            simulator_id,
            action,
        } => toolbox.ui(&simulator_id, &action.into()).await,
    };

    toolbox.shutdown().await;
    Ok(response)
}

async fn wait_for_stop(duration_secs: Option<u64>) {
    wait_until_stopped(
        duration_secs.map(Duration::from_secs),
        tokio::signal::ctrl_c(),
    )
    .await;
}

/// Resolve when `signal` fires, or after `duration` when given.
///
/// A signal that fails to install counts as a stop request so the caller
/// still tears down what it started.
pub async fn wait_until_stopped<F>(duration: Option<Duration>, signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    let res = match duration {
        Some(duration) => {
            tokio::select! {
                _ = tokio::time::sleep(duration) => Ok(()),
                res = signal => res,
            }
        }
        None => signal.await,
    };
    if let Err(err) = res {
        warn!(error = %err, "failed to listen for Ctrl-C; stopping now");
    }
}
