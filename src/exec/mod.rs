// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running external tools, using
//! `tokio::process::Command`, and normalizing what comes back.
//!
//! - [`spec`] describes one invocation (`CommandSpec`) and its result
//!   (`CommandResult`).
//! - [`backend`] provides the `CommandExecutor` trait and the concrete
//!   `RealCommandExecutor` used in production, which tests replace with a fake.
//! - [`process`] holds the `ProcessHandle` trait for detached processes.
//! - [`which`] checks that a binary exists before we try to run it.

pub mod backend;
pub mod process;
pub mod spec;
pub mod which;

pub use backend::{CommandExecutor, RealCommandExecutor};
pub use process::{BoxFuture, ExitInfo, LocalProcessHandle, ProcessHandle};
pub use spec::{CommandResult, CommandSpec, OutputSink};
pub use which::{ensure_binary, find_binary};
