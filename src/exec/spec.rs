// src/exec/spec.rs

//! Description of one external invocation and its normalized result.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One external tool invocation.
///
/// Built once through the consuming builder methods and never mutated after
/// it has been handed to an executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    argv: Vec<String>,
    shell: bool,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
    label: String,
}

impl CommandSpec {
    /// `argv[0]` is the executable name or path.
    pub fn new<I, S>(label: impl Into<String>, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            shell: false,
            env: BTreeMap::new(),
            cwd: None,
            label: label.into(),
        }
    }

    /// Run through `sh -c` instead of executing `argv[0]` directly.
    pub fn through_shell(mut self) -> Self {
        self.shell = true;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or(&[])
    }

    pub fn is_shell(&self) -> bool {
        self.shell
    }

    pub fn envs(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The argument vector as a single shell-safe line.
    ///
    /// Used both for logging and as the script for shell-mode execution.
    pub fn command_line(&self) -> String {
        self.argv
            .iter()
            .map(|a| shell_quote(a))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@%+".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Where a detached process writes its stdout/stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    /// Discard all output.
    Null,
    /// Append both streams to this file (created if missing).
    AppendTo(PathBuf),
}

/// Normalized outcome of a completed invocation.
///
/// A nonzero exit status is *not* an error: it shows up as `success == false`
/// with `error` holding the tool's diagnostic text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub pid: Option<u32>,
}

impl CommandResult {
    pub fn new(
        success: bool,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        exit_code: Option<i32>,
        pid: Option<u32>,
    ) -> Self {
        Self {
            success,
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
            pid,
        }
    }

    /// Diagnostic text for a failed run: both streams, stdout first.
    pub fn error(&self) -> Option<String> {
        if self.success {
            None
        } else {
            Some(self.combined_output())
        }
    }

    /// Both streams, stdout first.
    pub fn combined_output(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) if self.stdout.ends_with('\n') => {
                format!("{}{}", self.stdout, self.stderr)
            }
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }
}
