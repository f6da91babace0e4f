// tests/executor.rs
//
// These tests spawn real processes through `sh`.
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout};

use std::time::Duration;

use tempfile::tempdir;
use xcpilot::errors::{ErrorClass, XcpilotError};
use xcpilot::exec::{
    ensure_binary, find_binary, CommandExecutor, CommandSpec, OutputSink, RealCommandExecutor,
};
use xcpilot::supervisor::{escalate, TerminationKind};

fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("sh", ["sh", "-c", script])
}

#[tokio::test]
async fn captures_stdout_and_stderr() {
    init_tracing();
    let exec = RealCommandExecutor::new();
    let result = exec.run(sh("echo out; echo err 1>&2")).await.unwrap();

    assert!(result.success);
    assert_eq!(result.stdout, "out\n");
    assert_eq!(result.stderr, "err\n");
    assert_eq!(result.exit_code, Some(0));
    assert!(result.pid.is_some());
    assert_eq!(result.error(), None);
}

#[tokio::test]
async fn nonzero_exit_is_a_result_not_an_error() {
    let exec = RealCommandExecutor::new();
    let result = exec.run(sh("echo broken 1>&2; exit 3")).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.exit_code, Some(3));
    assert_eq!(result.error().as_deref(), Some("broken\n"));
}

#[tokio::test]
async fn failure_without_stderr_reports_stdout() {
    let exec = RealCommandExecutor::new();
    let result = exec.run(sh("echo only-stdout; exit 1")).await.unwrap();
    assert_eq!(result.error().as_deref(), Some("only-stdout\n"));
}

#[tokio::test]
async fn missing_binary_is_a_dependency_error() {
    let exec = RealCommandExecutor::new();
    let err = exec
        .run(CommandSpec::new("ghost", ["xcpilot-no-such-binary-7f3a"]))
        .await
        .unwrap_err();

    match &err {
        XcpilotError::Dependency { tool, remediation } => {
            assert_eq!(tool, "xcpilot-no-such-binary-7f3a");
            assert!(remediation.contains("[tools]"));
        }
        other => panic!("expected dependency error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_argv_is_rejected() {
    let exec = RealCommandExecutor::new();
    let err = exec
        .run(CommandSpec::new("empty", Vec::<String>::new()))
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Validation);

    let err = exec
        .spawn_detached(CommandSpec::new("empty", Vec::<String>::new()), OutputSink::Null)
        .err()
        .expect("spawn should fail");
    assert_eq!(err.class(), ErrorClass::Validation);
}

#[tokio::test]
async fn shell_mode_quotes_arguments() {
    let exec = RealCommandExecutor::new();
    let result = exec
        .run(CommandSpec::new("echo", ["echo", "two words", "it's"]).through_shell())
        .await
        .unwrap();
    assert_eq!(result.stdout, "two words it's\n");
}

#[tokio::test]
async fn env_and_cwd_are_applied() {
    let dir = tempdir().unwrap();
    let exec = RealCommandExecutor::new();
    let result = exec
        .run(
            sh("echo \"$XCPILOT_TEST_VALUE\"; pwd")
                .env("XCPILOT_TEST_VALUE", "hello")
                .current_dir(dir.path()),
        )
        .await
        .unwrap();

    let mut lines = result.stdout.lines();
    assert_eq!(lines.next(), Some("hello"));
    let cwd = std::path::PathBuf::from(lines.next().unwrap());
    assert_eq!(
        cwd.canonicalize().unwrap(),
        dir.path().canonicalize().unwrap()
    );
}

#[tokio::test]
async fn detached_output_is_appended_to_file() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("out.log");
    std::fs::write(&log, "existing\n").unwrap();

    let exec = RealCommandExecutor::new();
    let mut handle = exec
        .spawn_detached(
            sh("echo from-stdout; echo from-stderr 1>&2"),
            OutputSink::AppendTo(log.clone()),
        )
        .unwrap();
    assert!(handle.pid().is_some());

    let info = with_timeout(handle.wait()).await.unwrap();
    assert!(info.success());

    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.starts_with("existing\n"));
    assert!(text.contains("from-stdout\n"));
    assert!(text.contains("from-stderr\n"));
}

#[tokio::test]
async fn sigterm_stops_a_cooperative_process() {
    let exec = RealCommandExecutor::new();
    let mut handle = exec
        .spawn_detached(CommandSpec::new("sleep", ["sleep", "30"]), OutputSink::Null)
        .unwrap();

    let kind = with_timeout(escalate(handle.as_mut(), Duration::from_secs(3)))
        .await
        .unwrap();
    assert_eq!(kind, TerminationKind::Graceful);
}

#[tokio::test]
async fn process_ignoring_sigterm_is_killed() {
    let exec = RealCommandExecutor::new();
    let mut handle = exec
        .spawn_detached(sh("trap '' TERM; while :; do sleep 1; done"), OutputSink::Null)
        .unwrap();

    // Let the shell install its trap first.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let kind = with_timeout(escalate(handle.as_mut(), Duration::from_millis(200)))
        .await
        .unwrap();
    assert_eq!(kind, TerminationKind::Forced);
}

#[test]
fn binaries_are_resolved_on_path() {
    assert!(find_binary("sh").is_some());
    assert!(find_binary("xcpilot-no-such-binary-7f3a").is_none());
    assert!(find_binary("/definitely/not/here/sh").is_none());

    let err = ensure_binary("xcpilot-no-such-binary-7f3a", "install it").unwrap_err();
    assert_eq!(err.class(), ErrorClass::Dependency);
    assert!(err.to_string().contains("install it"));
}
