// tests/toolbox.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, IntentBuilder};
use crate::common::fake_executor::{failed_result, ok_result, FakeExecutor, SpawnReply};
use crate::common::{fixture, init_tracing};

use std::path::PathBuf;
use std::sync::Arc;

use xcpilot::app::Toolbox;
use xcpilot::build::ProjectRef;
use xcpilot::exec::{CommandExecutor, CommandResult};
use xcpilot::fs::mock::MockFileSystem;
use xcpilot::fs::FileSystem;
use xcpilot::logcap::SubsystemFilter;
use xcpilot::response::ToolResponse;
use xcpilot::tools::SwiftPackageRequest;

fn toolbox(fake: &Arc<FakeExecutor>, fs: &MockFileSystem) -> Toolbox {
    init_tracing();
    let cfg = ConfigFileBuilder::new()
        .with_grace_ms(50)
        .with_log_dir("/logs")
        .with_tool("xcodemake", "/definitely/not/installed/xcodemake")
        .build();
    let exec: Arc<dyn CommandExecutor> = fake.clone();
    let fs: Arc<dyn FileSystem> = Arc::new(fs.clone());
    Toolbox::new(cfg, exec, fs)
}

#[test]
fn response_serializes_without_null_error() {
    let json = serde_json::to_value(ToolResponse::ok("done")).unwrap();
    assert_eq!(json, serde_json::json!({ "success": true, "output": "done" }));

    let json = serde_json::to_value(ToolResponse::failure("nope")).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "success": false, "output": "", "error": "nope" })
    );
}

#[tokio::test]
async fn successful_build_returns_tool_stdout() {
    let fake = Arc::new(FakeExecutor::new());
    fake.on_run("xcodebuild", ok_result("** BUILD SUCCEEDED **\n"));
    let toolbox = toolbox(&fake, &MockFileSystem::new());

    let resp = toolbox
        .build(&IntentBuilder::new().simulator_id("SIM1").build())
        .await;
    assert_eq!(resp, ToolResponse::ok("** BUILD SUCCEEDED **\n"));
}

#[tokio::test]
async fn incremental_request_without_xcodemake_falls_back() {
    let fake = Arc::new(FakeExecutor::new());
    fake.on_run("xcodebuild", ok_result("ok"));
    let toolbox = toolbox(&fake, &MockFileSystem::new());

    let resp = toolbox
        .build(&IntentBuilder::new().incremental().build())
        .await;
    assert!(resp.success);
    assert_eq!(fake.run_argvs().len(), 1);
    assert_eq!(fake.run_argvs()[0][0], "xcodebuild");
}

#[tokio::test]
async fn failed_build_carries_label_and_detail() {
    let fake = Arc::new(FakeExecutor::new());
    fake.on_run(
        "xcodebuild",
        failed_result("** BUILD FAILED **\nerror: type mismatch", 65),
    );
    let toolbox = toolbox(&fake, &MockFileSystem::new());

    let resp = toolbox.build(&IntentBuilder::new().build()).await;
    assert!(!resp.success);
    assert_eq!(resp.output, "");
    assert_eq!(
        resp.error.as_deref(),
        Some("Build failed: ** BUILD FAILED **\nerror: type mismatch")
    );
}

#[tokio::test]
async fn compiler_errors_on_stdout_survive_stderr_warnings() {
    let fake = Arc::new(FakeExecutor::new());
    fake.on_run(
        "xcodebuild",
        CommandResult::new(
            false,
            "/src/App.swift:3:5: error: cannot find 'foo' in scope\n** BUILD FAILED **",
            "--- xcodebuild: WARNING: Using the first of multiple matching destinations",
            Some(65),
            Some(1),
        ),
    );
    let toolbox = toolbox(&fake, &MockFileSystem::new());

    let resp = toolbox.build(&IntentBuilder::new().build()).await;
    assert!(!resp.success);
    let error = resp.error.unwrap();
    assert!(error.starts_with("Build failed: "), "{error}");
    assert!(error.contains("/src/App.swift:3:5: error: cannot find 'foo' in scope"));
    assert!(error.contains("WARNING: Using the first of multiple matching destinations"));
}

#[tokio::test]
async fn validation_failure_is_a_failed_response() {
    let fake = Arc::new(FakeExecutor::new());
    let toolbox = toolbox(&fake, &MockFileSystem::new());

    let resp = toolbox.build(&IntentBuilder::new().scheme("").build()).await;
    assert!(!resp.success);
    assert!(resp.error.unwrap().starts_with("Invalid request:"));
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn empty_scheme_listing_says_so() {
    let fake = Arc::new(FakeExecutor::new());
    fake.on_run("-list", ok_result("Information about project \"App\":\n    Targets:\n        App\n"));
    let toolbox = toolbox(&fake, &MockFileSystem::new());

    let resp = toolbox
        .list_schemes(&ProjectRef::Project(PathBuf::from("App.xcodeproj")))
        .await;
    assert_eq!(resp, ToolResponse::ok("No schemes found"));
}

#[tokio::test]
async fn scheme_listing_is_one_per_line() {
    let fake = Arc::new(FakeExecutor::new());
    fake.on_run("-list", ok_result(&fixture("xcodebuild_list.txt")));
    let toolbox = toolbox(&fake, &MockFileSystem::new());

    let resp = toolbox
        .list_schemes(&ProjectRef::Workspace(PathBuf::from("App.xcworkspace")))
        .await;
    assert_eq!(resp.output, "App\nAppTests\nWidgets Extension");
}

#[tokio::test]
async fn log_capture_round_trip_through_toolbox() {
    let fs = MockFileSystem::new();
    let fake = Arc::new(FakeExecutor::with_fs(fs.clone()));
    fake.on_spawn("log stream", SpawnReply::writes("hello from the app\n"));
    let toolbox = toolbox(&fake, &fs);

    let resp = toolbox
        .start_log_capture("SIM1", "com.example.App", false, SubsystemFilter::AppOnly)
        .await;
    assert!(resp.success);
    let mut lines = resp.output.lines();
    let session_id = lines
        .next()
        .and_then(|l| l.strip_prefix("Log capture started with session ID: "))
        .unwrap()
        .to_string();
    assert_eq!(
        lines.next(),
        Some(format!("Log file: /logs/xcpilot_sim_log_{session_id}.log").as_str())
    );

    let resp = toolbox.stop_log_capture(&session_id).await;
    assert_eq!(resp, ToolResponse::ok("hello from the app\n"));

    let resp = toolbox.stop_log_capture(&session_id).await;
    assert!(!resp.success);
    assert!(resp.error.unwrap().starts_with("Not found:"));
}

#[tokio::test]
async fn swift_run_then_stop_process() {
    let fake = Arc::new(FakeExecutor::new());
    fake.on_spawn("swift run", SpawnReply::default());
    let toolbox = toolbox(&fake, &MockFileSystem::new());

    let running = toolbox
        .start_package(&SwiftPackageRequest::new("/src/Pkg"), None, &[], None)
        .unwrap();

    let listed = toolbox.list_processes();
    assert!(listed.output.starts_with(&running.id));

    let resp = toolbox.stop_process(&running.id).await;
    assert!(resp.success, "{resp:?}");
    assert!(resp.output.contains("Graceful"));
    assert_eq!(toolbox.list_processes(), ToolResponse::ok("No running processes"));

    let resp = toolbox.stop_process(&running.id).await;
    assert!(!resp.success);
}

#[tokio::test]
async fn shutdown_stops_everything() {
    let fs = MockFileSystem::new();
    let fake = Arc::new(FakeExecutor::with_fs(fs.clone()));
    let toolbox = toolbox(&fake, &fs);

    toolbox
        .start_log_capture("SIM1", "com.example.App", true, SubsystemFilter::All)
        .await;
    toolbox
        .start_package(&SwiftPackageRequest::new("/src/Pkg"), None, &[], None)
        .unwrap();

    toolbox.shutdown().await;

    assert!(toolbox.log_capture().active_sessions().is_empty());
    assert!(toolbox.supervisor().list().is_empty());
    assert!(fake.probes().iter().all(|p| p.terminate_calls() == 1));
}
