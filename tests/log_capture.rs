// tests/log_capture.rs

mod common;
use crate::common::fake_executor::{sink_path, ExitMode, FakeExecutor, SpawnReply};
use crate::common::{init_tracing, with_timeout};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use xcpilot::errors::ErrorClass;
use xcpilot::exec::CommandExecutor;
use xcpilot::fs::mock::MockFileSystem;
use xcpilot::fs::FileSystem;
use xcpilot::logcap::{CaptureMode, LogCaptureEngine, SubsystemFilter};

const LOG_DIR: &str = "/logs";

fn engine(fake: &Arc<FakeExecutor>, fs: &MockFileSystem) -> LogCaptureEngine {
    let exec: Arc<dyn CommandExecutor> = fake.clone();
    let fs: Arc<dyn FileSystem> = Arc::new(fs.clone());
    LogCaptureEngine::new(exec, fs, LOG_DIR).with_grace(Duration::from_millis(50))
}

fn setup() -> (Arc<FakeExecutor>, MockFileSystem, LogCaptureEngine) {
    init_tracing();
    let fs = MockFileSystem::new();
    let fake = Arc::new(FakeExecutor::with_fs(fs.clone()));
    let engine = engine(&fake, &fs);
    (fake, fs, engine)
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn start_then_stop_returns_text_and_deletes_file() {
    let (fake, fs, engine) = setup();
    fake.on_spawn("log stream", SpawnReply::writes("line one\nline two\n"));

    let started = engine
        .start_capture("SIM1", "com.example.App", false, SubsystemFilter::AppOnly)
        .await
        .unwrap();

    assert_eq!(
        started.log_file_path,
        PathBuf::from(format!("/logs/xcpilot_sim_log_{}.log", started.session_id))
    );
    assert!(engine.is_active(&started.session_id));
    assert_eq!(fake.spawns().len(), 1);
    assert_eq!(
        sink_path(&fake.spawns()[0].1).as_deref(),
        Some(started.log_file_path.as_path())
    );

    let text = with_timeout(engine.stop_capture(&started.session_id))
        .await
        .unwrap();

    assert_eq!(text, "line one\nline two\n");
    assert!(fs.entry(&started.log_file_path).is_none());
    assert!(!engine.is_active(&started.session_id));
    assert!(engine.active_sessions().is_empty());

    let probes = fake.probes();
    assert_eq!(probes[0].terminate_calls(), 1);
    assert_eq!(probes[0].kill_calls(), 0);
}

#[tokio::test]
async fn second_stop_is_not_found() {
    let (_fake, _fs, engine) = setup();
    let started = engine
        .start_capture("SIM1", "com.example.App", false, SubsystemFilter::AppOnly)
        .await
        .unwrap();

    engine.stop_capture(&started.session_id).await.unwrap();
    let err = engine.stop_capture(&started.session_id).await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::NotFound);
}

#[tokio::test]
async fn unknown_session_touches_nothing() {
    let (fake, fs, engine) = setup();
    fs.clear_operations();

    let err = engine.stop_capture("does-not-exist").await.unwrap_err();

    assert_eq!(err.class(), ErrorClass::NotFound);
    assert!(fs.operations().is_empty());
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn console_mode_spawns_console_then_stream() {
    let (fake, _fs, engine) = setup();
    fake.on_spawn("--console-pty", SpawnReply::writes("console: hello\n"));
    fake.on_spawn("log stream", SpawnReply::writes("stream: hello\n"));

    let started = engine
        .start_capture("SIM1", "com.example.App", true, SubsystemFilter::AppOnly)
        .await
        .unwrap();

    let spawns = fake.spawns();
    assert_eq!(spawns.len(), 2);
    assert_eq!(
        spawns[0].0.argv(),
        strings(&[
            "xcrun",
            "simctl",
            "launch",
            "--console-pty",
            "--terminate-running-process",
            "SIM1",
            "com.example.App",
        ])
        .as_slice()
    );
    assert_eq!(spawns[1].0.label(), "simctl log stream");
    assert_eq!(spawns[0].1, spawns[1].1, "both producers share one file");

    let summary = &engine.active_sessions()[0];
    assert_eq!(summary.mode, CaptureMode::StructuredWithConsole);

    let text = engine.stop_capture(&started.session_id).await.unwrap();
    assert_eq!(text, "console: hello\nstream: hello\n");
    assert!(fake.probes().iter().all(|p| p.terminate_calls() == 1));
}

#[tokio::test]
async fn stream_argv_carries_level_and_predicate() {
    let (fake, _fs, engine) = setup();

    engine
        .start_capture(
            "SIM1",
            "com.example.App",
            false,
            SubsystemFilter::Custom(vec!["com.example.Net".into()]),
        )
        .await
        .unwrap();

    assert_eq!(
        fake.spawns()[0].0.argv(),
        strings(&[
            "xcrun",
            "simctl",
            "spawn",
            "SIM1",
            "log",
            "stream",
            "--level=debug",
            "--predicate",
            "subsystem == \"com.example.App\" OR subsystem == \"com.example.Net\"",
        ])
        .as_slice()
    );
}

#[tokio::test]
async fn all_filter_has_no_predicate() {
    let (fake, _fs, engine) = setup();
    engine
        .start_capture("SIM1", "com.example.App", false, SubsystemFilter::All)
        .await
        .unwrap();
    let argv = fake.spawns()[0].0.argv().to_vec();
    assert_eq!(argv.last().map(String::as_str), Some("--level=debug"));
    assert!(!argv.iter().any(|a| a == "--predicate"));
}

#[tokio::test]
async fn sessions_on_the_same_simulator_are_independent() {
    let (fake, fs, engine) = setup();
    fake.on_spawn("log stream", SpawnReply::writes("shared line\n"));

    let a = engine
        .start_capture("SIM1", "com.example.App", false, SubsystemFilter::AppOnly)
        .await
        .unwrap();
    let b = engine
        .start_capture("SIM1", "com.example.App", false, SubsystemFilter::AppOnly)
        .await
        .unwrap();

    assert_ne!(a.session_id, b.session_id);
    assert_ne!(a.log_file_path, b.log_file_path);
    assert_eq!(engine.active_sessions().len(), 2);

    engine.stop_capture(&a.session_id).await.unwrap();

    assert!(engine.is_active(&b.session_id));
    assert!(fs.entry(&b.log_file_path).is_some());
    let probes = fake.probes();
    assert_eq!(probes[0].terminate_calls(), 1);
    assert_eq!(probes[1].terminate_calls(), 0);

    assert_eq!(
        engine.stop_capture(&b.session_id).await.unwrap(),
        "shared line\n"
    );
}

#[tokio::test]
async fn failed_producer_spawn_tears_everything_down() {
    let (fake, fs, engine) = setup();
    fake.on_spawn("--console-pty", SpawnReply::default());
    fake.on_spawn("log stream", SpawnReply::failing("no such simulator"));

    let err = engine
        .start_capture("SIM1", "com.example.App", true, SubsystemFilter::AppOnly)
        .await
        .unwrap_err();

    assert_eq!(err.class(), ErrorClass::System);
    assert!(engine.active_sessions().is_empty());

    let probes = fake.probes();
    assert_eq!(probes.len(), 1, "only the console producer started");
    assert_eq!(probes[0].terminate_calls(), 1);

    assert!(fs
        .paths()
        .iter()
        .all(|p| !p.to_string_lossy().contains("xcpilot_sim_log_")));
}

#[tokio::test]
async fn stubborn_producer_is_killed_on_stop() {
    let (fake, _fs, engine) = setup();
    fake.on_spawn("log stream", SpawnReply::default().exit_mode(ExitMode::OnKill));

    let started = engine
        .start_capture("SIM1", "com.example.App", false, SubsystemFilter::AppOnly)
        .await
        .unwrap();
    with_timeout(engine.stop_capture(&started.session_id))
        .await
        .unwrap();

    assert_eq!(fake.probes()[0].kill_calls(), 1);
}

#[tokio::test]
async fn producer_signal_failure_does_not_block_stop() {
    let (fake, _fs, engine) = setup();
    fake.on_spawn(
        "log stream",
        SpawnReply::writes("partial\n").terminate_error("EPERM"),
    );

    let started = engine
        .start_capture("SIM1", "com.example.App", false, SubsystemFilter::AppOnly)
        .await
        .unwrap();
    let text = engine.stop_capture(&started.session_id).await.unwrap();

    assert_eq!(text, "partial\n");
    assert!(!engine.is_active(&started.session_id));
}

#[tokio::test]
async fn empty_identifiers_are_rejected_without_spawning() {
    let (fake, fs, engine) = setup();

    let err = engine
        .start_capture("", "com.example.App", false, SubsystemFilter::AppOnly)
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Validation);

    let err = engine
        .start_capture("SIM1", "  ", false, SubsystemFilter::AppOnly)
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Validation);

    assert_eq!(fake.call_count(), 0);
    assert!(fs.operations().is_empty());
}

#[tokio::test]
async fn stop_all_stops_every_session() {
    let (_fake, _fs, engine) = setup();
    for _ in 0..3 {
        engine
            .start_capture("SIM1", "com.example.App", false, SubsystemFilter::AppOnly)
            .await
            .unwrap();
    }

    let results = engine.stop_all().await;
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|(_, r)| r.is_ok()));
    assert!(engine.active_sessions().is_empty());
}

#[test]
fn filter_resolution() {
    assert_eq!(SubsystemFilter::resolve(None, &[]).unwrap(), SubsystemFilter::AppOnly);
    assert_eq!(
        SubsystemFilter::resolve(Some("SwiftUI"), &[]).unwrap(),
        SubsystemFilter::SwiftUi
    );
    assert_eq!(
        SubsystemFilter::resolve(Some("app"), &strings(&["com.a", " "])).unwrap(),
        SubsystemFilter::Custom(strings(&["com.a"]))
    );

    let err = SubsystemFilter::resolve(Some("all"), &strings(&["com.a"])).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Validation);
    assert!(err.to_string().contains("FilterConflict"));

    assert!(SubsystemFilter::resolve(Some("everything"), &[]).is_err());
}

#[test]
fn predicates_deduplicate_and_keep_bundle_first() {
    let ui = "com.apple.SwiftUI";
    assert_eq!(
        SubsystemFilter::AppOnly.predicate("com.example.App", ui).unwrap(),
        "subsystem == \"com.example.App\""
    );
    assert_eq!(
        SubsystemFilter::SwiftUi.predicate("com.example.App", ui).unwrap(),
        "subsystem == \"com.example.App\" OR subsystem == \"com.apple.SwiftUI\""
    );
    assert_eq!(
        SubsystemFilter::Custom(strings(&["com.example.App", "com.b", "com.b"]))
            .subsystems("com.example.App", ui)
            .unwrap(),
        strings(&["com.example.App", "com.b"])
    );
    assert_eq!(SubsystemFilter::All.predicate("com.example.App", ui), None);
}
