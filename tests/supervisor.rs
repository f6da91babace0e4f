// tests/supervisor.rs

mod common;
use crate::common::fake_executor::{ExitMode, FakeProcessHandle};
use crate::common::{init_tracing, with_deadline, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use xcpilot::errors::ErrorClass;
use xcpilot::exec::ProcessHandle;
use xcpilot::supervisor::{
    escalate, ManagedProcess, ProcessRegistry, ProcessSupervisor, TerminationKind,
};

const SHORT_GRACE: Duration = Duration::from_millis(50);

fn supervisor() -> ProcessSupervisor {
    ProcessSupervisor::new(SHORT_GRACE)
}

#[tokio::test]
async fn graceful_exit_never_sends_kill() {
    init_tracing();
    let sup = supervisor();
    let handle = FakeProcessHandle::new("server", ExitMode::OnTerminate, None);
    let probe = handle.probe();
    sup.register("p1", Box::new(handle), Utc::now(), "dev server")
        .unwrap();

    let report = with_timeout(sup.stop("p1")).await.unwrap();

    assert_eq!(report.termination, TerminationKind::Graceful);
    assert_eq!(report.description, "dev server");
    assert_eq!(probe.terminate_calls(), 1);
    assert_eq!(probe.kill_calls(), 0);
    assert!(sup.get("p1").is_none());
}

#[tokio::test]
async fn stubborn_process_is_killed_exactly_once() {
    let sup = supervisor();
    let handle = FakeProcessHandle::new("stubborn", ExitMode::OnKill, None);
    let probe = handle.probe();
    sup.register("p1", Box::new(handle), Utc::now(), "ignores SIGTERM")
        .unwrap();

    let report = with_timeout(sup.stop("p1")).await.unwrap();

    assert_eq!(report.termination, TerminationKind::Forced);
    assert_eq!(probe.terminate_calls(), 1);
    assert_eq!(probe.kill_calls(), 1);
    assert!(probe.has_exited());
    assert!(sup.list().is_empty());
}

#[tokio::test]
async fn unkillable_process_still_leaves_the_registry() {
    let sup = supervisor();
    let handle = FakeProcessHandle::new("zombie", ExitMode::Never, None);
    let probe = handle.probe();
    sup.register("p1", Box::new(handle), Utc::now(), "never exits")
        .unwrap();

    let report = with_timeout(sup.stop("p1")).await.unwrap();

    assert_eq!(report.termination, TerminationKind::Forced);
    assert_eq!(probe.kill_calls(), 1);
    assert!(sup.get("p1").is_none());
}

#[tokio::test]
async fn process_that_already_exited_stops_gracefully() {
    let sup = supervisor();
    let handle = FakeProcessHandle::new("done", ExitMode::Never, None);
    let probe = handle.probe();
    probe.exit(0);
    sup.register("p1", Box::new(handle), Utc::now(), "finished on its own")
        .unwrap();

    let report = with_timeout(sup.stop("p1")).await.unwrap();
    assert_eq!(report.termination, TerminationKind::Graceful);
    assert_eq!(probe.kill_calls(), 0);
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let sup = supervisor();
    let err = sup.stop("nope").await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::NotFound);
    assert!(err.to_string().contains("nope"));
}

#[tokio::test]
async fn second_stop_is_not_found() {
    let sup = supervisor();
    sup.register(
        "p1",
        Box::new(FakeProcessHandle::new("s", ExitMode::OnTerminate, None)),
        Utc::now(),
        "",
    )
    .unwrap();

    sup.stop("p1").await.unwrap();
    let err = sup.stop("p1").await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::NotFound);
}

#[tokio::test]
async fn duplicate_id_is_rejected() {
    let sup = supervisor();
    sup.register(
        "p1",
        Box::new(FakeProcessHandle::new("a", ExitMode::OnTerminate, None)),
        Utc::now(),
        "first",
    )
    .unwrap();

    let err = sup
        .register(
            "p1",
            Box::new(FakeProcessHandle::new("b", ExitMode::OnTerminate, None)),
            Utc::now(),
            "second",
        )
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Validation);
    assert_eq!(sup.get("p1").unwrap().description, "first");
}

#[tokio::test]
async fn signal_failure_is_reported_and_entry_removed() {
    let sup = supervisor();
    let handle = FakeProcessHandle::new("gone", ExitMode::OnTerminate, Some("ESRCH".into()));
    let probe = handle.probe();
    sup.register("p1", Box::new(handle), Utc::now(), "").unwrap();

    let err = sup.stop("p1").await.unwrap_err();

    assert_eq!(err.class(), ErrorClass::System);
    assert!(err.to_string().contains("ESRCH"));
    assert_eq!(probe.kill_calls(), 0);
    assert!(sup.get("p1").is_none());
}

#[tokio::test]
async fn list_is_ordered_by_id_and_stop_all_empties_it() {
    let sup = supervisor();
    let started = Utc::now();
    for id in ["b", "a", "c"] {
        sup.register(
            id,
            Box::new(FakeProcessHandle::new(id, ExitMode::OnTerminate, None)),
            started,
            format!("process {id}"),
        )
        .unwrap();
    }

    let ids: Vec<String> = sup.list().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(sup.list()[0].started_at, started);

    let results = with_timeout(sup.stop_all()).await;
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|(_, r)| r.is_ok()));
    assert!(sup.list().is_empty());
}

#[tokio::test]
async fn concurrent_stops_resolve_to_one_report() {
    let sup = supervisor();
    let handle = FakeProcessHandle::new("s", ExitMode::OnKill, None);
    let probe = handle.probe();
    sup.register("p1", Box::new(handle), Utc::now(), "").unwrap();

    let (a, b) = with_timeout(async { tokio::join!(sup.stop("p1"), sup.stop("p1")) }).await;

    let (winner, loser) = if a.is_ok() { (a, b) } else { (b, a) };
    assert_eq!(winner.unwrap().termination, TerminationKind::Forced);
    assert_eq!(loser.unwrap_err().class(), ErrorClass::NotFound);
    assert!(sup.get("p1").is_none());
    assert_eq!(probe.terminate_calls(), 1);
    assert_eq!(probe.kill_calls(), 1);
}

fn managed(id: &str, handle: FakeProcessHandle) -> ManagedProcess {
    let handle: Box<dyn ProcessHandle> = Box::new(handle);
    ManagedProcess {
        id: id.to_string(),
        handle: Arc::new(tokio::sync::Mutex::new(handle)),
        started_at: Utc::now(),
        description: String::new(),
    }
}

#[test]
fn stale_handle_does_not_remove_a_reused_id() {
    let registry = ProcessRegistry::new();
    let old = managed("p1", FakeProcessHandle::new("old", ExitMode::OnTerminate, None));
    let old_handle = old.handle.clone();
    registry.insert(old).unwrap();
    registry.remove("p1");

    let new = managed("p1", FakeProcessHandle::new("new", ExitMode::OnTerminate, None));
    let new_handle = new.handle.clone();
    registry.insert(new).unwrap();

    assert!(!registry.holds("p1", &old_handle));
    assert!(registry.remove_if_same("p1", &old_handle).is_none());
    assert!(registry.holds("p1", &new_handle));
    assert!(registry.remove_if_same("p1", &new_handle).is_some());
    assert!(registry.is_empty());
}

#[tokio::test]
async fn escalate_works_on_a_bare_handle() {
    let mut handle = FakeProcessHandle::new("bare", ExitMode::OnKill, None);
    let probe = handle.probe();

    let kind = with_deadline(Duration::from_secs(1), escalate(&mut handle, SHORT_GRACE))
        .await
        .unwrap();

    assert_eq!(kind, TerminationKind::Forced);
    assert_eq!(probe.kill_calls(), 1);
}
