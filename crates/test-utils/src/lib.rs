//! Shared fixtures for the xcpilot integration tests: a scripted
//! [`fake_executor::FakeExecutor`] standing in for the Apple toolchain,
//! builders for configs and build intents, and a few async helpers.

pub mod builders;
pub mod fake_executor;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Upper bound for any single supervisor or log-capture test. Grace periods
/// in the tests are tens of milliseconds, so hitting this means a hang.
pub const TEST_DEADLINE: Duration = Duration::from_secs(5);

/// Install a test-writer subscriber once per test binary.
///
/// Defaults to `xcpilot=debug` so spawn, escalation and session events show up
/// in a failing test's captured output. `RUST_LOG` overrides it.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,xcpilot=debug"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, failing the test if it outlives [`TEST_DEADLINE`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    with_deadline(TEST_DEADLINE, f).await
}

/// Await `f`, failing the test if it outlives `deadline`.
pub async fn with_deadline<F, T>(deadline: Duration, f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(deadline, f)
        .await
        .unwrap_or_else(|_| panic!("test did not finish within {deadline:?}"))
}
