#![allow(dead_code)]

use std::path::PathBuf;

pub use xcpilot_test_utils::builders;
pub use xcpilot_test_utils::fake_executor;
pub use xcpilot_test_utils::{init_tracing, with_deadline, with_timeout};

/// Contents of a file under `tests/fixtures/`.
pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading fixture {path:?}: {e}"))
}
