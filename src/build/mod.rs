// src/build/mod.rs

//! Build intents and their translation into build-tool invocations.
//!
//! - [`intent`]: what the caller asked for, plus pre-spawn validation.
//! - [`destination`]: the `-destination` selector string.
//! - [`composer`]: argv composition, backend fallback and the test-result phase.
//! - [`incremental`]: the optional `make`/`xcodemake` fast path.
//! - [`classify`]: mapping failed output to a short label.

pub mod classify;
pub mod composer;
pub mod destination;
pub mod incremental;
pub mod intent;

pub use classify::{classify_failure, failure_label, FailureReport};
pub use composer::{compose_argv, BackendUsed, BuildComposer, BuildOutcome};
pub use destination::{compose_destination, destination_for};
pub use incremental::{IncrementalBackend, MakefileBackend};
pub use intent::{BuildIntent, ProjectRef, Selector};
