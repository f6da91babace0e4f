// src/parse/mod.rs

//! Pure parsers for external tool output.
//!
//! None of these formats is a stable public contract, so each parser lives in
//! its own module with its grammar documented at the top, and is exercised by
//! golden samples under `tests/fixtures/`.

pub mod build_settings;
pub mod devices;
pub mod schemes;
pub mod xcresult;

pub use build_settings::{app_path, codesigning_folder_path, setting};
pub use devices::{
    parse_json_listing, parse_simulator_listings, parse_text_listing, reconcile,
    runtime_display_name, ListingSource, SimulatorDevice, SimulatorList, SimulatorRuntime,
};
pub use schemes::parse_schemes;
pub use xcresult::{parse_test_summary, TestSummary};
