// src/parse/schemes.rs

//! Scheme list extraction from `xcodebuild -list` output.
//!
//! Grammar (informal):
//!
//! ```text
//! Information about project "App":
//!     Targets:
//!         App
//!
//!     Schemes:
//!         App
//!         AppTests
//! ```
//!
//! The block starts right after the first line that ends in `Schemes:` and
//! runs until the next completely empty line or the end of the text.

/// Ordered, trimmed scheme names. Returns an empty list if there is no
/// `Schemes:` block.
pub fn parse_schemes(output: &str) -> Vec<String> {
    let normalized = output.replace("\r\n", "\n");
    let mut lines = normalized.lines();

    if !lines.by_ref().any(|line| line.trim_end().ends_with("Schemes:")) {
        return Vec::new();
    }

    lines
        .take_while(|line| !line.is_empty())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
