// src/parse/build_settings.rs

//! `KEY = value` extraction from `xcodebuild -showBuildSettings` output.
//!
//! Each setting is one line of the form `<indent>KEY = value`. When several
//! targets are listed, the first occurrence of a key wins.

use std::path::PathBuf;

use regex::Regex;

use crate::errors::{Result, XcpilotError};

pub const BUILT_PRODUCTS_DIR: &str = "BUILT_PRODUCTS_DIR";
pub const FULL_PRODUCT_NAME: &str = "FULL_PRODUCT_NAME";
pub const CODESIGNING_FOLDER_PATH: &str = "CODESIGNING_FOLDER_PATH";
pub const PRODUCT_BUNDLE_IDENTIFIER: &str = "PRODUCT_BUNDLE_IDENTIFIER";

/// Value of the first `KEY = value` line for `key`, trimmed.
pub fn setting(output: &str, key: &str) -> Option<String> {
    let pattern = format!(r"(?m)^[ \t]*{}[ \t]*=[ \t]*(.*?)[ \t\r]*$", regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    re.captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|v| !v.is_empty())
}

/// Built product path: `BUILT_PRODUCTS_DIR` joined with `FULL_PRODUCT_NAME`.
pub fn app_path(output: &str) -> Result<PathBuf> {
    let dir = require(output, BUILT_PRODUCTS_DIR)?;
    let name = require(output, FULL_PRODUCT_NAME)?;
    Ok(PathBuf::from(dir).join(name))
}

pub fn codesigning_folder_path(output: &str) -> Result<PathBuf> {
    require(output, CODESIGNING_FOLDER_PATH).map(PathBuf::from)
}

fn require(output: &str, key: &str) -> Result<String> {
    setting(output, key).ok_or_else(|| {
        XcpilotError::parse(
            "build settings",
            format!("{key} not found in build settings output"),
        )
    })
}
