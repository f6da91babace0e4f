// src/logcap/filter.rs

//! Subsystem filters for the structured log stream.

use std::fmt;

use crate::errors::{Result, XcpilotError};

/// Which log subsystems a capture session keeps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubsystemFilter {
    /// Only the app's own subsystem (its bundle id).
    #[default]
    AppOnly,
    /// No predicate at all.
    All,
    /// The app plus the UI framework's subsystem.
    SwiftUi,
    /// The app plus an explicit list.
    Custom(Vec<String>),
}

impl SubsystemFilter {
    /// Combine a named mode (`app`, `all`, `swiftui`) with an optional
    /// custom list.
    ///
    /// A custom list only combines with the default `app` mode; anything else
    /// is ambiguous and rejected as a filter conflict.
    pub fn resolve(mode: Option<&str>, custom: &[String]) -> Result<Self> {
        let custom: Vec<String> = custom
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let mode = mode.map(|m| m.trim().to_lowercase());
        match mode.as_deref() {
            None | Some("app") => Ok(if custom.is_empty() {
                SubsystemFilter::AppOnly
            } else {
                SubsystemFilter::Custom(custom)
            }),
            Some(named @ ("all" | "swiftui")) => {
                if !custom.is_empty() {
                    return Err(XcpilotError::validation(format!(
                        "FilterConflict: subsystem filter '{named}' cannot be combined with a custom subsystem list"
                    )));
                }
                Ok(if named == "all" {
                    SubsystemFilter::All
                } else {
                    SubsystemFilter::SwiftUi
                })
            }
            Some(other) => Err(XcpilotError::validation(format!(
                "unknown subsystem filter '{other}' (expected app, all or swiftui)"
            ))),
        }
    }

    /// Subsystems to keep, deduplicated in first-seen order, or `None` for
    /// everything.
    pub fn subsystems(&self, bundle_id: &str, ui_subsystem: &str) -> Option<Vec<String>> {
        let mut wanted = vec![bundle_id.to_string()];
        match self {
            SubsystemFilter::All => return None,
            SubsystemFilter::AppOnly => {}
            SubsystemFilter::SwiftUi => wanted.push(ui_subsystem.to_string()),
            SubsystemFilter::Custom(list) => wanted.extend(list.iter().cloned()),
        }

        let mut out: Vec<String> = Vec::with_capacity(wanted.len());
        for s in wanted {
            if !out.contains(&s) {
                out.push(s);
            }
        }
        Some(out)
    }

    /// `log stream --predicate` value.
    pub fn predicate(&self, bundle_id: &str, ui_subsystem: &str) -> Option<String> {
        self.subsystems(bundle_id, ui_subsystem).map(|subs| {
            subs.iter()
                .map(|s| format!("subsystem == \"{s}\""))
                .collect::<Vec<_>>()
                .join(" OR ")
        })
    }
}

impl fmt::Display for SubsystemFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubsystemFilter::AppOnly => f.write_str("app"),
            SubsystemFilter::All => f.write_str("all"),
            SubsystemFilter::SwiftUi => f.write_str("swiftui"),
            SubsystemFilter::Custom(list) => write!(f, "app+[{}]", list.join(",")),
        }
    }
}
