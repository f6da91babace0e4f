// src/parse/devices.rs

//! Simulator listing: `simctl list devices --json` reconciled with the plain
//! `simctl list devices` text form.
//!
//! JSON grammar: `{"devices": {"<runtime key>": [{"name", "udid", "state",
//! "isAvailable", ...}]}}` where the runtime key looks like
//! `com.apple.CoreSimulator.SimRuntime.iOS-18-6`.
//!
//! Text grammar:
//!
//! ```text
//! == Devices ==
//! -- iOS 18.6 --
//!     iPhone 16 (4F3A...) (Booted)
//!     iPhone SE (3rd generation) (9B1C...) (Shutdown) (unavailable, runtime profile not found)
//! -- Unavailable: com.apple.CoreSimulator.SimRuntime.iOS-17-0 --
//! ```
//!
//! The JSON form is authoritative for every device it names; runtimes and
//! devices that only appear in the text form are appended.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::errors::{Result, XcpilotError};

const RUNTIME_PREFIX: &str = "com.apple.CoreSimulator.SimRuntime.";

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^--\s+(.+?)\s+--$").expect("runtime header regex is valid")
});

static DEVICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s+(?P<name>.+) \((?P<udid>[0-9A-Za-z-]+)\) \((?P<state>Booted|Shutdown|Booting|Shutting Down|Creating)\)(?P<rest>.*)$",
    )
    .expect("device line regex is valid")
});

/// Which listing a device entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSource {
    Json,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorDevice {
    pub name: String,
    pub udid: String,
    pub state: String,
    pub is_available: bool,
    pub source: ListingSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorRuntime {
    /// Display name, e.g. `iOS 18.6`.
    pub name: String,
    pub devices: Vec<SimulatorDevice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimulatorList {
    pub runtimes: Vec<SimulatorRuntime>,
}

impl SimulatorList {
    pub fn runtime(&self, name: &str) -> Option<&SimulatorRuntime> {
        self.runtimes.iter().find(|r| r.name == name)
    }

    pub fn device(&self, udid: &str) -> Option<&SimulatorDevice> {
        self.runtimes
            .iter()
            .flat_map(|r| r.devices.iter())
            .find(|d| d.udid == udid)
    }

    pub fn devices(&self) -> impl Iterator<Item = &SimulatorDevice> {
        self.runtimes.iter().flat_map(|r| r.devices.iter())
    }
}

impl fmt::Display for SimulatorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Available simulators:")?;
        for runtime in &self.runtimes {
            writeln!(f)?;
            writeln!(f, "{}:", runtime.name)?;
            for device in &runtime.devices {
                write!(f, "- {} ({}) [{}]", device.name, device.udid, device.state)?;
                if !device.is_available {
                    write!(f, " (unavailable)")?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct JsonListing {
    #[serde(default)]
    devices: BTreeMap<String, Vec<JsonDevice>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonDevice {
    name: String,
    udid: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default = "default_available")]
    is_available: bool,
}

fn default_available() -> bool {
    true
}

/// `com.apple.CoreSimulator.SimRuntime.iOS-18-6` → `iOS 18.6`.
///
/// Keys that don't follow that shape are returned unchanged.
pub fn runtime_display_name(key: &str) -> String {
    let Some(rest) = key.strip_prefix(RUNTIME_PREFIX) else {
        return key.to_string();
    };
    match rest.split_once('-') {
        Some((platform, version)) => {
            let platform = if platform == "xrOS" { "visionOS" } else { platform };
            format!("{platform} {}", version.replace('-', "."))
        }
        None => rest.to_string(),
    }
}

pub fn parse_json_listing(json: &str) -> Result<Vec<SimulatorRuntime>> {
    let listing: JsonListing = serde_json::from_str(json)
        .map_err(|e| XcpilotError::parse("simulator JSON listing", e.to_string()))?;

    Ok(listing
        .devices
        .into_iter()
        .map(|(key, devices)| SimulatorRuntime {
            name: runtime_display_name(&key),
            devices: devices
                .into_iter()
                .map(|d| SimulatorDevice {
                    name: d.name,
                    udid: d.udid,
                    state: d.state.unwrap_or_else(|| "Unknown".to_string()),
                    is_available: d.is_available,
                    source: ListingSource::Json,
                })
                .collect(),
        })
        .collect())
}

/// Lines that match neither a runtime header nor a device are ignored.
pub fn parse_text_listing(text: &str) -> Vec<SimulatorRuntime> {
    let mut runtimes: Vec<SimulatorRuntime> = Vec::new();
    let mut runtime_available = true;

    for line in text.lines() {
        let line = line.trim_end();
        if let Some(caps) = HEADER_RE.captures(line) {
            let header = &caps[1];
            let (name, available) = match header.strip_prefix("Unavailable: ") {
                Some(key) => (runtime_display_name(key.trim()), false),
                None => (header.to_string(), true),
            };
            runtime_available = available;
            runtimes.push(SimulatorRuntime {
                name,
                devices: Vec::new(),
            });
            continue;
        }

        let Some(caps) = DEVICE_RE.captures(line) else {
            continue;
        };
        let Some(runtime) = runtimes.last_mut() else {
            continue;
        };
        runtime.devices.push(SimulatorDevice {
            name: caps["name"].trim().to_string(),
            udid: caps["udid"].to_string(),
            state: caps["state"].to_string(),
            is_available: runtime_available && !caps["rest"].contains("unavailable"),
            source: ListingSource::Text,
        });
    }

    runtimes
}

/// Merge the two listings. JSON entries win; text-only runtimes and devices
/// are appended in the order the text listing shows them.
pub fn reconcile(json: Vec<SimulatorRuntime>, text: Vec<SimulatorRuntime>) -> SimulatorList {
    let known: HashSet<String> = json
        .iter()
        .flat_map(|r| r.devices.iter().map(|d| d.udid.clone()))
        .collect();
    let mut runtimes = json;

    for text_runtime in text {
        let extra: Vec<SimulatorDevice> = text_runtime
            .devices
            .into_iter()
            .filter(|d| !known.contains(&d.udid))
            .collect();

        match runtimes.iter_mut().find(|r| r.name == text_runtime.name) {
            Some(existing) => existing.devices.extend(extra),
            None => runtimes.push(SimulatorRuntime {
                name: text_runtime.name,
                devices: extra,
            }),
        }
    }

    SimulatorList { runtimes }
}

/// Parse both listings and reconcile them. A missing text listing yields the
/// JSON view alone.
pub fn parse_simulator_listings(json: &str, text: Option<&str>) -> Result<SimulatorList> {
    let json_runtimes = parse_json_listing(json)?;
    let text_runtimes = text.map(parse_text_listing).unwrap_or_default();
    Ok(reconcile(json_runtimes, text_runtimes))
}
