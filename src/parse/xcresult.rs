// src/parse/xcresult.rs

//! Structured test-result summary, as printed by
//! `xcrun xcresulttool get test-results summary --path <bundle>`.
//!
//! Every field is optional in the input. Rendering never drops a section; a
//! missing value is printed as `Unknown`, `0` or `none`.

use std::fmt;

use serde::Deserialize;

use crate::errors::{Result, XcpilotError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestSummary {
    pub title: Option<String>,
    pub result: Option<String>,
    pub total_test_count: Option<u64>,
    pub passed_tests: Option<u64>,
    pub failed_tests: Option<u64>,
    pub skipped_tests: Option<u64>,
    pub expected_failures: Option<u64>,
    pub environment_description: Option<String>,
    pub devices_and_configurations: Vec<DeviceConfiguration>,
    pub test_failures: Vec<TestFailure>,
    pub top_insights: Vec<Insight>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceConfiguration {
    pub device: Option<DeviceInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceInfo {
    pub device_name: Option<String>,
    pub platform: Option<String>,
    pub os_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestFailure {
    pub test_name: Option<String>,
    pub target_name: Option<String>,
    pub failure_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Insight {
    pub impact: Option<String>,
    pub text: Option<String>,
    pub associated_test_identifiers: Vec<String>,
}

pub fn parse_test_summary(json: &str) -> Result<TestSummary> {
    serde_json::from_str(json)
        .map_err(|e| XcpilotError::parse("test result summary", e.to_string()))
}

const UNKNOWN: &str = "Unknown";

fn or_unknown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(UNKNOWN)
}

impl fmt::Display for TestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Test Summary: {}", or_unknown(&self.title))?;
        writeln!(f, "Overall Result: {}", or_unknown(&self.result))?;
        writeln!(f)?;

        writeln!(f, "Test Counts:")?;
        writeln!(f, "  Total: {}", self.total_test_count.unwrap_or(0))?;
        writeln!(f, "  Passed: {}", self.passed_tests.unwrap_or(0))?;
        writeln!(f, "  Failed: {}", self.failed_tests.unwrap_or(0))?;
        writeln!(f, "  Skipped: {}", self.skipped_tests.unwrap_or(0))?;
        writeln!(f, "  Expected Failures: {}", self.expected_failures.unwrap_or(0))?;

        writeln!(f)?;
        writeln!(
            f,
            "Environment: {}",
            or_unknown(&self.environment_description)
        )?;

        writeln!(f)?;
        let devices: Vec<&DeviceInfo> = self
            .devices_and_configurations
            .iter()
            .filter_map(|c| c.device.as_ref())
            .collect();
        if devices.is_empty() {
            writeln!(f, "Device: {UNKNOWN}")?;
        }
        for device in devices {
            writeln!(
                f,
                "Device: {} ({} {})",
                or_unknown(&device.device_name),
                or_unknown(&device.platform),
                or_unknown(&device.os_version)
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Test Failures:")?;
        if self.test_failures.is_empty() {
            writeln!(f, "  none")?;
        } else {
            for (i, failure) in self.test_failures.iter().enumerate() {
                writeln!(
                    f,
                    "  {}. {} ({})",
                    i + 1,
                    or_unknown(&failure.test_name),
                    or_unknown(&failure.target_name)
                )?;
                writeln!(f, "     {}", or_unknown(&failure.failure_text))?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Insights:")?;
        if self.top_insights.is_empty() {
            writeln!(f, "  none")?;
        } else {
            for (i, insight) in self.top_insights.iter().enumerate() {
                writeln!(
                    f,
                    "  {}. [{}] {} ({} tests)",
                    i + 1,
                    or_unknown(&insight.impact),
                    or_unknown(&insight.text),
                    insight.associated_test_identifiers.len()
                )?;
            }
        }

        Ok(())
    }
}
