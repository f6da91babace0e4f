// src/tools/simctl.rs

//! `xcrun simctl` wrapper.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{Result, XcpilotError};
use crate::exec::{CommandExecutor, CommandSpec};
use crate::parse::{parse_simulator_listings, SimulatorList};
use crate::tools::into_output;

/// Data-network indicator for a status-bar override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataNetwork {
    /// Remove every override.
    Clear,
    Hide,
    Wifi,
    ThreeG,
    FourG,
    Lte,
    LteA,
    LtePlus,
    FiveG,
    FiveGPlus,
    FiveGUwb,
    FiveGUc,
}

impl DataNetwork {
    pub fn as_str(self) -> &'static str {
        match self {
            DataNetwork::Clear => "clear",
            DataNetwork::Hide => "hide",
            DataNetwork::Wifi => "wifi",
            DataNetwork::ThreeG => "3g",
            DataNetwork::FourG => "4g",
            DataNetwork::Lte => "lte",
            DataNetwork::LteA => "lte-a",
            DataNetwork::LtePlus => "lte+",
            DataNetwork::FiveG => "5g",
            DataNetwork::FiveGPlus => "5g+",
            DataNetwork::FiveGUwb => "5g-uwb",
            DataNetwork::FiveGUc => "5g-uc",
        }
    }
}

impl fmt::Display for DataNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataNetwork {
    type Err = XcpilotError;

    fn from_str(s: &str) -> Result<Self> {
        let all = [
            DataNetwork::Clear,
            DataNetwork::Hide,
            DataNetwork::Wifi,
            DataNetwork::ThreeG,
            DataNetwork::FourG,
            DataNetwork::Lte,
            DataNetwork::LteA,
            DataNetwork::LtePlus,
            DataNetwork::FiveG,
            DataNetwork::FiveGPlus,
            DataNetwork::FiveGUwb,
            DataNetwork::FiveGUc,
        ];
        let wanted = s.trim().to_lowercase();
        all.into_iter()
            .find(|n| n.as_str() == wanted)
            .ok_or_else(|| XcpilotError::validation(format!("unknown data network '{s}'")))
    }
}

pub struct Simctl {
    executor: Arc<dyn CommandExecutor>,
    xcrun: String,
}

impl Simctl {
    pub fn new(executor: Arc<dyn CommandExecutor>, xcrun: impl Into<String>) -> Self {
        Self {
            executor,
            xcrun: xcrun.into(),
        }
    }

    fn spec<I, S>(&self, label: &str, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv = [self.xcrun.clone(), "simctl".to_string()]
            .into_iter()
            .chain(args.into_iter().map(Into::into));
        CommandSpec::new(label, argv)
    }

    /// Every simulator, JSON listing reconciled with the text listing.
    ///
    /// The text listing is best-effort; if it fails the JSON alone is used.
    pub async fn list_devices(&self) -> Result<SimulatorList> {
        let json = self
            .executor
            .run(self.spec("simctl list devices --json", ["list", "devices", "--json"]))
            .await?;
        let json = into_output(json, "Failed to list simulators")?;

        let text = match self
            .executor
            .run(self.spec("simctl list devices", ["list", "devices"]))
            .await
        {
            Ok(result) if result.success => Some(result.stdout),
            Ok(result) => {
                warn!(exit_code = ?result.exit_code, "text device listing failed, using JSON only");
                None
            }
            Err(err) => {
                warn!(error = %err, "text device listing failed, using JSON only");
                None
            }
        };

        parse_simulator_listings(&json, text.as_deref())
    }

    pub async fn screenshot(&self, simulator_id: &str, output: &Path) -> Result<PathBuf> {
        require("simulatorId", simulator_id)?;
        let result = self
            .executor
            .run(self.spec(
                "simctl screenshot",
                [
                    "io".to_string(),
                    simulator_id.to_string(),
                    "screenshot".to_string(),
                    output.display().to_string(),
                ],
            ))
            .await?;
        into_output(result, "Failed to capture screenshot")?;
        debug!(simulator = %simulator_id, path = ?output, "screenshot saved");
        Ok(output.to_path_buf())
    }

    pub async fn launch_app(
        &self,
        simulator_id: &str,
        bundle_id: &str,
        args: &[String],
    ) -> Result<String> {
        require("simulatorId", simulator_id)?;
        require("bundleId", bundle_id)?;
        let mut argv = vec![
            "launch".to_string(),
            simulator_id.to_string(),
            bundle_id.to_string(),
        ];
        argv.extend(args.iter().cloned());
        let result = self.executor.run(self.spec("simctl launch", argv)).await?;
        into_output(result, "Failed to launch app")
    }

    /// Override the data-network indicator, or clear every override.
    pub async fn set_status_bar(&self, simulator_id: &str, network: DataNetwork) -> Result<String> {
        require("simulatorId", simulator_id)?;
        let argv = match network {
            DataNetwork::Clear => vec![
                "status_bar".to_string(),
                simulator_id.to_string(),
                "clear".to_string(),
            ],
            other => vec![
                "status_bar".to_string(),
                simulator_id.to_string(),
                "override".to_string(),
                "--dataNetwork".to_string(),
                other.as_str().to_string(),
            ],
        };
        let result = self.executor.run(self.spec("simctl status_bar", argv)).await?;
        into_output(result, "Failed to set status bar")
    }

    pub async fn set_location(
        &self,
        simulator_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<String> {
        require("simulatorId", simulator_id)?;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(XcpilotError::validation(format!(
                "latitude must be between -90 and 90 (got {latitude})"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(XcpilotError::validation(format!(
                "longitude must be between -180 and 180 (got {longitude})"
            )));
        }
        let result = self
            .executor
            .run(self.spec(
                "simctl location",
                [
                    "location".to_string(),
                    simulator_id.to_string(),
                    "set".to_string(),
                    format!("{latitude},{longitude}"),
                ],
            ))
            .await?;
        into_output(result, "Failed to set location")
    }

    pub async fn clear_location(&self, simulator_id: &str) -> Result<String> {
        require("simulatorId", simulator_id)?;
        let result = self
            .executor
            .run(self.spec("simctl location", ["location", simulator_id, "clear"]))
            .await?;
        into_output(result, "Failed to clear location")
    }
}

pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(XcpilotError::validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}
