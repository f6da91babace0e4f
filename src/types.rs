use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Target platform for a build, test or listing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Platform {
    #[serde(rename = "iOS")]
    Ios,
    #[serde(rename = "iOS Simulator")]
    IosSimulator,
    #[serde(rename = "watchOS")]
    WatchOs,
    #[serde(rename = "watchOS Simulator")]
    WatchOsSimulator,
    #[serde(rename = "tvOS")]
    TvOs,
    #[serde(rename = "tvOS Simulator")]
    TvOsSimulator,
    #[serde(rename = "visionOS")]
    VisionOs,
    #[serde(rename = "visionOS Simulator")]
    VisionOsSimulator,
    #[serde(rename = "macOS")]
    MacOs,
}

impl Platform {
    pub const ALL: [Platform; 9] = [
        Platform::Ios,
        Platform::IosSimulator,
        Platform::WatchOs,
        Platform::WatchOsSimulator,
        Platform::TvOs,
        Platform::TvOsSimulator,
        Platform::VisionOs,
        Platform::VisionOsSimulator,
        Platform::MacOs,
    ];

    /// The platform name exactly as the build tool spells it in a
    /// destination selector.
    pub fn as_destination_str(self) -> &'static str {
        match self {
            Platform::Ios => "iOS",
            Platform::IosSimulator => "iOS Simulator",
            Platform::WatchOs => "watchOS",
            Platform::WatchOsSimulator => "watchOS Simulator",
            Platform::TvOs => "tvOS",
            Platform::TvOsSimulator => "tvOS Simulator",
            Platform::VisionOs => "visionOS",
            Platform::VisionOsSimulator => "visionOS Simulator",
            Platform::MacOs => "macOS",
        }
    }

    pub fn is_simulator(self) -> bool {
        matches!(
            self,
            Platform::IosSimulator
                | Platform::WatchOsSimulator
                | Platform::TvOsSimulator
                | Platform::VisionOsSimulator
        )
    }

    /// Physical-device platforms (everything that is neither a simulator nor macOS).
    pub fn is_device(self) -> bool {
        !self.is_simulator() && self != Platform::MacOs
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_destination_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        match normalized.as_str() {
            "ios" => Ok(Platform::Ios),
            "iossimulator" => Ok(Platform::IosSimulator),
            "watchos" => Ok(Platform::WatchOs),
            "watchossimulator" => Ok(Platform::WatchOsSimulator),
            "tvos" => Ok(Platform::TvOs),
            "tvossimulator" => Ok(Platform::TvOsSimulator),
            "visionos" => Ok(Platform::VisionOs),
            "visionossimulator" => Ok(Platform::VisionOsSimulator),
            "macos" => Ok(Platform::MacOs),
            other => Err(format!("invalid platform: {other}")),
        }
    }
}

/// Action keyword passed to the build tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildAction {
    Build,
    Test,
    Clean,
    ShowBuildSettings,
    List,
}

impl BuildAction {
    pub fn as_arg(self) -> &'static str {
        match self {
            BuildAction::Build => "build",
            BuildAction::Test => "test",
            BuildAction::Clean => "clean",
            BuildAction::ShowBuildSettings => "-showBuildSettings",
            BuildAction::List => "-list",
        }
    }
}

impl fmt::Display for BuildAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg().trim_start_matches('-'))
    }
}

/// Which build backend the caller would like to try first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendPreference {
    /// Always use the conventional build tool.
    #[default]
    Conventional,
    /// Try the fast incremental backend first, falling back to the
    /// conventional tool.
    Incremental,
}

impl FromStr for BackendPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conventional" => Ok(BackendPreference::Conventional),
            "incremental" => Ok(BackendPreference::Incremental),
            other => Err(format!(
                "invalid backend preference: {other} (expected \"conventional\" or \"incremental\")"
            )),
        }
    }
}
