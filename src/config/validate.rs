// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, XcpilotError};

const STREAM_LEVELS: &[&str] = &["default", "info", "debug"];

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::XcpilotError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_tools(cfg)?;
    validate_build(cfg)?;
    validate_supervisor(cfg)?;
    validate_log_capture(cfg)?;
    Ok(())
}

fn validate_tools(cfg: &RawConfigFile) -> Result<()> {
    let tools = &cfg.tools;
    let entries = [
        ("xcodebuild", &tools.xcodebuild),
        ("xcrun", &tools.xcrun),
        ("swift", &tools.swift),
        ("axe", &tools.axe),
        ("xcodemake", &tools.xcodemake),
        ("make", &tools.make),
    ];
    for (key, value) in entries {
        if value.trim().is_empty() {
            return Err(XcpilotError::ConfigError(format!(
                "[tools].{key} must not be empty"
            )));
        }
    }
    Ok(())
}

fn validate_build(cfg: &RawConfigFile) -> Result<()> {
    if cfg.build.default_configuration.trim().is_empty() {
        return Err(XcpilotError::ConfigError(
            "[build].default_configuration must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_supervisor(cfg: &RawConfigFile) -> Result<()> {
    if cfg.supervisor.grace_ms == 0 {
        return Err(XcpilotError::ConfigError(
            "[supervisor].grace_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_log_capture(cfg: &RawConfigFile) -> Result<()> {
    let section = &cfg.log_capture;

    if let Some(dir) = &section.log_dir {
        if dir.as_os_str().is_empty() {
            return Err(XcpilotError::ConfigError(
                "[log_capture].log_dir must not be empty when set".to_string(),
            ));
        }
    }

    if section.ui_framework_subsystem.trim().is_empty() {
        return Err(XcpilotError::ConfigError(
            "[log_capture].ui_framework_subsystem must not be empty".to_string(),
        ));
    }

    if !STREAM_LEVELS.contains(&section.level.as_str()) {
        return Err(XcpilotError::ConfigError(format!(
            "[log_capture].level must be one of {STREAM_LEVELS:?} (got '{}')",
            section.level
        )));
    }

    Ok(())
}
