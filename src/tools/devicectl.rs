// src/tools/devicectl.rs

//! `xcrun devicectl` wrapper for physical devices.

use std::path::Path;
use std::sync::Arc;

use crate::errors::Result;
use crate::exec::{CommandExecutor, CommandSpec};
use crate::tools::into_output;
use crate::tools::simctl::require;

pub struct Devicectl {
    executor: Arc<dyn CommandExecutor>,
    xcrun: String,
}

impl Devicectl {
    pub fn new(executor: Arc<dyn CommandExecutor>, xcrun: impl Into<String>) -> Self {
        Self {
            executor,
            xcrun: xcrun.into(),
        }
    }

    pub async fn install_app(&self, device_id: &str, app_path: &Path) -> Result<String> {
        require("deviceId", device_id)?;
        let argv = vec![
            self.xcrun.clone(),
            "devicectl".to_string(),
            "device".to_string(),
            "install".to_string(),
            "app".to_string(),
            "--device".to_string(),
            device_id.to_string(),
            app_path.display().to_string(),
        ];
        let result = self
            .executor
            .run(CommandSpec::new("devicectl install", argv))
            .await?;
        into_output(result, "Failed to install app")
    }

    pub async fn terminate_process(&self, device_id: &str, pid: u32) -> Result<String> {
        require("deviceId", device_id)?;
        let argv = vec![
            self.xcrun.clone(),
            "devicectl".to_string(),
            "device".to_string(),
            "process".to_string(),
            "terminate".to_string(),
            "--device".to_string(),
            device_id.to_string(),
            "--pid".to_string(),
            pid.to_string(),
        ];
        let result = self
            .executor
            .run(CommandSpec::new("devicectl terminate", argv))
            .await?;
        into_output(result, "Failed to terminate process")
    }
}
