//! Configuration management for the expiration controller.
//!
//! Provides layered configuration loading with priority:
//! 1. Default values (hardcoded)
//! 2. Optional config file (TOML)
//! 3. Environment variables (highest priority, prefix `VIGIL`)
//!

mod controller;
mod monitoring;
mod retry;
mod sync;
pub use controller::*;
pub use monitoring::*;
pub use retry::*;
pub use sync::*;


//---
use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::Result;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    /// Supervisor and worker pool parameters
    #[serde(default)]
    pub controller: ControllerConfig,
    /// Mirror synchronization parameters
    #[serde(default)]
    pub sync: SyncConfig,
    /// Metrics endpoint settings
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    /// Retry policies for sync and reconciliation
    #[serde(default)]
    pub retry: RetryPolicies,
}

impl Settings {
    /// Load configuration with priority: defaults, then the optional file,
    /// then `VIGIL__`-prefixed environment variables.
    ///
    /// # Arguments
    /// * `path` - Optional path to a TOML config file (required when given)
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(p) = path {
            builder = builder.add_source(File::with_name(p).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("VIGIL")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates all subsystem configurations
    pub fn validate(&self) -> Result<()> {
        self.controller.validate()?;
        self.sync.validate()?;
        self.retry.validate()?;
        Ok(())
    }
}
