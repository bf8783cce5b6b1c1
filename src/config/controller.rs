use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Supervisor and worker pool parameters
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ControllerConfig {
    /// Number of concurrent reconciliation workers draining the queue
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Window for the initial mirror sync before startup is aborted (ms)
    #[serde(default = "default_initial_sync_timeout_ms")]
    pub initial_sync_timeout_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            initial_sync_timeout_ms: default_initial_sync_timeout_ms(),
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(Error::Config(ConfigError::Message(
                "worker_count must be greater than 0".into(),
            )));
        }

        if self.initial_sync_timeout_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "initial_sync_timeout_ms must be at least 1ms".into(),
            )));
        }

        Ok(())
    }
}

fn default_worker_count() -> usize {
    2
}
// in ms
fn default_initial_sync_timeout_ms() -> u64 {
    30_000
}
