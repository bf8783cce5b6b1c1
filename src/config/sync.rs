use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Mirror synchronization parameters
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SyncConfig {
    /// Interval between synthetic full re-deliveries of the cached set (ms).
    /// Guards against missed incremental watch notifications.
    #[serde(default = "default_resync_interval_ms")]
    pub resync_interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            resync_interval_ms: default_resync_interval_ms(),
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<()> {
        if self.resync_interval_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "resync_interval_ms must be at least 1ms".into(),
            )));
        }

        Ok(())
    }
}

// in ms
fn default_resync_interval_ms() -> u64 {
    30_000
}
