use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Basic retry policy template
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct BackoffPolicy {
    /// Number of silent retries before each further failure logs a
    /// standing warning (0 means every retry is logged)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Backoff base (unit: milliseconds)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Maximum backoff time (unit: milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl BackoffPolicy {
    /// Delay before retry number `attempt` (1-based):
    /// `min(base * 2^(attempt-1), max)`, saturating.
    pub fn delay_for(
        &self,
        attempt: u32,
    ) -> Duration {
        let attempt = attempt.max(1);
        let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
        let delay_ms = self
            .base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_delay_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "base_delay_ms must be at least 1ms".into(),
            )));
        }

        if self.max_delay_ms < self.base_delay_ms {
            return Err(Error::Config(ConfigError::Message(
                "max_delay_ms must not be smaller than base_delay_ms".into(),
            )));
        }

        Ok(())
    }
}

/// Divide strategies by business domain
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RetryPolicies {
    // Per-key reconciliation retries (failed emit)
    #[serde(default)]
    pub reconcile: BackoffPolicy,

    // Initial list/watch establishment and post-sync reconnects
    #[serde(default = "default_sync_policy")]
    pub sync: BackoffPolicy,
}

impl Default for RetryPolicies {
    fn default() -> Self {
        Self {
            reconcile: BackoffPolicy::default(),
            sync: default_sync_policy(),
        }
    }
}

impl RetryPolicies {
    pub fn validate(&self) -> Result<()> {
        self.reconcile.validate()?;
        self.sync.validate()?;
        Ok(())
    }
}

fn default_sync_policy() -> BackoffPolicy {
    BackoffPolicy {
        max_retries: 5,
        base_delay_ms: 500,
        max_delay_ms: 30_000,
    }
}

fn default_max_retries() -> usize {
    5
}
fn default_base_delay_ms() -> u64 {
    10
}
fn default_max_delay_ms() -> u64 {
    30_000
}
