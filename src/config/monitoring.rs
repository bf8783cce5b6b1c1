use serde::Deserialize;
use serde::Serialize;

/// Metrics endpoint settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitoringConfig {
    /// Port the prometheus scrape endpoint binds to
    #[serde(default = "default_prometheus_port")]
    pub prometheus_port: u16,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            prometheus_port: default_prometheus_port(),
        }
    }
}

fn default_prometheus_port() -> u16 {
    9100
}
