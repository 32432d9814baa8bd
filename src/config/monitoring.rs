use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Prometheus scrape endpoint of the register backend.
///
/// When enabled the backend binary serves `GET /metrics` with the
/// registration counters and the per-RPC autometrics histograms.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub metrics_enabled: bool,

    /// Port of the scrape endpoint, bound on all interfaces
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_port: default_metrics_port(),
        }
    }
}

impl MonitoringConfig {
    /// The scrape port must be bindable and must not collide with the
    /// register listener.
    pub fn validate(
        &self,
        register_port: u16,
    ) -> Result<()> {
        if !self.metrics_enabled {
            return Ok(());
        }
        if self.metrics_port == 0 {
            return Err(Error::Config(config::ConfigError::Message(
                "monitoring.metrics_port cannot be 0 when metrics are enabled".into(),
            )));
        }
        if self.metrics_port == register_port {
            return Err(Error::Config(config::ConfigError::Message(format!(
                "monitoring.metrics_port {} is already taken by backend.listen_address",
                self.metrics_port
            ))));
        }
        Ok(())
    }
}

fn default_metrics_port() -> u16 {
    1234
}
