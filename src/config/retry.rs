use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Basic retry policy template
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default)]
pub struct BackoffPolicy {
    /// Maximum number of attempts within one call
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Single operation timeout (unit: milliseconds)
    #[serde(default = "default_op_timeout_ms")]
    pub timeout_ms: u64,

    /// Backoff base (unit: milliseconds)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Maximum backoff time (unit: milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

/// Divide strategies by RPC kind.
///
/// Retries here are short and bounded: a call that still fails ends the
/// current register tick and the next scheduled tick tries again.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RetryPolicies {
    /// Service, instance, endpoint and network address registration
    #[serde(default = "default_register_policy")]
    pub register: BackoffPolicy,

    /// Instance ping
    #[serde(default = "default_heartbeat_policy")]
    pub heartbeat: BackoffPolicy,
}

impl Default for RetryPolicies {
    fn default() -> Self {
        Self {
            register: default_register_policy(),
            heartbeat: default_heartbeat_policy(),
        }
    }
}

impl RetryPolicies {
    pub fn validate(&self) -> Result<()> {
        self.register.validate("register")?;
        self.heartbeat.validate("heartbeat")?;
        Ok(())
    }
}

impl BackoffPolicy {
    pub(crate) fn validate(
        &self,
        policy_name: &str,
    ) -> Result<()> {
        if self.max_retries == 0 {
            return Err(Error::Config(ConfigError::Message(format!(
                "{policy_name} policy max_retries must be at least 1"
            ))));
        }
        if self.timeout_ms == 0 {
            return Err(Error::Config(ConfigError::Message(format!(
                "{policy_name} policy timeout_ms must be greater than 0"
            ))));
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "{} policy base_delay_ms {} exceeds max_delay_ms {}",
                policy_name, self.base_delay_ms, self.max_delay_ms
            ))));
        }
        Ok(())
    }
}

fn default_register_policy() -> BackoffPolicy {
    BackoffPolicy {
        max_retries: 3,
        timeout_ms: 3000,
        base_delay_ms: 100,
        max_delay_ms: 1000,
    }
}
fn default_heartbeat_policy() -> BackoffPolicy {
    BackoffPolicy {
        max_retries: 2,
        timeout_ms: 1000,
        base_delay_ms: 100,
        max_delay_ms: 500,
    }
}
fn default_max_retries() -> usize {
    3
}
fn default_op_timeout_ms() -> u64 {
    100
}
fn default_base_delay_ms() -> u64 {
    50
}
fn default_max_delay_ms() -> u64 {
    1000
}
