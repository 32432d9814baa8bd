use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Capacity of the agent-side dictionary caches.
///
/// A capacity bounds resolved plus pending entries of one dictionary. Once a
/// dictionary is full, unknown names are no longer queued for registration.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DictionaryConfig {
    /// Shared by the service, instance and network address dictionaries
    #[serde(default = "default_service_code_buffer_size")]
    pub service_code_buffer_size: usize,

    #[serde(default = "default_endpoint_name_buffer_size")]
    pub endpoint_name_buffer_size: usize,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            service_code_buffer_size: default_service_code_buffer_size(),
            endpoint_name_buffer_size: default_endpoint_name_buffer_size(),
        }
    }
}

impl DictionaryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.service_code_buffer_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "dictionary.service_code_buffer_size must be greater than 0".into(),
            )));
        }
        if self.endpoint_name_buffer_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "dictionary.endpoint_name_buffer_size must be greater than 0".into(),
            )));
        }
        Ok(())
    }
}

fn default_service_code_buffer_size() -> usize {
    10 * 10000
}
fn default_endpoint_name_buffer_size() -> usize {
    1000 * 10000
}
