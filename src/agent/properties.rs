use std::net::IpAddr;
use std::net::ToSocketAddrs;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::constants::AGENT_LANGUAGE;
use crate::constants::HOST_NAME;
use crate::constants::IPV4;
use crate::constants::LANGUAGE;
use crate::constants::OS_NAME;
use crate::constants::PROCESS_NO;
use crate::Result;

/// One entry of the flattened property list carried on the wire
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KeyStringValuePair {
    pub key: String,
    pub value: String,
}

impl KeyStringValuePair {
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Descriptive properties an instance registers with.
///
/// Keys outside the known set are kept in `other` and travel untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceProperties {
    pub host_name: Option<String>,
    pub os_name: Option<String>,
    pub language: Option<String>,
    /// Kept as reported; some runtimes describe the process with a non-numeric id
    pub process_no: Option<String>,
    pub ipv4s: Vec<String>,
    pub other: Vec<KeyStringValuePair>,
}

impl InstanceProperties {
    /// Properties of the current process
    pub fn detect() -> Self {
        let host_name = nix::unistd::gethostname()
            .ok()
            .and_then(|h| h.into_string().ok());
        let ipv4s = host_name.as_deref().map(resolve_ipv4s).unwrap_or_default();

        Self {
            host_name,
            os_name: Some(std::env::consts::OS.to_string()),
            language: Some(AGENT_LANGUAGE.to_string()),
            process_no: Some(std::process::id().to_string()),
            ipv4s,
            other: Vec::new(),
        }
    }

    pub fn to_pairs(&self) -> Vec<KeyStringValuePair> {
        let mut pairs = Vec::new();
        if let Some(v) = &self.host_name {
            pairs.push(KeyStringValuePair::new(HOST_NAME, v));
        }
        if let Some(v) = &self.os_name {
            pairs.push(KeyStringValuePair::new(OS_NAME, v));
        }
        if let Some(v) = &self.language {
            pairs.push(KeyStringValuePair::new(LANGUAGE, v));
        }
        if let Some(v) = &self.process_no {
            pairs.push(KeyStringValuePair::new(PROCESS_NO, v));
        }
        for ip in &self.ipv4s {
            pairs.push(KeyStringValuePair::new(IPV4, ip));
        }
        pairs.extend(self.other.iter().cloned());
        pairs
    }

    /// Later duplicates of a single-valued key win.
    pub fn from_pairs(pairs: Vec<KeyStringValuePair>) -> Self {
        let mut props = Self::default();
        for pair in pairs {
            match pair.key.as_str() {
                HOST_NAME => props.host_name = Some(pair.value),
                OS_NAME => props.os_name = Some(pair.value),
                LANGUAGE => props.language = Some(pair.value),
                PROCESS_NO => props.process_no = Some(pair.value),
                IPV4 => props.ipv4s.push(pair.value),
                _ => props.other.push(pair),
            }
        }
        props
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_pairs())?)
    }

    /// An empty string is an empty property list
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let pairs: Vec<KeyStringValuePair> = serde_json::from_str(json)?;
        Ok(Self::from_pairs(pairs))
    }

    /// `service_name[-pid:P][@host]`
    pub fn display_name(
        &self,
        service_name: &str,
    ) -> String {
        let mut name = service_name.to_string();
        if let Some(pid) = &self.process_no {
            name.push_str(&format!("-pid:{pid}"));
        }
        if let Some(host) = &self.host_name {
            name.push('@');
            name.push_str(host);
        }
        name
    }
}

fn resolve_ipv4s(host_name: &str) -> Vec<String> {
    match (host_name, 0).to_socket_addrs() {
        Ok(addrs) => {
            let mut ips: Vec<String> = Vec::new();
            for addr in addrs {
                if let IpAddr::V4(ip) = addr.ip() {
                    let ip = ip.to_string();
                    if !addr.ip().is_loopback() && !ips.contains(&ip) {
                        ips.push(ip);
                    }
                }
            }
            ips
        }
        Err(e) => {
            debug!("could not resolve {}: {:?}", host_name, e);
            Vec::new()
        }
    }
}
