use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tonic::async_trait;
use tracing::warn;

use crate::constants::OP_ENDPOINT;
use crate::constants::OP_INSTANCE;
use crate::constants::OP_NETWORK_ADDRESS;
use crate::constants::OP_SERVICE;
use crate::proto::EndpointRegisterRequest;
use crate::proto::EndpointRegistration;
use crate::proto::InstanceRegisterRequest;
use crate::proto::InstanceRegistration;
use crate::proto::NetworkAddressRegisterRequest;
use crate::proto::ServiceRegisterRequest;
use crate::proto::SpanType;
use crate::time::timestamp_millis;
use crate::InstanceProperties;
use crate::RegisterError;
use crate::RegisterTransport;
use crate::Result;

/// A key one of the agent dictionaries can resolve through the backend.
///
/// Each key kind knows the register operation that resolves it and how to map
/// that operation's response back onto keys.
#[async_trait]
pub trait DictionaryKey: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Register operation name, used for logs and metric labels
    const OPERATION: &'static str;

    /// Keys with an empty name are never sent to the backend
    fn is_registrable(&self) -> bool;

    /// Sends `keys` as one batch and returns the `(key, id)` pairs found in the
    /// response. Keys the backend left out are simply absent.
    async fn register<T>(
        transport: &T,
        keys: Vec<Self>,
    ) -> Result<Vec<(Self, i32)>>
    where
        T: RegisterTransport + ?Sized;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    pub service_name: String,
}

impl ServiceKey {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }
}

#[async_trait]
impl DictionaryKey for ServiceKey {
    const OPERATION: &'static str = OP_SERVICE;

    fn is_registrable(&self) -> bool {
        !self.service_name.is_empty()
    }

    async fn register<T>(
        transport: &T,
        keys: Vec<Self>,
    ) -> Result<Vec<(Self, i32)>>
    where
        T: RegisterTransport + ?Sized,
    {
        let req = ServiceRegisterRequest {
            service_names: keys.into_iter().map(|k| k.service_name).collect(),
        };
        let response = transport.register_services(req).await?;
        Ok(response
            .services
            .into_iter()
            .map(|m| (ServiceKey::new(m.service_name), m.service_id))
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceKey {
    pub service_id: i32,
    pub instance_uuid: String,
}

impl InstanceKey {
    pub fn new(
        service_id: i32,
        instance_uuid: impl Into<String>,
    ) -> Self {
        Self {
            service_id,
            instance_uuid: instance_uuid.into(),
        }
    }
}

#[async_trait]
impl DictionaryKey for InstanceKey {
    const OPERATION: &'static str = OP_INSTANCE;

    fn is_registrable(&self) -> bool {
        !self.instance_uuid.is_empty()
    }

    /// Instances resolved through the dictionary carry no properties, only the
    /// agent's own registration reports them.
    async fn register<T>(
        transport: &T,
        keys: Vec<Self>,
    ) -> Result<Vec<(Self, i32)>>
    where
        T: RegisterTransport + ?Sized,
    {
        let now = timestamp_millis();
        let properties = InstanceProperties::default().to_json()?;
        let req = InstanceRegisterRequest {
            instances: keys
                .iter()
                .map(|k| InstanceRegistration {
                    service_id: k.service_id,
                    instance_uuid: k.instance_uuid.clone(),
                    register_time: now,
                    instance_properties: properties.clone(),
                })
                .collect(),
        };

        // The response only echoes the uuid
        let mut by_uuid: HashMap<String, InstanceKey> = HashMap::with_capacity(keys.len());
        for k in keys {
            by_uuid.entry(k.instance_uuid.clone()).or_insert(k);
        }

        let response = transport.register_instances(req).await?;
        response
            .instances
            .into_iter()
            .map(|m| match by_uuid.get(&m.instance_uuid) {
                Some(k) => Ok((k.clone(), m.instance_id)),
                None => {
                    warn!("backend returned unrequested instance uuid {}", m.instance_uuid);
                    Err(RegisterError::MalformedResponse {
                        operation: OP_INSTANCE,
                        reason: format!("unrequested instance uuid {}", m.instance_uuid),
                    }
                    .into())
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkAddressKey {
    pub address: String,
}

impl NetworkAddressKey {
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: address.into() }
    }
}

#[async_trait]
impl DictionaryKey for NetworkAddressKey {
    const OPERATION: &'static str = OP_NETWORK_ADDRESS;

    fn is_registrable(&self) -> bool {
        !self.address.is_empty()
    }

    async fn register<T>(
        transport: &T,
        keys: Vec<Self>,
    ) -> Result<Vec<(Self, i32)>>
    where
        T: RegisterTransport + ?Sized,
    {
        let req = NetworkAddressRegisterRequest {
            addresses: keys.into_iter().map(|k| k.address).collect(),
        };
        let response = transport.register_network_addresses(req).await?;
        Ok(response
            .addresses
            .into_iter()
            .map(|m| (NetworkAddressKey::new(m.network_address), m.network_address_id))
            .collect())
    }
}

/// Endpoint of a service, qualified by the direction it was observed in.
///
/// `is_entry` and `is_exit` are mutually exclusive; both false means the
/// direction is not known. All four fields take part in equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointKey {
    pub service_id: i32,
    pub endpoint_name: String,
    pub is_entry: bool,
    pub is_exit: bool,
}

impl EndpointKey {
    pub fn new(
        service_id: i32,
        endpoint_name: impl Into<String>,
        is_entry: bool,
        is_exit: bool,
    ) -> Self {
        Self {
            service_id,
            endpoint_name: endpoint_name.into(),
            is_entry,
            is_exit,
        }
    }

    pub fn from_span_type(
        service_id: i32,
        endpoint_name: impl Into<String>,
        span_type: SpanType,
    ) -> Self {
        let (is_entry, is_exit) = match span_type {
            SpanType::Entry => (true, false),
            SpanType::Exit => (false, true),
            SpanType::Unrecognized => (false, false),
        };
        Self::new(service_id, endpoint_name, is_entry, is_exit)
    }

    pub fn span_type(&self) -> SpanType {
        if self.is_entry {
            SpanType::Entry
        } else if self.is_exit {
            SpanType::Exit
        } else {
            SpanType::Unrecognized
        }
    }
}

#[async_trait]
impl DictionaryKey for EndpointKey {
    const OPERATION: &'static str = OP_ENDPOINT;

    /// An endpoint observed as both entry and exit has no single span type
    fn is_registrable(&self) -> bool {
        !self.endpoint_name.is_empty() && !(self.is_entry && self.is_exit)
    }

    async fn register<T>(
        transport: &T,
        keys: Vec<Self>,
    ) -> Result<Vec<(Self, i32)>>
    where
        T: RegisterTransport + ?Sized,
    {
        let req = EndpointRegisterRequest {
            endpoints: keys
                .into_iter()
                .map(|k| EndpointRegistration {
                    service_id: k.service_id,
                    span_type: k.span_type() as i32,
                    endpoint_name: k.endpoint_name,
                })
                .collect(),
        };
        let response = transport.register_endpoints(req).await?;
        Ok(response
            .endpoints
            .into_iter()
            .map(|m| {
                let span_type = SpanType::from_wire(m.span_type);
                (
                    EndpointKey::from_span_type(m.service_id, m.endpoint_name, span_type),
                    m.endpoint_id,
                )
            })
            .collect())
    }
}
