//! Agent side of the registration protocol.
//!
//! One [`GrpcTransport`] is shared by the register task and every dictionary
//! of the process. It owns one lazily connected channel per backend address
//! and spreads requests over them at random.

use std::sync::Arc;
use std::time::Duration;

use autometrics::autometrics;
use rand::Rng;
use tonic::async_trait;
use tonic::codec::CompressionEncoding;
use tonic::transport::Channel;
use tonic::transport::Endpoint;
use tracing::debug;
use tracing::warn;

use crate::proto::instance_ping_service_client::InstancePingServiceClient;
use crate::proto::register_service_client::RegisterServiceClient;
use crate::proto::EndpointRegisterRequest;
use crate::proto::EndpointRegisterResponse;
use crate::proto::InstancePingRequest;
use crate::proto::InstancePingResponse;
use crate::proto::InstanceRegisterRequest;
use crate::proto::InstanceRegisterResponse;
use crate::proto::NetworkAddressRegisterRequest;
use crate::proto::NetworkAddressRegisterResponse;
use crate::proto::ServiceRegisterRequest;
use crate::proto::ServiceRegisterResponse;
use crate::task_with_timeout_and_exponential_backoff;
use crate::NetworkConfig;
use crate::NetworkError;
use crate::RegisterTransport;
use crate::Result;
use crate::RetryPolicies;
use crate::API_SLO;

#[derive(Debug, Clone)]
pub(crate) struct BackendChannel {
    pub(crate) address: String,
    pub(crate) channel: Channel,
}

#[derive(Debug, Clone)]
pub struct GrpcTransport {
    backends: Arc<Vec<BackendChannel>>,
    retry: RetryPolicies,
    enable_compression: bool,
}

impl GrpcTransport {
    /// Prepares one channel per backend address.
    ///
    /// Channels connect on first use, so an unreachable backend does not fail
    /// here. Must be called from within a tokio runtime.
    pub fn new(
        backend_addresses: &[String],
        network: &NetworkConfig,
        retry: RetryPolicies,
    ) -> Result<Self> {
        let backends = backend_addresses
            .iter()
            .map(|address| {
                let endpoint = create_endpoint(address, network)?;
                Ok(BackendChannel {
                    address: address.clone(),
                    channel: endpoint.connect_lazy(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            backends: Arc::new(backends),
            retry,
            enable_compression: network.enable_compression,
        })
    }

    pub fn backend_addresses(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.address.clone()).collect()
    }

    /// Random choice between all configured backends
    pub(crate) fn pick(
        &self,
        request_type: &'static str,
    ) -> Result<&BackendChannel> {
        if self.backends.is_empty() {
            warn!("no backend configured for {}", request_type);
            return Err(NetworkError::EmptyBackendList { request_type }.into());
        }
        let idx = rand::thread_rng().gen_range(0..self.backends.len());
        let backend = &self.backends[idx];
        debug!("{} -> {}", request_type, backend.address);
        Ok(backend)
    }

    fn register_client(
        &self,
        request_type: &'static str,
    ) -> Result<RegisterServiceClient<Channel>> {
        let channel = self.pick(request_type)?.channel.clone();
        let client = RegisterServiceClient::new(channel);
        Ok(if self.enable_compression {
            client
                .send_compressed(CompressionEncoding::Gzip)
                .accept_compressed(CompressionEncoding::Gzip)
        } else {
            client
        })
    }

    fn ping_client(&self) -> Result<InstancePingServiceClient<Channel>> {
        let channel = self.pick("ping")?.channel.clone();
        let client = InstancePingServiceClient::new(channel);
        Ok(if self.enable_compression {
            client
                .send_compressed(CompressionEncoding::Gzip)
                .accept_compressed(CompressionEncoding::Gzip)
        } else {
            client
        })
    }
}

/// Accepts both `host:port` and full `http://host:port` forms
pub(crate) fn create_endpoint(
    address: &str,
    network: &NetworkConfig,
) -> Result<Endpoint> {
    let uri = if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{address}")
    };
    let params = &network.connection;

    let endpoint = Endpoint::from_shared(uri)
        .map_err(|e| NetworkError::InvalidURI(format!("{address}: {e}")))?
        .connect_timeout(Duration::from_millis(params.connect_timeout_in_ms))
        .timeout(Duration::from_millis(params.request_timeout_in_ms))
        .tcp_keepalive(Some(Duration::from_secs(params.tcp_keepalive_in_secs)))
        .tcp_nodelay(network.tcp_nodelay)
        .http2_keep_alive_interval(Duration::from_secs(params.http2_keep_alive_interval_in_secs))
        .keep_alive_timeout(Duration::from_secs(params.http2_keep_alive_timeout_in_secs));
    Ok(endpoint)
}

#[async_trait]
impl RegisterTransport for GrpcTransport {
    #[autometrics(objective = API_SLO)]
    async fn register_services(
        &self,
        req: ServiceRegisterRequest,
    ) -> Result<ServiceRegisterResponse> {
        debug!("register services: {:?}", req.service_names);
        let client = self.register_client("register_services")?;
        let closure = move || {
            let mut client = client.clone();
            let req = req.clone();
            async move { client.register_services(tonic::Request::new(req)).await }
        };
        let response = task_with_timeout_and_exponential_backoff(closure, self.retry.register).await?;
        Ok(response.into_inner())
    }

    #[autometrics(objective = API_SLO)]
    async fn register_instances(
        &self,
        req: InstanceRegisterRequest,
    ) -> Result<InstanceRegisterResponse> {
        debug!("register {} instance(s)", req.instances.len());
        let client = self.register_client("register_instances")?;
        let closure = move || {
            let mut client = client.clone();
            let req = req.clone();
            async move { client.register_instances(tonic::Request::new(req)).await }
        };
        let response = task_with_timeout_and_exponential_backoff(closure, self.retry.register).await?;
        Ok(response.into_inner())
    }

    #[autometrics(objective = API_SLO)]
    async fn ping(
        &self,
        req: InstancePingRequest,
    ) -> Result<InstancePingResponse> {
        debug!("ping instance {}", req.instance_id);
        let client = self.ping_client()?;
        let closure = move || {
            let mut client = client.clone();
            let req = req.clone();
            async move { client.ping(tonic::Request::new(req)).await }
        };
        let response = task_with_timeout_and_exponential_backoff(closure, self.retry.heartbeat).await?;
        Ok(response.into_inner())
    }

    #[autometrics(objective = API_SLO)]
    async fn register_endpoints(
        &self,
        req: EndpointRegisterRequest,
    ) -> Result<EndpointRegisterResponse> {
        debug!("register {} endpoint(s)", req.endpoints.len());
        let client = self.register_client("register_endpoints")?;
        let closure = move || {
            let mut client = client.clone();
            let req = req.clone();
            async move { client.register_endpoints(tonic::Request::new(req)).await }
        };
        let response = task_with_timeout_and_exponential_backoff(closure, self.retry.register).await?;
        Ok(response.into_inner())
    }

    #[autometrics(objective = API_SLO)]
    async fn register_network_addresses(
        &self,
        req: NetworkAddressRegisterRequest,
    ) -> Result<NetworkAddressRegisterResponse> {
        debug!("register {} network address(es)", req.addresses.len());
        let client = self.register_client("register_network_addresses")?;
        let closure = move || {
            let mut client = client.clone();
            let req = req.clone();
            async move { client.register_network_addresses(tonic::Request::new(req)).await }
        };
        let response = task_with_timeout_and_exponential_backoff(closure, self.retry.register).await?;
        Ok(response.into_inner())
    }
}
