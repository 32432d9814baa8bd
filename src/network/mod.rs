//! Registration transport: the request/response channel between agents and
//! the backend.
//!
//! [`RegisterTransport`] is the seam every agent-side component talks
//! through. The production implementation is [`grpc::GrpcTransport`]; unit
//! tests use the generated `MockRegisterTransport`. All retries are bounded by
//! a [`BackoffPolicy`] so that a failing backend ends the current register
//! tick instead of stalling it.
pub mod grpc;

#[cfg(test)]
use mockall::automock;
use tonic::async_trait;

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
use crate::BackoffPolicy;
use crate::NetworkError;
use crate::Result;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait RegisterTransport: Send + Sync + 'static {
    /// Resolves service names to service ids.
    ///
    /// The response may hold fewer mappings than requested names; missing
    /// names are simply not resolved yet.
    async fn register_services(
        &self,
        req: ServiceRegisterRequest,
    ) -> Result<ServiceRegisterResponse>;

    /// Registers service instances, keyed by `(service_id, instance_uuid)`.
    async fn register_instances(
        &self,
        req: InstanceRegisterRequest,
    ) -> Result<InstanceRegisterResponse>;

    /// Heartbeat of a registered instance. The response carries a serialized
    /// command batch, possibly empty.
    async fn ping(
        &self,
        req: InstancePingRequest,
    ) -> Result<InstancePingResponse>;

    /// Registers endpoints keyed by `(service_id, endpoint_name, span_type)`.
    async fn register_endpoints(
        &self,
        req: EndpointRegisterRequest,
    ) -> Result<EndpointRegisterResponse>;

    /// Registers peer network addresses.
    async fn register_network_addresses(
        &self,
        req: NetworkAddressRegisterRequest,
    ) -> Result<NetworkAddressRegisterResponse>;
}

// Module level utils
// -----------------------------------------------------------------------------
use std::time::Duration;

use tokio::time::sleep;
use tokio::time::timeout;
use tonic::Code;
use tracing::debug;
use tracing::warn;

use crate::Error;

/// As soon as task has return we should return from this function
pub(crate) async fn task_with_timeout_and_exponential_backoff<F, T, U>(
    mut task: F,
    policy: BackoffPolicy,
) -> std::result::Result<tonic::Response<U>, Error>
where
    F: FnMut() -> T,
    T: std::future::Future<Output = std::result::Result<tonic::Response<U>, tonic::Status>> + Send + 'static,
{
    let mut retries = 0;
    let mut current_delay = Duration::from_millis(policy.base_delay_ms);
    let timeout_duration = Duration::from_millis(policy.timeout_ms);
    let max_delay = Duration::from_millis(policy.max_delay_ms);
    let max_retries = policy.max_retries.max(1);

    let mut last_error = NetworkError::TaskBackoffFailed("Task failed after max retries".to_string());
    while retries < max_retries {
        debug!("Attempt {} of {}", retries + 1, max_retries);
        match timeout(timeout_duration, task()).await {
            Ok(Ok(r)) => {
                return Ok(r);
            }
            Ok(Err(status)) => {
                last_error = match status.code() {
                    Code::Unavailable => {
                        warn!("Service unavailable: {}", status.message());
                        NetworkError::ServiceUnavailable(format!("Service unavailable: {}", status.message()))
                    }
                    _ => {
                        warn!("RPC error: {}", status);
                        NetworkError::TonicStatusError(Box::new(status))
                    }
                };
            }
            Err(_e) => {
                warn!("Task timed out after {:?}", timeout_duration);
                last_error = NetworkError::RetryTimeoutError(timeout_duration);
            }
        };

        if retries < max_retries - 1 {
            debug!("Retrying in {:?}...", current_delay);
            sleep(current_delay).await;

            // Exponential backoff (double the delay each time)
            current_delay = (current_delay * 2).min(max_delay);
        }
        retries += 1;
    }
    warn!("Task failed after {} retries", max_retries);
    Err(last_error.into())
}
