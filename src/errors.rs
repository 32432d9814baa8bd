//! Registration Protocol Error Hierarchy
//!
//! Errors are grouped by the layer that produced them. Nothing in here is ever
//! surfaced to the tracing hot path: dictionary lookups are infallible and the
//! periodic register task logs and swallows every error of a failed tick.

use std::time::Duration;

use config::ConfigError;
use tokio::task::JoinError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Infrastructure-level failures (network, serialization)
    #[error(transparent)]
    System(#[from] SystemError),

    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Registration protocol violations
    #[error(transparent)]
    Register(#[from] RegisterError),
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Property bags and command batches travel as JSON strings
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The gRPC server could not be started or stopped abnormally
    #[error("Server unavailable")]
    ServerUnavailable,

    #[error("Failed to send shutdown signal: {0}")]
    SignalSenderClosed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Endpoint unavailable (HTTP 503 equivalent)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Retry policy exhaustion
    #[error("Retry timeout after {0:?}")]
    RetryTimeoutError(Duration),

    /// No backend address configured for the agent
    #[error("No backend address configured for {request_type}")]
    EmptyBackendList { request_type: &'static str },

    /// Malformed backend addresses
    #[error("Invalid URI format: {0}")]
    InvalidURI(String),

    /// gRPC status code errors
    #[error(transparent)]
    TonicStatusError(#[from] Box<tonic::Status>),

    #[error("Background task failed: {0}")]
    TaskFailed(#[from] JoinError),

    #[error("{0}")]
    TaskBackoffFailed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    /// A response could not be mapped back onto the request that produced it
    #[error("Malformed {operation} response: {reason}")]
    MalformedResponse { operation: &'static str, reason: String },
}

impl From<NetworkError> for Error {
    fn from(e: NetworkError) -> Self {
        Error::System(SystemError::Network(e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::System(SystemError::Serialization(e))
    }
}

impl From<tonic::Status> for Error {
    fn from(status: tonic::Status) -> Self {
        NetworkError::TonicStatusError(Box::new(status)).into()
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::System(SystemError::Io(e))
    }
}
