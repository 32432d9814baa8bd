//! gRPC implementation of the registration protocol.
//!
//! The agent side talks through [`GrpcTransport`]; the backend side serves
//! [`RegisterRpcHandler`] with [`start_rpc_server`].

mod grpc_register_service;
mod grpc_transport;
pub use grpc_register_service::*;
pub use grpc_transport::*;


//-------------------------------------------------------------------------------
// Start RPC Server
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::codec::CompressionEncoding;
use tonic_health::server::health_reporter;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::proto::instance_ping_service_server::InstancePingServiceServer;
use crate::proto::register_service_server::RegisterServiceServer;
use crate::RegisterConfig;
use crate::RegistrationService;
use crate::Result;
use crate::SystemError;

/// Binds `backend.listen_address` and serves the registration services until
/// the shutdown signal fires.
pub async fn start_rpc_server(
    service: Arc<RegistrationService>,
    config: &RegisterConfig,
    shutdown_signal: watch::Receiver<()>,
) -> Result<()> {
    let listen_address = config.backend.socket_addr()?;
    let listener = TcpListener::bind(listen_address).await.map_err(|e| {
        error!("failed to bind rpc listener on {}: {:?}", listen_address, e);
        SystemError::Io(e)
    })?;
    info!("registration rpc server listening on {}", listen_address);

    serve_rpc(service, listener, config, shutdown_signal).await
}

/// Serves the registration services on an already bound listener.
pub async fn serve_rpc(
    service: Arc<RegistrationService>,
    listener: TcpListener,
    config: &RegisterConfig,
    mut shutdown_signal: watch::Receiver<()>,
) -> Result<()> {
    let handler = Arc::new(RegisterRpcHandler::new(service));

    // Create a HealthReporter to manage the health status
    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_serving::<RegisterServiceServer<RegisterRpcHandler>>()
        .await;
    health_reporter
        .set_serving::<InstancePingServiceServer<RegisterRpcHandler>>()
        .await;

    let conn = &config.network.connection;
    let mut server_builder = tonic::transport::Server::builder()
        .concurrency_limit_per_connection(conn.concurrency_limit)
        .tcp_keepalive(Some(Duration::from_secs(conn.tcp_keepalive_in_secs)))
        .http2_keepalive_interval(Some(Duration::from_secs(conn.http2_keep_alive_interval_in_secs)))
        .http2_keepalive_timeout(Some(Duration::from_secs(conn.http2_keep_alive_timeout_in_secs)))
        .tcp_nodelay(config.network.tcp_nodelay);

    let mut register_server = RegisterServiceServer::from_arc(handler.clone());
    let mut ping_server = InstancePingServiceServer::from_arc(handler);
    if config.network.enable_compression {
        register_server = register_server
            .accept_compressed(CompressionEncoding::Gzip)
            .send_compressed(CompressionEncoding::Gzip);
        ping_server = ping_server
            .accept_compressed(CompressionEncoding::Gzip)
            .send_compressed(CompressionEncoding::Gzip);
    }

    let local_addr = listener.local_addr().ok();
    if let Err(e) = server_builder
        .add_service(health_service)
        .add_service(register_server)
        .add_service(ping_server)
        .serve_with_incoming_shutdown(
            TcpListenerStream::new(listener),
            shutdown_signal.changed().map(move |_s| {
                warn!("Stopping RPC server. {:?}", local_addr);
            }),
        )
        .await
    {
        error!("error to start registration rpc server :{:?}.", e);
        return Err(SystemError::ServerUnavailable.into());
    }
    debug!("rpc service finished!");
    Ok(())
}
