use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::debug;
use tracing::error;

use crate::serve_rpc;
use crate::RegisterConfig;
use crate::RegistrationService;
use crate::Result;

/// A real backend on an ephemeral local port
pub struct MockBackend {
    pub service: Arc<RegistrationService>,
    pub addr: SocketAddr,
    shutdown_tx: watch::Sender<()>,
}

impl MockBackend {
    pub async fn mock_listener(service: Arc<RegistrationService>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        debug!("starting mock backend: {addr}");

        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let s = service.clone();
        tokio::spawn(async move {
            let config = RegisterConfig::default();
            if let Err(e) = serve_rpc(s, listener, &config, shutdown_rx).await {
                error!("mock backend stopped: {:?}", e);
            }
        });

        Ok(Self {
            service,
            addr,
            shutdown_tx,
        })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
