use std::sync::Arc;

use apm_register::serve_rpc;
use apm_register::Agent;
use apm_register::AgentBuilder;
use apm_register::InstanceProperties;
use apm_register::RegisterConfig;
use apm_register::RegistrationService;
use apm_register::Result;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::error;

/// A backend served on an ephemeral port of the loopback interface
pub struct Backend {
    pub service: Arc<RegistrationService>,
    pub port: u16,
    shutdown_tx: watch::Sender<()>,
}

impl Backend {
    pub async fn start() -> Result<Self> {
        let service = Arc::new(RegistrationService::new());
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();

        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let s = service.clone();
        tokio::spawn(async move {
            let config = RegisterConfig::default();
            if let Err(e) = serve_rpc(s, listener, &config, shutdown_rx).await {
                error!("backend stopped: {:?}", e);
            }
        });

        Ok(Self {
            service,
            port,
            shutdown_tx,
        })
    }

    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

pub fn agent_config(
    service_name: &str,
    port: u16,
    endpoint_buffer_size: usize,
) -> RegisterConfig {
    let mut config = RegisterConfig::default();
    config.agent.service_name = service_name.to_string();
    config.agent.backend_addresses = vec![format!("127.0.0.1:{port}")];
    config.dictionary.endpoint_name_buffer_size = endpoint_buffer_size;
    config.retry.register.max_retries = 1;
    config.retry.heartbeat.max_retries = 1;
    config
}

/// Agent with fixed properties, ticked by hand
pub fn build_agent(config: RegisterConfig) -> Result<Agent> {
    AgentBuilder::new(config)
        .properties(InstanceProperties {
            host_name: Some("web-1".to_string()),
            process_no: Some("4242".to_string()),
            ..Default::default()
        })
        .build()
}
