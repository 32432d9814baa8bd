#[cfg(test)]
mod metrics_test;

use autometrics::prometheus_exporter::PrometheusResponse;
use autometrics::prometheus_exporter::{self};
use lazy_static::lazy_static;
use prometheus::IntCounterVec;
use prometheus::IntGaugeVec;
use prometheus::Opts;
use prometheus::Registry;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use warp::Filter;
use warp::Rejection;
use warp::Reply;

lazy_static! {
    /// Backend side: ids handed out per operation, labelled `created` or `existing`
    pub static ref REGISTRATIONS_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("registrations", "Backend get-or-create calls per operation"),
        &["operation", "outcome"]
    )
    .expect("metric can not be created");

    /// Agent side: keys resolved by dictionary syncs
    pub static ref DICTIONARY_SYNC_RESOLVED_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("dictionary_sync_resolved", "Keys resolved by dictionary sync"),
        &["operation"]
    )
    .expect("metric can not be created");

    /// Agent side: keys currently waiting for registration
    pub static ref DICTIONARY_PENDING_METRIC: IntGaugeVec = IntGaugeVec::new(
        Opts::new("dictionary_pending", "Pending keys per dictionary after the last sync"),
        &["operation"]
    )
    .expect("metric can not be created");

    pub static ref RESET_COMMANDS_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("reset_commands", "Reset commands issued by the backend or executed by an agent"),
        &["side"]
    )
    .expect("metric can not be created");

    /// Agent side: tick outcome, one of `failed`, `cooling_down`
    pub static ref REGISTER_TICK_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("register_ticks", "Register ticks that did not run to completion"),
        &["outcome"]
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

pub(crate) fn register_custom_metrics(registry: &Registry) {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(REGISTRATIONS_METRIC.clone()),
        Box::new(DICTIONARY_SYNC_RESOLVED_METRIC.clone()),
        Box::new(DICTIONARY_PENDING_METRIC.clone()),
        Box::new(RESET_COMMANDS_METRIC.clone()),
        Box::new(REGISTER_TICK_METRIC.clone()),
    ];
    for c in collectors {
        // Registering twice only happens when the server is restarted in-process
        if let Err(e) = registry.register(c) {
            error!("collector can not be registered: {:?}", e);
        }
    }
}

/// Serves `/metrics` on `port` until the shutdown signal fires.
pub async fn start_server(
    port: u16,
    mut shutdown_signal: watch::Receiver<()>,
) {
    register_custom_metrics(&REGISTRY);

    let metrics_route = warp::path!("metrics").and_then(metrics_handler);

    info!("metrics server listening on 0.0.0.0:{port}");
    let (_, server) = warp::serve(metrics_route).bind_with_graceful_shutdown(([0, 0, 0, 0], port), async move {
        let _ = shutdown_signal.changed().await;
    });
    server.await;
}

async fn metrics_handler() -> std::result::Result<impl Reply, Rejection> {
    let mut res = encode(&REGISTRY.gather());
    res.push_str(&encode(&prometheus::gather()));
    res.push_str(&get_metrics_body());
    Ok(res)
}

fn encode(families: &[prometheus::proto::MetricFamily]) -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(families, &mut buffer) {
        error!("could not encode metrics: {}", e);
    };
    match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            error!("metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    }
}

/// Export metrics for Prometheus to scrape
pub fn get_metrics_body() -> String {
    let autometrics_response = prometheus_exporter::encode_http_response();
    autometrics_response.into_body()
}

/// Export metrics for Prometheus to scrape
pub fn get_metrics() -> PrometheusResponse {
    prometheus_exporter::encode_http_response()
}
