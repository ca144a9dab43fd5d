use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize logs and metrics. Call once, at process start.
pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "tidekv=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if PROM_HANDLE.set(handle).is_err() {
        tracing::warn!("Prometheus handle already set; telemetry re-initialized?");
    }

    metrics::describe_counter!(
        "tidekv_events_logged_total",
        "Events durably recorded in the transaction log"
    );
    metrics::describe_counter!(
        "tidekv_log_write_failures_total",
        "Fatal transaction log write failures"
    );
    metrics::describe_histogram!(
        "tidekv_replay_duration_seconds",
        "Time taken to replay the transaction log at startup"
    );
    metrics::describe_gauge!("tidekv_store_keys", "Keys currently held in the store");

    metrics::gauge!("tidekv_node_up", 1.0);
}

/// Render the current metrics in Prometheus exposition format.
pub fn render_metrics() -> String {
    match PROM_HANDLE.get() {
        Some(handle) => handle.render(),
        None => "# metrics not initialized".to_string(),
    }
}
