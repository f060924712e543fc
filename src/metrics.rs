use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics exporter
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "palladium_api_requests_total",
        "Total number of stats API requests"
    );
    describe_counter!(
        "palladium_rpc_calls_total",
        "Total number of node JSON-RPC calls"
    );
    describe_histogram!(
        "palladium_rpc_duration_seconds",
        "Node JSON-RPC call duration in seconds"
    );
    describe_counter!(
        "palladium_fetch_total",
        "Stats API fetches made by the pollers"
    );
    describe_gauge!(
        "palladium_stats_info",
        "Service version information"
    );

    gauge!("palladium_stats_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a stats API request
pub fn record_api_request(endpoint: &str, status: u16) {
    counter!(
        "palladium_api_requests_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
}

/// Record a node RPC call
pub fn record_rpc_call(method: &str, outcome: &str, duration: Duration) {
    counter!(
        "palladium_rpc_calls_total",
        "method" => method.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);
    histogram!(
        "palladium_rpc_duration_seconds",
        "method" => method.to_string(),
    )
    .record(duration.as_secs_f64());
}

/// Record a poller fetch outcome (`success`, `network`, `http`, `parse`)
pub fn record_fetch(metric: &str, outcome: &str) {
    counter!(
        "palladium_fetch_total",
        "metric" => metric.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);
}
