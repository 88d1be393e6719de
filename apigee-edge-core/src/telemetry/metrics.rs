//! Prometheus metrics setup and metric definitions

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_prometheus_recorder() -> PrometheusHandle {
    // Seconds. Management API calls are rarely sub-millisecond, so the
    // smallest bucket is 5ms.
    let buckets = vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

    PrometheusBuilder::new()
        .set_buckets(&buckets)
        .expect("failed to set histogram buckets")
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Register metric descriptions and emit initial zero values so Prometheus output
/// includes HELP/TYPE lines for all metrics from startup.
pub fn describe_metrics() {
    describe_counter!(
        "apigee_edge_http_requests_total",
        "Total number of HTTP requests served from generated routes"
    );
    describe_counter!(
        "apigee_edge_requests_total",
        "Total number of Apigee Edge management API requests"
    );
    describe_histogram!(
        "apigee_edge_request_duration_seconds",
        "Apigee Edge management API request duration in seconds"
    );

    counter!("apigee_edge_requests_total", "method" => "GET", "outcome" => "success").absolute(0);
    histogram!("apigee_edge_request_duration_seconds", "method" => "GET").record(0.0);
}

/// Record one round trip to the management API.
pub fn record_edge_request(method: &str, outcome: &'static str, seconds: f64) {
    counter!(
        "apigee_edge_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("apigee_edge_request_duration_seconds", "method" => method.to_string())
        .record(seconds);
}

/// Record a request served by a mounted entity route.
pub fn record_http_request(route: &str, status: u16) {
    counter!(
        "apigee_edge_http_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
