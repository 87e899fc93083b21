use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "record_requests_total",
        "Total record requests handled, by method tag and response status",
        &["method", "status"]
    )
    .expect("register record_requests_total")
});

pub static REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "record_request_duration_seconds",
        "Record request duration in seconds",
        &["method"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("register record_request_duration_seconds")
});

/// Count one handled request and its latency.
///
/// Unknown method tags are all recorded as `other`.
pub fn observe_request(method: &str, status: u16, seconds: f64) {
    let method = match method {
        "POST" | "GET" | "PUT" | "DELETE" => method,
        _ => "other",
    };
    REQUESTS_TOTAL
        .with_label_values(&[method, &status.to_string()])
        .inc();
    REQUEST_DURATION.with_label_values(&[method]).observe(seconds);
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observed_requests_show_up_in_export() {
        observe_request("POST", 201, 0.002);
        observe_request("PATCH", 405, 0.0001);

        let (status, text) = encode_metrics();
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(text.contains("record_requests_total"));
        assert!(text.contains("method=\"other\""));
        assert!(text.contains("record_request_duration_seconds"));
    }
}
