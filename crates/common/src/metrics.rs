use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static REVIEWS_APPENDED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "qa_review_reviews_appended_total",
        "Total review records appended to the store"
    )
    .expect("register reviews_appended_total")
});

pub static DISCARDED_BLOBS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "qa_review_discarded_blobs_total",
        "Stored collections treated as empty because they were unreadable",
        &["reason"]
    )
    .expect("register discarded_blobs_total")
});

pub static SKIPPED_RECORDS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "qa_review_skipped_records_total",
        "Individual stored records that failed to decode"
    )
    .expect("register skipped_records_total")
});

pub static BACKEND_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "qa_review_backend_errors_total",
        "Storage backend failures by operation",
        &["op"]
    )
    .expect("register backend_errors_total")
});

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
