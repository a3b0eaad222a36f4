use std::time::Instant;

use actix_web::{HttpResponse, get};
use log::warn;
use prometheus::{
    Encoder, HistogramVec, IntCounterVec, IntGauge, TextEncoder, register_histogram_vec,
    register_int_counter_vec, register_int_gauge,
};

use crate::constants::PROMETHEUS_TEXT;
use crate::error::DashboardError;

lazy_static::lazy_static! {
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total HTTP requests",
        &["method", "endpoint", "status"]
    ).expect("http_requests_total registers once");

    pub static ref HTTP_REQUESTS_DURATION: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "endpoint"],
        vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0]
    ).expect("http_request_duration_seconds registers once");

    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGauge = register_int_gauge!(
        "http_requests_in_flight",
        "HTTP requests currently being served"
    ).expect("http_requests_in_flight registers once");

    pub static ref QUERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "dashboard_queries_total",
        "Store queries by outcome",
        &["query", "outcome"]
    ).expect("dashboard_queries_total registers once");

    pub static ref QUERY_DURATION: HistogramVec = register_histogram_vec!(
        "dashboard_query_duration_seconds",
        "Store query duration in seconds",
        &["query"],
        vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
    ).expect("dashboard_query_duration_seconds registers once");

    pub static ref CACHE_LOOKUPS: IntCounterVec = register_int_counter_vec!(
        "dashboard_cache_lookups_total",
        "Memoized query lookups",
        &["query", "result"]
    ).expect("dashboard_cache_lookups_total registers once");
}

/// Times a store query and counts its outcome.
pub fn observe_query<T, F>(query: &'static str, run: F) -> Result<T, DashboardError>
where
    F: FnOnce() -> Result<T, DashboardError>,
{
    let start = Instant::now();
    let result = run();
    QUERY_DURATION
        .with_label_values(&[query])
        .observe(start.elapsed().as_secs_f64());

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => {
            warn!("Query {query} failed: {e}");
            "error"
        }
    };
    QUERIES_TOTAL.with_label_values(&[query, outcome]).inc();

    result
}

#[get("/metrics")]
pub async fn metrics_endpoint() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        log::error!("Failed to encode metrics: {}", e);
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok().content_type(PROMETHEUS_TEXT).body(buffer)
}
