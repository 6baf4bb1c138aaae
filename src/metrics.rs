use lazy_static::lazy_static;
use prometheus::{
    Counter, Encoder, Gauge, Histogram, TextEncoder, register_counter, register_gauge,
    register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("travel_ai_requests_total", "Total number of API requests").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "travel_ai_request_latency_seconds",
        "API request latency in seconds"
    )
    .unwrap();
    pub static ref AI_CALLS_TOTAL: Counter =
        register_counter!("travel_ai_provider_calls_total", "Outbound AI provider calls, retries included").unwrap();
    pub static ref AI_RETRIES_TOTAL: Counter =
        register_counter!("travel_ai_provider_retries_total", "AI calls retried after a transient failure").unwrap();
    pub static ref AI_FAILURES_TOTAL: Counter =
        register_counter!("travel_ai_provider_failures_total", "AI calls that ended in an error").unwrap();
    pub static ref RATE_LIMIT_WAIT: Histogram = register_histogram!(
        "travel_ai_rate_limit_wait_seconds",
        "Time spent waiting for a slot in the shared AI call window",
        vec![0.001, 0.01, 0.1, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0]
    )
    .unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("travel_ai_cache_hits_total", "Total chat cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("travel_ai_cache_misses_total", "Total chat cache misses").unwrap();
    pub static ref CACHE_SIZE: Gauge =
        register_gauge!("travel_ai_cache_size", "Current number of cached chat replies").unwrap();
}

// Prometheus text exposition of every registered metric
pub fn render() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| format!("Encode error: {}", e))?;
    String::from_utf8(buffer).map_err(|e| format!("Metrics are not UTF-8: {}", e))
}
