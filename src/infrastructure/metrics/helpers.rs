//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    ENVELOPES_TOTAL, GATEWAY_REQUEST_LATENCY, SENDS_TOTAL, TOKEN_CACHE_HITS_TOTAL,
    TOKEN_REFRESH_FAILURES_TOTAL, TOKEN_REFRESH_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording delivery metrics
pub struct DeliveryMetrics;

impl DeliveryMetrics {
    /// Record a send operation for the given target kind
    pub fn record_send(target: &str) {
        SENDS_TOTAL.with_label_values(&[target]).inc();
    }

    /// Record an envelope accepted by the gateway
    pub fn record_delivered() {
        ENVELOPES_TOTAL.with_label_values(&["delivered"]).inc();
    }

    /// Record an envelope answered with 404
    pub fn record_ignored() {
        ENVELOPES_TOTAL.with_label_values(&["ignored"]).inc();
    }

    /// Record an envelope rejected by the gateway
    pub fn record_failed() {
        ENVELOPES_TOTAL.with_label_values(&["failed"]).inc();
    }

    /// Observe a gateway round-trip
    pub fn observe_latency(seconds: f64) {
        GATEWAY_REQUEST_LATENCY.observe(seconds);
    }
}

/// Helper struct for recording bearer token metrics
pub struct CredentialMetrics;

impl CredentialMetrics {
    pub fn record_cache_hit() {
        TOKEN_CACHE_HITS_TOTAL.inc();
    }

    pub fn record_refresh() {
        TOKEN_REFRESH_TOTAL.inc();
    }

    pub fn record_refresh_failure() {
        TOKEN_REFRESH_FAILURES_TOTAL.inc();
    }
}
