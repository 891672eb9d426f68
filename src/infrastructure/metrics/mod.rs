//! Prometheus metrics for the push delivery engine.
//!
//! This module provides metrics for monitoring push delivery:
//! - Send metrics (sends by target kind, envelopes by outcome)
//! - Gateway latency
//! - Bearer token cache and refresh metrics

mod helpers;

pub use helpers::{encode_metrics, CredentialMetrics, DeliveryMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "ara_fcm";

lazy_static! {
    // ============================================================================
    // Send Metrics
    // ============================================================================

    /// Total send operations by target kind (token, topic, condition, raw, legacy)
    pub static ref SENDS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_sends_total", METRIC_PREFIX),
        "Total send operations by target kind",
        &["target"]
    ).unwrap();

    /// Envelopes posted to the gateway by classified outcome
    pub static ref ENVELOPES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_envelopes_total", METRIC_PREFIX),
        "Envelopes posted to the gateway by outcome",
        &["outcome"]
    ).unwrap();

    /// Gateway round-trip latency
    pub static ref GATEWAY_REQUEST_LATENCY: Histogram = register_histogram!(
        format!("{}_gateway_request_latency_seconds", METRIC_PREFIX),
        "Gateway request latency in seconds",
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    // ============================================================================
    // Credential Metrics
    // ============================================================================

    /// Bearer token served from the token store
    pub static ref TOKEN_CACHE_HITS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_token_cache_hits_total", METRIC_PREFIX),
        "Bearer tokens served from the token store"
    ).unwrap();

    /// Assertion exchanges performed
    pub static ref TOKEN_REFRESH_TOTAL: IntCounter = register_int_counter!(
        format!("{}_token_refresh_total", METRIC_PREFIX),
        "Service-account assertion exchanges performed"
    ).unwrap();

    /// Assertion exchanges that failed
    pub static ref TOKEN_REFRESH_FAILURES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_token_refresh_failures_total", METRIC_PREFIX),
        "Service-account assertion exchanges that failed"
    ).unwrap();
}
