use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::FirebaseConfig;
use crate::error::{PushError, Result};
use crate::metrics::DeliveryMetrics;

/// Status and body of one gateway response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Message name (`projects/<id>/messages/<id>`) from a 200 response
    pub fn message_name(&self) -> Option<String> {
        let parsed: Value = serde_json::from_str(&self.body).ok()?;
        parsed.get("name")?.as_str().map(str::to_string)
    }
}

/// Posts envelopes to the messaging gateway
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn post(&self, bearer: &str, body: &Value) -> Result<TransportResponse>;
}

/// reqwest client with the configured per-request timeout
pub fn build_http_client(config: &FirebaseConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .build()
        .map_err(|e| PushError::Transport(format!("Failed to build HTTP client: {}", e)))
}

/// HTTP transport against `{api_base_url}/projects/{project_id}/messages:send`
pub struct HttpTransport {
    client: reqwest::Client,
    send_url: String,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, send_url: impl Into<String>) -> Self {
        Self {
            client,
            send_url: send_url.into(),
        }
    }

    pub fn from_config(client: reqwest::Client, config: &FirebaseConfig) -> Self {
        Self::new(client, config.send_url())
    }

    pub fn send_url(&self) -> &str {
        &self.send_url
    }
}

#[async_trait]
impl PushTransport for HttpTransport {
    async fn post(&self, bearer: &str, body: &Value) -> Result<TransportResponse> {
        let start = Instant::now();

        let response = self
            .client
            .post(&self.send_url)
            .bearer_auth(bearer)
            .json(body)
            .send()
            .await
            .map_err(|e| PushError::Transport(format!("Gateway request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| PushError::Transport(format!("Failed to read gateway response: {}", e)))?;

        DeliveryMetrics::observe_latency(start.elapsed().as_secs_f64());

        Ok(TransportResponse { status, body })
    }
}
