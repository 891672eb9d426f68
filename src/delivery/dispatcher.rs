use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;

use crate::credentials::CredentialProvider;
use crate::error::{PushError, Result};
use crate::message::{build_envelopes, Envelope, EnvelopePlan, EnvelopeTarget, MessageDescriptor, PayloadMode};
use crate::metrics::DeliveryMetrics;

use super::outcome::{BatchPolicy, DeliveryReport, DeliveryResult, Outcome};
use super::recipients::Recipients;
use super::transport::{PushTransport, TransportResponse};

/// Default bound on in-flight requests for collect-all batches
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Dispatcher statistics
#[derive(Debug, Default)]
pub struct DispatcherStats {
    /// Send operations started
    pub total_sends: AtomicU64,
    /// Raw and legacy sends
    pub passthrough_sends: AtomicU64,
    /// Envelopes posted to the gateway
    pub envelopes_attempted: AtomicU64,
    pub delivered: AtomicU64,
    /// Envelopes answered with 404
    pub ignored: AtomicU64,
    pub failed: AtomicU64,
}

impl DispatcherStats {
    pub fn snapshot(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            total_sends: self.total_sends.load(Ordering::Relaxed),
            passthrough_sends: self.passthrough_sends.load(Ordering::Relaxed),
            envelopes_attempted: self.envelopes_attempted.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatcher statistics
#[derive(Debug, Clone, Serialize)]
pub struct DispatcherStatsSnapshot {
    pub total_sends: u64,
    pub passthrough_sends: u64,
    pub envelopes_attempted: u64,
    pub delivered: u64,
    pub ignored: u64,
    pub failed: u64,
}

/// Delivers message descriptors through the gateway.
///
/// Each send resolves its envelopes, fetches one bearer token and posts the
/// envelopes according to the configured [`BatchPolicy`].
pub struct PushDispatcher {
    credentials: Arc<CredentialProvider>,
    transport: Arc<dyn PushTransport>,
    policy: BatchPolicy,
    max_concurrency: usize,
    stats: DispatcherStats,
}

impl PushDispatcher {
    pub fn new(credentials: Arc<CredentialProvider>, transport: Arc<dyn PushTransport>) -> Self {
        Self {
            credentials,
            transport,
            policy: BatchPolicy::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            stats: DispatcherStats::default(),
        }
    }

    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    pub fn credentials(&self) -> &Arc<CredentialProvider> {
        &self.credentials
    }

    pub fn stats(&self) -> DispatcherStatsSnapshot {
        self.stats.snapshot()
    }

    /// Send `message` to its topic or condition, or to every recipient.
    ///
    /// An empty recipient list without a topic, condition, raw or legacy
    /// payload succeeds without any HTTP call.
    #[tracing::instrument(
        name = "dispatcher.send",
        skip_all,
        fields(target_kind = message.target_kind(), policy = %self.policy)
    )]
    pub async fn send(
        &self,
        message: MessageDescriptor,
        recipients: impl Into<Recipients>,
    ) -> Result<DeliveryResult> {
        let recipients = recipients.into();
        let plan = build_envelopes(&message, recipients.as_slice())?;

        self.stats.total_sends.fetch_add(1, Ordering::Relaxed);
        DeliveryMetrics::record_send(message.target_kind());

        match plan {
            EnvelopePlan::Passthrough(envelope) => self.send_passthrough(envelope).await,
            EnvelopePlan::Batch(envelopes) if envelopes.is_empty() => {
                tracing::debug!("No recipients resolved, nothing to send");
                Ok(DeliveryResult::Completed(DeliveryReport::new(self.policy)))
            }
            EnvelopePlan::Batch(envelopes) => {
                let bearer = self.credentials.bearer_token().await?;
                let report = match self.policy {
                    BatchPolicy::FailFast => self.send_sequential(&bearer, envelopes).await?,
                    BatchPolicy::CollectAll => self.send_concurrent(&bearer, envelopes).await,
                };

                tracing::info!(
                    send_id = %report.send_id,
                    attempted = report.attempted,
                    delivered = report.delivered,
                    ignored = report.ignored,
                    failed = report.failures.len(),
                    "Push send completed"
                );

                Ok(DeliveryResult::Completed(report))
            }
        }
    }

    pub async fn send_as_notification(
        &self,
        message: MessageDescriptor,
        recipients: impl Into<Recipients>,
    ) -> Result<DeliveryResult> {
        self.send(message, recipients).await
    }

    /// Same wire behaviour as [`send_as_notification`](Self::send_as_notification)
    pub async fn send_as_message(
        &self,
        message: MessageDescriptor,
        recipients: impl Into<Recipients>,
    ) -> Result<DeliveryResult> {
        self.send(message, recipients).await
    }

    /// Post the descriptor's raw payload without any recipients
    pub async fn send_raw(&self, message: MessageDescriptor) -> Result<DeliveryResult> {
        if !matches!(message.mode(), PayloadMode::Raw(_)) {
            return Err(PushError::MalformedPayload(
                "send_raw requires a raw payload".to_string(),
            ));
        }
        self.send(message, Recipients::new()).await
    }

    async fn send_passthrough(&self, envelope: Envelope) -> Result<DeliveryResult> {
        let bearer = self.credentials.bearer_token().await?;
        self.stats.passthrough_sends.fetch_add(1, Ordering::Relaxed);

        let response = self.post(&bearer, &envelope).await?;
        let target = envelope.target.to_string();
        self.record_outcome(Outcome::classify(response.status), &target, response.status);

        tracing::info!(
            recipient = %target,
            status = response.status,
            "Passthrough payload sent"
        );

        Ok(DeliveryResult::Raw(response))
    }

    async fn send_sequential(&self, bearer: &str, envelopes: Vec<Envelope>) -> Result<DeliveryReport> {
        let mut report = DeliveryReport::new(BatchPolicy::FailFast);

        for envelope in envelopes {
            let target = envelope.target.to_string();
            let response = self.post(bearer, &envelope).await?;

            let outcome = report.record_response(&target, &response);
            self.record_outcome(outcome, &target, response.status);

            if outcome == Outcome::Failed {
                return Err(PushError::Delivery {
                    status_code: response.status,
                    body: response.body,
                });
            }
        }

        Ok(report)
    }

    async fn send_concurrent(&self, bearer: &str, envelopes: Vec<Envelope>) -> DeliveryReport {
        let mut report = DeliveryReport::new(BatchPolicy::CollectAll);
        let mut futures = FuturesUnordered::new();

        for envelope in envelopes {
            futures.push(async move {
                let result = self.post(bearer, &envelope).await;
                (envelope.target, result)
            });

            // Process completed futures when we hit the concurrency limit
            while futures.len() >= self.max_concurrency {
                match futures.next().await {
                    Some((target, result)) => self.collect(&mut report, target, result),
                    None => break,
                }
            }
        }

        while let Some((target, result)) = futures.next().await {
            self.collect(&mut report, target, result);
        }

        report
    }

    async fn post(&self, bearer: &str, envelope: &Envelope) -> Result<TransportResponse> {
        self.stats.envelopes_attempted.fetch_add(1, Ordering::Relaxed);

        match self.transport.post(bearer, &envelope.body).await {
            Ok(response) => Ok(response),
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                DeliveryMetrics::record_failed();
                tracing::error!(recipient = %envelope.target, error = %e, "Gateway request failed");
                Err(e)
            }
        }
    }

    fn collect(
        &self,
        report: &mut DeliveryReport,
        target: EnvelopeTarget,
        result: Result<TransportResponse>,
    ) {
        let target = target.to_string();
        match result {
            Ok(response) => {
                let outcome = report.record_response(&target, &response);
                self.record_outcome(outcome, &target, response.status);
            }
            Err(e) => report.record_error(&target, &e),
        }
    }

    fn record_outcome(&self, outcome: Outcome, target: &str, status: u16) {
        match outcome {
            Outcome::Delivered => {
                self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                DeliveryMetrics::record_delivered();
            }
            Outcome::Ignored => {
                self.stats.ignored.fetch_add(1, Ordering::Relaxed);
                DeliveryMetrics::record_ignored();
                tracing::debug!(recipient = %target, "Requested entity was not found, ignoring");
            }
            Outcome::Failed => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                DeliveryMetrics::record_failed();
                tracing::warn!(recipient = %target, status = status, "Gateway rejected envelope");
            }
        }
    }
}
