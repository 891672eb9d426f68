use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use uuid::Uuid;

use crate::error::{PushError, Result};

use super::transport::TransportResponse;

/// Classification of one gateway status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 200
    Delivered,
    /// 404: recipient no longer exists
    Ignored,
    /// Anything else
    Failed,
}

impl Outcome {
    pub fn classify(status: u16) -> Self {
        match status {
            200 => Outcome::Delivered,
            404 => Outcome::Ignored,
            _ => Outcome::Failed,
        }
    }
}

/// How a multi-envelope send reacts to a fatal outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Sequential; the first fatal outcome aborts the rest and is returned
    #[default]
    FailFast,
    /// Concurrent; every envelope is attempted and failures are reported
    CollectAll,
}

impl BatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchPolicy::FailFast => "fail_fast",
            BatchPolicy::CollectAll => "collect_all",
        }
    }
}

impl fmt::Display for BatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchPolicy {
    type Err = PushError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(BatchPolicy::FailFast),
            "collect_all" => Ok(BatchPolicy::CollectAll),
            _ => Err(PushError::Validation(format!(
                "Unknown batch policy '{}', expected fail_fast or collect_all",
                s
            ))),
        }
    }
}

/// An envelope that was not delivered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryFailure {
    pub target: String,
    /// Gateway status, absent for network failures
    pub status_code: Option<u16>,
    pub error: String,
}

/// Aggregate outcome of a structured send
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub send_id: Uuid,
    pub policy: BatchPolicy,
    pub attempted: usize,
    pub delivered: usize,
    pub ignored: usize,
    /// Names returned by the gateway for delivered envelopes
    pub message_names: Vec<String>,
    pub failures: Vec<DeliveryFailure>,
    pub success: bool,
}

impl DeliveryReport {
    pub fn new(policy: BatchPolicy) -> Self {
        Self {
            send_id: Uuid::new_v4(),
            policy,
            attempted: 0,
            delivered: 0,
            ignored: 0,
            message_names: Vec::new(),
            failures: Vec::new(),
            success: true,
        }
    }

    pub(crate) fn record_response(&mut self, target: &str, response: &TransportResponse) -> Outcome {
        self.attempted += 1;
        let outcome = Outcome::classify(response.status);

        match outcome {
            Outcome::Delivered => {
                self.delivered += 1;
                if let Some(name) = response.message_name() {
                    self.message_names.push(name);
                }
            }
            Outcome::Ignored => self.ignored += 1,
            Outcome::Failed => {
                self.success = false;
                self.failures.push(DeliveryFailure {
                    target: target.to_string(),
                    status_code: Some(response.status),
                    error: format!(
                        "Failed to send notification. status code: {}",
                        response.status
                    ),
                });
            }
        }

        outcome
    }

    pub(crate) fn record_error(&mut self, target: &str, error: &PushError) {
        self.attempted += 1;
        self.success = false;
        self.failures.push(DeliveryFailure {
            target: target.to_string(),
            status_code: error.status_code(),
            error: error.to_string(),
        });
    }
}

/// Result handed back to callers of the dispatcher
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeliveryResult {
    /// Structured send, every envelope classified
    Completed(DeliveryReport),
    /// Raw or legacy send, the gateway response as-is
    Raw(TransportResponse),
}

impl DeliveryResult {
    pub fn is_success(&self) -> bool {
        match self {
            DeliveryResult::Completed(report) => report.success,
            DeliveryResult::Raw(response) => (200..300).contains(&response.status),
        }
    }

    pub fn report(&self) -> Option<&DeliveryReport> {
        match self {
            DeliveryResult::Completed(report) => Some(report),
            DeliveryResult::Raw(_) => None,
        }
    }

    pub fn response(&self) -> Option<&TransportResponse> {
        match self {
            DeliveryResult::Completed(_) => None,
            DeliveryResult::Raw(response) => Some(response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Outcome::classify(200), Outcome::Delivered);
        assert_eq!(Outcome::classify(404), Outcome::Ignored);
        assert_eq!(Outcome::classify(201), Outcome::Failed);
        assert_eq!(Outcome::classify(400), Outcome::Failed);
        assert_eq!(Outcome::classify(500), Outcome::Failed);
    }

    #[test]
    fn test_batch_policy_parse() {
        assert_eq!("fail_fast".parse::<BatchPolicy>().unwrap(), BatchPolicy::FailFast);
        assert_eq!("collect-all".parse::<BatchPolicy>().unwrap(), BatchPolicy::CollectAll);
        assert_eq!("COLLECT_ALL".parse::<BatchPolicy>().unwrap(), BatchPolicy::CollectAll);
        assert!("best_effort".parse::<BatchPolicy>().is_err());
        assert_eq!(BatchPolicy::default(), BatchPolicy::FailFast);
    }

    #[test]
    fn test_report_accounting() {
        let mut report = DeliveryReport::new(BatchPolicy::CollectAll);

        report.record_response("token:a", &TransportResponse::new(200, r#"{"name": "m1"}"#));
        report.record_response("token:b", &TransportResponse::new(404, ""));
        assert!(report.success);

        report.record_response("token:c", &TransportResponse::new(500, "boom"));
        report.record_error("token:d", &PushError::Transport("reset".to_string()));

        assert_eq!(report.attempted, 4);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.ignored, 1);
        assert_eq!(report.message_names, vec!["m1".to_string()]);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].status_code, Some(500));
        assert_eq!(report.failures[1].status_code, None);
        assert!(!report.success);
    }

    #[test]
    fn test_result_serializes_with_kind() {
        let result = DeliveryResult::Raw(TransportResponse::new(200, "{}"));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "raw");
        assert_eq!(json["status"], 200);
        assert!(result.is_success());
    }
}
