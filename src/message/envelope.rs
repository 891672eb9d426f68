//! Wire envelope builder.
//!
//! Turns a [`MessageDescriptor`] plus the resolved device tokens into the
//! exact request bodies posted to the gateway.

use std::fmt;

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::data::{coerce_map, DataMap};
use super::{AndroidConfig, ApnsConfig, MessageDescriptor, PayloadMode, WebpushConfig};
use crate::error::{PushError, Result};

/// What a single envelope is addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeTarget {
    Token(String),
    Topic(String),
    Condition(String),
    /// Legacy bulk body covering this many registration ids
    Bulk(usize),
    Raw,
}

impl fmt::Display for EnvelopeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeTarget::Token(token) => write!(f, "token:{}", token),
            EnvelopeTarget::Topic(topic) => write!(f, "topic:{}", topic),
            EnvelopeTarget::Condition(condition) => write!(f, "condition:{}", condition),
            EnvelopeTarget::Bulk(count) => write!(f, "bulk:{}", count),
            EnvelopeTarget::Raw => write!(f, "raw"),
        }
    }
}

/// One request body and the target it addresses
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub target: EnvelopeTarget,
    pub body: Value,
}

/// Result of envelope resolution for one send
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopePlan {
    /// Raw or legacy body, posted once; the response is handed back as-is
    Passthrough(Envelope),
    /// Structured envelopes, classified one by one. May be empty.
    Batch(Vec<Envelope>),
}

impl EnvelopePlan {
    pub fn len(&self) -> usize {
        match self {
            EnvelopePlan::Passthrough(_) => 1,
            EnvelopePlan::Batch(envelopes) => envelopes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Serialize)]
struct WireEnvelope<'a> {
    message: WireMessage<'a>,
}

#[derive(Clone, Serialize)]
struct WireMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<WireNotification<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a DataMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    android: Option<&'a AndroidConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    apns: Option<&'a ApnsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    webpush: Option<&'a WebpushConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fcm_options: Option<WireFcmOptions<'a>>,
}

#[derive(Clone, Serialize)]
struct WireNotification<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

#[derive(Clone, Serialize)]
struct WireFcmOptions<'a> {
    analytics_label: &'a str,
}

/// Resolve the envelopes for one send.
///
/// Raw payloads are posted verbatim, legacy payloads become a single
/// `{registration_ids, data}` body, and structured descriptors address the
/// topic, else the condition, else every token in input order.
pub fn build_envelopes(descriptor: &MessageDescriptor, tokens: &[String]) -> Result<EnvelopePlan> {
    match &descriptor.mode {
        PayloadMode::Raw(payload) => {
            if !payload.is_object() {
                return Err(PushError::MalformedPayload(
                    "Raw payload must be a JSON object".to_string(),
                ));
            }
            Ok(EnvelopePlan::Passthrough(Envelope {
                target: EnvelopeTarget::Raw,
                body: payload.clone(),
            }))
        }
        PayloadMode::Legacy(entries) => Ok(EnvelopePlan::Passthrough(legacy_envelope(
            entries,
            descriptor.data.as_ref(),
            tokens,
        ))),
        PayloadMode::Structured => structured_envelopes(descriptor, tokens).map(EnvelopePlan::Batch),
    }
}

fn legacy_envelope(
    entries: &Map<String, Value>,
    additional: Option<&Map<String, Value>>,
    tokens: &[String],
) -> Envelope {
    let mut merged = entries.clone();
    if let Some(additional) = additional {
        merged.extend(additional.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    Envelope {
        target: EnvelopeTarget::Bulk(tokens.len()),
        body: json!({
            "registration_ids": tokens,
            "data": coerce_map(&merged),
        }),
    }
}

fn structured_envelopes(descriptor: &MessageDescriptor, tokens: &[String]) -> Result<Vec<Envelope>> {
    let data = descriptor.data.as_ref().map(coerce_map);

    let notification = if descriptor.title.is_some()
        || descriptor.body.is_some()
        || descriptor.image.is_some()
    {
        Some(WireNotification {
            title: descriptor.title.as_deref(),
            body: descriptor.body.as_deref(),
            image: descriptor.image.as_deref(),
        })
    } else {
        None
    };

    let base = WireMessage {
        token: None,
        topic: None,
        condition: None,
        notification,
        data: data.as_ref(),
        android: descriptor.android.as_ref(),
        apns: descriptor.apns.as_ref(),
        webpush: descriptor.webpush.as_ref(),
        fcm_options: descriptor
            .analytics_label
            .as_deref()
            .map(|analytics_label| WireFcmOptions { analytics_label }),
    };

    let render = |message: WireMessage<'_>, target: EnvelopeTarget| -> Result<Envelope> {
        let body = serde_json::to_value(WireEnvelope { message })?;
        Ok(Envelope { target, body })
    };

    if let Some(topic) = descriptor.topic.as_deref() {
        let message = WireMessage {
            topic: Some(topic),
            ..base
        };
        return Ok(vec![render(message, EnvelopeTarget::Topic(topic.to_string()))?]);
    }

    if let Some(condition) = descriptor.condition.as_deref() {
        let message = WireMessage {
            condition: Some(condition),
            ..base
        };
        return Ok(vec![render(
            message,
            EnvelopeTarget::Condition(condition.to_string()),
        )?]);
    }

    tokens
        .iter()
        .map(|token| {
            let message = WireMessage {
                token: Some(token),
                ..base.clone()
            };
            render(message, EnvelopeTarget::Token(token.clone()))
        })
        .collect()
}
