//! Webpush protocol options rendered under `message.webpush`.

use std::collections::BTreeMap;
use std::str::FromStr;

use reqwest::Url;
use serde::Serialize;
use serde_json::{Map, Value};

use super::data::{coerce_map, merge_entries, DataMap};
use crate::error::{PushError, Result};

/// Webpush `Urgency` header values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    VeryLow,
    Low,
    Normal,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::VeryLow => "very-low",
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::High => "high",
        }
    }
}

impl FromStr for Urgency {
    type Err = PushError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "very-low" => Ok(Self::VeryLow),
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            _ => Err(PushError::Validation(
                "Urgency must be one of: very-low, low, normal, high".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
struct WebpushFcmOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    analytics_label: Option<String>,
}

impl WebpushFcmOptions {
    fn is_empty(&self) -> bool {
        self.link.is_none() && self.analytics_label.is_none()
    }
}

/// Webpush options for browser delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WebpushConfig {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<DataMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "WebpushFcmOptions::is_empty")]
    fcm_options: WebpushFcmOptions,
}

impl WebpushConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge arbitrary webpush headers
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set the `TTL` header in seconds
    pub fn ttl(mut self, seconds: u64) -> Self {
        self.headers.insert("TTL".to_string(), seconds.to_string());
        self
    }

    pub fn urgency(mut self, urgency: &str) -> Result<Self> {
        let urgency: Urgency = urgency.parse()?;
        self.headers
            .insert("Urgency".to_string(), urgency.as_str().to_string());
        Ok(self)
    }

    /// Set the `Topic` header used to replace pending messages
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.headers.insert("Topic".to_string(), topic.into());
        self
    }

    /// Set web-specific data, overriding the message data on web
    pub fn data<I, K, V>(mut self, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut entries = Map::new();
        merge_entries(&mut entries, data);
        self.data = Some(coerce_map(&entries));
        self
    }

    /// Web Notification API options (title, body, icon, badge, actions...)
    pub fn notification(mut self, notification: Value) -> Result<Self> {
        let Value::Object(notification) = notification else {
            return Err(PushError::Validation(
                "Webpush notification must be a JSON object".to_string(),
            ));
        };
        self.notification = Some(notification);
        Ok(self)
    }

    /// Link opened on click. Must be an HTTPS URL.
    pub fn link(mut self, url: &str) -> Result<Self> {
        let invalid = || PushError::Validation("Link must be a valid HTTPS URL".to_string());

        let parsed = Url::parse(url).map_err(|_| invalid())?;
        if parsed.scheme() != "https" || parsed.host_str().is_none() {
            return Err(invalid());
        }
        self.fcm_options.link = Some(url.to_string());
        Ok(self)
    }

    pub fn analytics_label(mut self, label: impl Into<String>) -> Self {
        self.fcm_options.analytics_label = Some(label.into());
        self
    }
}
