//! APNs-specific options rendered under `message.apns`.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{PushError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
struct ApnsFcmOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    analytics_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

impl ApnsFcmOptions {
    fn is_empty(&self) -> bool {
        self.analytics_label.is_none() && self.image.is_none()
    }
}

/// Apple Push Notification service options.
///
/// Headers accumulate: the typed setters (`priority`, `expiration`,
/// `collapse_id`, `topic`) and `headers` all write into the same map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApnsConfig {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "ApnsFcmOptions::is_empty")]
    fcm_options: ApnsFcmOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    live_activity_token: Option<String>,
}

impl ApnsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge arbitrary APNs headers
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

    /// Set `apns-priority`: 5 (normal) or 10 (immediate)
    pub fn priority(mut self, priority: u8) -> Result<Self> {
        if priority != 5 && priority != 10 {
            return Err(PushError::Validation(
                "APNS priority must be 5 (normal) or 10 (high)".to_string(),
            ));
        }
        self.headers
            .insert("apns-priority".to_string(), priority.to_string());
        Ok(self)
    }

    /// Set `apns-expiration` to a unix timestamp
    pub fn expiration(mut self, timestamp: i64) -> Self {
        self.headers
            .insert("apns-expiration".to_string(), timestamp.to_string());
        self
    }

    /// Notifications with the same collapse id replace each other
    pub fn collapse_id(mut self, collapse_id: impl Into<String>) -> Self {
        self.headers
            .insert("apns-collapse-id".to_string(), collapse_id.into());
        self
    }

    /// Set `apns-topic`, usually the app bundle id
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.headers.insert("apns-topic".to_string(), topic.into());
        self
    }

    /// Set the complete APNs payload. It must contain an `aps` dictionary.
    pub fn payload(mut self, payload: Value) -> Result<Self> {
        let Value::Object(payload) = payload else {
            return Err(PushError::Validation(
                "APNS payload must be a JSON object".to_string(),
            ));
        };
        if !matches!(payload.get("aps"), Some(Value::Object(_))) {
            return Err(PushError::Validation(
                "APNS payload must contain an 'aps' dictionary".to_string(),
            ));
        }
        self.payload = Some(payload);
        Ok(self)
    }

    /// Build the payload from an `aps` dictionary plus custom top-level fields
    pub fn aps_payload(self, aps: Value, custom: Map<String, Value>) -> Result<Self> {
        let mut payload = custom;
        payload.insert("aps".to_string(), aps);
        self.payload(Value::Object(payload))
    }

    pub fn analytics_label(mut self, label: impl Into<String>) -> Self {
        self.fcm_options.analytics_label = Some(label.into());
        self
    }

    /// Image URL shown on iOS, overrides the message image
    pub fn image(mut self, image_url: impl Into<String>) -> Self {
        self.fcm_options.image = Some(image_url.into());
        self
    }

    /// Push or push-to-start token of an iOS Live Activity
    pub fn live_activity_token(mut self, token: impl Into<String>) -> Self {
        self.live_activity_token = Some(token.into());
        self
    }
}
