use serde::Deserialize;
use serde_json::{Map, Value};

use super::MessageDescriptor;
use crate::delivery::Recipients;
use crate::error::{PushError, Result};
use crate::notifiable::DeliveryMethod;

/// JSON request accepted by the command-line sender.
///
/// ```json
/// {
///   "title": "Order shipped",
///   "body": "Your order is on its way",
///   "data": {"order_id": 123},
///   "tokens": "tokA,tokB",
///   "delivery_method": "notification"
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    /// Array of tokens or a comma-separated string
    #[serde(default)]
    pub tokens: Recipients,
    #[serde(default)]
    pub analytics_label: Option<String>,
    /// Body posted verbatim; every other field except `tokens` is ignored
    #[serde(default)]
    pub raw: Option<Value>,
    /// Legacy bulk payload
    #[serde(default)]
    pub array: Option<Map<String, Value>>,
    #[serde(default)]
    pub delivery_method: DeliveryMethod,
}

impl PushRequest {
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input)
            .map_err(|e| PushError::Validation(format!("Invalid push request: {}", e)))
    }

    pub fn to_descriptor(&self) -> MessageDescriptor {
        let mut message = MessageDescriptor::new();

        if let Some(title) = &self.title {
            message = message.title(title);
        }
        if let Some(body) = &self.body {
            message = message.body(body);
        }
        if let Some(image) = &self.image {
            message = message.image(image);
        }
        if let Some(data) = &self.data {
            message = message.data(data.clone());
        }
        if let Some(topic) = &self.topic {
            message = message.topic(topic);
        }
        if let Some(condition) = &self.condition {
            message = message.condition(condition);
        }
        if let Some(label) = &self.analytics_label {
            message = message.analytics_label(label);
        }
        if let Some(raw) = &self.raw {
            message = message.raw(raw.clone());
        }
        if let Some(array) = &self.array {
            message = message.from_array(array.clone());
        }

        message
    }
}
