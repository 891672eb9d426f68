use serde_json::{Map, Value};

use super::data::merge_entries;
use super::{AndroidConfig, ApnsConfig, WebpushConfig};

/// Which body the descriptor renders. Exactly one mode is active.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PayloadMode {
    /// Title/body/data plus option sets, one envelope per target
    #[default]
    Structured,
    /// Caller-supplied body posted verbatim
    Raw(Value),
    /// Bulk `{registration_ids, data}` body posted once
    Legacy(Map<String, Value>),
}

/// Platform-agnostic description of one push message.
///
/// Built fluently and consumed by a single send. Device tokens are not part
/// of the descriptor; they are supplied to the dispatcher as `Recipients`.
///
/// # Example
///
/// ```rust,ignore
/// let message = MessageDescriptor::new()
///     .title("Order shipped")
///     .body("Your order #123 is on its way")
///     .data([("order_id", json!(123))])
///     .android(AndroidConfig::new().priority("high")?);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageDescriptor {
    pub(crate) title: Option<String>,
    pub(crate) body: Option<String>,
    pub(crate) image: Option<String>,
    pub(crate) data: Option<Map<String, Value>>,
    pub(crate) topic: Option<String>,
    pub(crate) condition: Option<String>,
    pub(crate) android: Option<AndroidConfig>,
    pub(crate) apns: Option<ApnsConfig>,
    pub(crate) webpush: Option<WebpushConfig>,
    pub(crate) analytics_label: Option<String>,
    pub(crate) mode: PayloadMode,
}

impl MessageDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn image(mut self, image_url: impl Into<String>) -> Self {
        self.image = Some(image_url.into());
        self
    }

    /// Add key/value data. Repeated calls merge, later keys win.
    pub fn data<I, K, V>(mut self, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        merge_entries(self.data.get_or_insert_with(Map::new), data);
        self
    }

    /// Address every device subscribed to `topic`
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Address devices matching a topic condition, e.g.
    /// `"'TopicA' in topics && 'TopicB' in topics"`
    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn android(mut self, config: AndroidConfig) -> Self {
        self.android = Some(config);
        self
    }

    pub fn apns(mut self, config: ApnsConfig) -> Self {
        self.apns = Some(config);
        self
    }

    pub fn webpush(mut self, config: WebpushConfig) -> Self {
        self.webpush = Some(config);
        self
    }

    pub fn analytics_label(mut self, label: impl Into<String>) -> Self {
        self.analytics_label = Some(label.into());
        self
    }

    /// Post `payload` verbatim, bypassing every structured field
    pub fn raw(mut self, payload: Value) -> Self {
        self.mode = PayloadMode::Raw(payload);
        self
    }

    /// Use the legacy bulk body. Ignored when a raw payload is already set.
    pub fn from_array<I, K, V>(mut self, payload: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        if matches!(self.mode, PayloadMode::Raw(_)) {
            return self;
        }
        let mut entries = Map::new();
        merge_entries(&mut entries, payload);
        self.mode = PayloadMode::Legacy(entries);
        self
    }

    pub fn mode(&self) -> &PayloadMode {
        &self.mode
    }

    /// Short name of the addressing mode, used in logs and metrics
    pub fn target_kind(&self) -> &'static str {
        match &self.mode {
            PayloadMode::Raw(_) => "raw",
            PayloadMode::Legacy(_) => "legacy",
            PayloadMode::Structured if self.topic.is_some() => "topic",
            PayloadMode::Structured if self.condition.is_some() => "condition",
            PayloadMode::Structured => "token",
        }
    }
}
