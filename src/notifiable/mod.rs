//! Adapter between application notification types and the dispatcher.
//!
//! A recipient type implements [`TokenSource`]; a notification type
//! implements [`FirebaseNotification`], overriding only the parts it needs.
//! [`FirebaseChannel`] turns the pair into a send.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::delivery::{DeliveryResult, PushDispatcher, Recipients};
use crate::error::Result;
use crate::message::{AndroidConfig, ApnsConfig, MessageDescriptor, WebpushConfig};

/// Recipient that knows its device tokens
pub trait TokenSource {
    fn fcm_tokens(&self) -> Recipients;
}

/// Which dispatcher operation a notification is sent with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    #[default]
    Notification,
    Message,
}

/// Push representation of an application notification.
///
/// Every method has a default; implementors override what they carry.
///
/// ```rust,ignore
/// struct OrderShipped { order_id: u64 }
///
/// impl FirebaseNotification<User> for OrderShipped {
///     fn title(&self, _user: &User) -> String {
///         "Order shipped".to_string()
///     }
///
///     fn data(&self, _user: &User) -> Option<Map<String, Value>> {
///         json!({"order_id": self.order_id}).as_object().cloned()
///     }
/// }
/// ```
pub trait FirebaseNotification<N: TokenSource + ?Sized> {
    fn title(&self, _notifiable: &N) -> String {
        "Notification".to_string()
    }

    fn body(&self, _notifiable: &N) -> String {
        "You have a new notification".to_string()
    }

    fn image(&self, _notifiable: &N) -> Option<String> {
        None
    }

    fn data(&self, _notifiable: &N) -> Option<Map<String, Value>> {
        None
    }

    fn topic(&self, _notifiable: &N) -> Option<String> {
        None
    }

    fn condition(&self, _notifiable: &N) -> Option<String> {
        None
    }

    /// When set, every other field is ignored
    fn raw(&self, _notifiable: &N) -> Option<Value> {
        None
    }

    /// Legacy bulk payload; when set, structured fields are ignored
    fn array_payload(&self, _notifiable: &N) -> Option<Map<String, Value>> {
        None
    }

    fn android_config(&self, _notifiable: &N) -> Option<AndroidConfig> {
        None
    }

    fn apns_config(&self, _notifiable: &N) -> Option<ApnsConfig> {
        None
    }

    fn webpush_config(&self, _notifiable: &N) -> Option<WebpushConfig> {
        None
    }

    fn analytics_label(&self, _notifiable: &N) -> Option<String> {
        None
    }

    fn delivery_method(&self, _notifiable: &N) -> DeliveryMethod {
        DeliveryMethod::Notification
    }

    fn tokens(&self, notifiable: &N) -> Recipients {
        notifiable.fcm_tokens()
    }

    fn to_descriptor(&self, notifiable: &N) -> MessageDescriptor {
        let mut message = MessageDescriptor::new()
            .title(self.title(notifiable))
            .body(self.body(notifiable));

        if let Some(image) = self.image(notifiable) {
            message = message.image(image);
        }
        if let Some(data) = self.data(notifiable) {
            message = message.data(data);
        }
        if let Some(topic) = self.topic(notifiable) {
            message = message.topic(topic);
        }
        if let Some(condition) = self.condition(notifiable) {
            message = message.condition(condition);
        }
        if let Some(config) = self.android_config(notifiable) {
            message = message.android(config);
        }
        if let Some(config) = self.apns_config(notifiable) {
            message = message.apns(config);
        }
        if let Some(config) = self.webpush_config(notifiable) {
            message = message.webpush(config);
        }
        if let Some(label) = self.analytics_label(notifiable) {
            message = message.analytics_label(label);
        }
        if let Some(array) = self.array_payload(notifiable) {
            message = message.from_array(array);
        }
        if let Some(raw) = self.raw(notifiable) {
            message = message.raw(raw);
        }

        message
    }
}

/// Sends application notifications through a [`PushDispatcher`]
#[derive(Clone)]
pub struct FirebaseChannel {
    dispatcher: Arc<PushDispatcher>,
}

impl FirebaseChannel {
    pub fn new(dispatcher: Arc<PushDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<PushDispatcher> {
        &self.dispatcher
    }

    pub async fn send<N, F>(&self, notifiable: &N, notification: &F) -> Result<DeliveryResult>
    where
        N: TokenSource + ?Sized,
        F: FirebaseNotification<N> + ?Sized,
    {
        if let Some(raw) = notification.raw(notifiable) {
            return self.dispatcher.send_raw(MessageDescriptor::new().raw(raw)).await;
        }

        let message = notification.to_descriptor(notifiable);
        let tokens = notification.tokens(notifiable);

        match notification.delivery_method(notifiable) {
            DeliveryMethod::Notification => {
                self.dispatcher.send_as_notification(message, tokens).await
            }
            DeliveryMethod::Message => self.dispatcher.send_as_message(message, tokens).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::PayloadMode;
    use serde_json::json;

    struct Device {
        tokens: &'static str,
    }

    impl TokenSource for Device {
        fn fcm_tokens(&self) -> Recipients {
            Recipients::from(self.tokens)
        }
    }

    struct Plain;

    impl FirebaseNotification<Device> for Plain {}

    struct Promo;

    impl FirebaseNotification<Device> for Promo {
        fn title(&self, _device: &Device) -> String {
            "Sale".to_string()
        }

        fn data(&self, _device: &Device) -> Option<Map<String, Value>> {
            json!({"discount": 20}).as_object().cloned()
        }

        fn topic(&self, _device: &Device) -> Option<String> {
            Some("deals".to_string())
        }

        fn analytics_label(&self, _device: &Device) -> Option<String> {
            Some("promo".to_string())
        }

        fn delivery_method(&self, _device: &Device) -> DeliveryMethod {
            DeliveryMethod::Message
        }
    }

    struct Legacy;

    impl FirebaseNotification<Device> for Legacy {
        fn array_payload(&self, _device: &Device) -> Option<Map<String, Value>> {
            json!({"kind": "bulk"}).as_object().cloned()
        }
    }

    #[test]
    fn test_defaults() {
        let device = Device { tokens: "a,b" };
        let message = Plain.to_descriptor(&device);

        assert_eq!(message.title.as_deref(), Some("Notification"));
        assert_eq!(message.body.as_deref(), Some("You have a new notification"));
        assert_eq!(message.mode(), &PayloadMode::Structured);
        assert_eq!(Plain.tokens(&device).len(), 2);
        assert_eq!(Plain.delivery_method(&device), DeliveryMethod::Notification);
    }

    #[test]
    fn test_overrides() {
        let device = Device { tokens: "a" };
        let message = Promo.to_descriptor(&device);

        assert_eq!(message.title.as_deref(), Some("Sale"));
        assert_eq!(message.target_kind(), "topic");
        assert_eq!(message.analytics_label.as_deref(), Some("promo"));
        assert_eq!(message.data.as_ref().unwrap()["discount"], json!(20));
    }

    #[test]
    fn test_array_payload_selects_legacy_mode() {
        let device = Device { tokens: "a" };
        assert_eq!(Legacy.to_descriptor(&device).target_kind(), "legacy");
    }

    #[test]
    fn test_delivery_method_deserialize() {
        let method: DeliveryMethod = serde_json::from_str(r#""message""#).unwrap();
        assert_eq!(method, DeliveryMethod::Message);
        assert!(serde_json::from_str::<DeliveryMethod>(r#""sms""#).is_err());
    }
}
