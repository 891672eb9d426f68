//! Android-specific options rendered under `message.android`.

use std::str::FromStr;

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::data::{coerce_map, merge_entries, DataMap};
use super::{duration_from_millis, parse_hex_color};
use crate::error::{PushError, Result};

/// Longest TTL the gateway accepts (4 weeks)
pub const MAX_TTL_SECONDS: i64 = 2_419_200;

/// Delivery priority of an Android message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AndroidMessagePriority {
    Normal,
    High,
}

impl FromStr for AndroidMessagePriority {
    type Err = PushError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            _ => Err(PushError::Validation(
                "Priority must be 'normal' or 'high'".to_string(),
            )),
        }
    }
}

/// Display priority of the notification on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotificationPriority {
    #[serde(rename = "PRIORITY_MIN")]
    Min,
    #[serde(rename = "PRIORITY_LOW")]
    Low,
    #[serde(rename = "PRIORITY_DEFAULT")]
    Default,
    #[serde(rename = "PRIORITY_HIGH")]
    High,
    #[serde(rename = "PRIORITY_MAX")]
    Max,
}

impl FromStr for NotificationPriority {
    type Err = PushError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PRIORITY_MIN" => Ok(Self::Min),
            "PRIORITY_LOW" => Ok(Self::Low),
            "PRIORITY_DEFAULT" => Ok(Self::Default),
            "PRIORITY_HIGH" => Ok(Self::High),
            "PRIORITY_MAX" => Ok(Self::Max),
            _ => Err(PushError::Validation(
                "Invalid notification priority. Must be one of: PRIORITY_MIN, PRIORITY_LOW, \
                 PRIORITY_DEFAULT, PRIORITY_HIGH, PRIORITY_MAX"
                    .to_string(),
            )),
        }
    }
}

/// Lock-screen visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    VisibilityUnspecified,
    Private,
    Public,
    Secret,
}

impl FromStr for Visibility {
    type Err = PushError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "VISIBILITY_UNSPECIFIED" => Ok(Self::VisibilityUnspecified),
            "PRIVATE" => Ok(Self::Private),
            "PUBLIC" => Ok(Self::Public),
            "SECRET" => Ok(Self::Secret),
            _ => Err(PushError::Validation(
                "Invalid visibility. Must be one of: VISIBILITY_UNSPECIFIED, PRIVATE, PUBLIC, SECRET"
                    .to_string(),
            )),
        }
    }
}

fn serialize_ttl<S: Serializer>(ttl: &Option<u64>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match ttl {
        Some(seconds) => serializer.serialize_str(&format!("{}s", seconds)),
        None => serializer.serialize_none(),
    }
}

/// Android message options.
///
/// Every field is optional and only fields that were set are serialized.
///
/// # Example
///
/// ```rust,ignore
/// let android = AndroidConfig::new()
///     .collapse_key("orders")
///     .priority("high")?
///     .ttl(3600)?
///     .notification(AndroidNotification::new().channel_id("orders"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AndroidConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    collapse_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<AndroidMessagePriority>,
    #[serde(
        rename = "ttl",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_ttl"
    )]
    ttl_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    restricted_package_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<DataMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<AndroidNotification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    direct_boot_ok: Option<bool>,
}

impl AndroidConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collapse key used to group messages on the device
    pub fn collapse_key(mut self, key: impl Into<String>) -> Self {
        self.collapse_key = Some(key.into());
        self
    }

    /// Set message priority, `"normal"` or `"high"`
    pub fn priority(mut self, priority: &str) -> Result<Self> {
        self.priority = Some(priority.parse()?);
        Ok(self)
    }

    /// Set time-to-live in seconds, between 0 and 2419200
    pub fn ttl(mut self, seconds: i64) -> Result<Self> {
        if !(0..=MAX_TTL_SECONDS).contains(&seconds) {
            return Err(PushError::Validation(format!(
                "TTL must be between 0 and {} seconds (4 weeks)",
                MAX_TTL_SECONDS
            )));
        }
        self.ttl_seconds = Some(seconds as u64);
        Ok(self)
    }

    /// Only deliver to apps with this package name
    pub fn restricted_package_name(mut self, package_name: impl Into<String>) -> Self {
        self.restricted_package_name = Some(package_name.into());
        self
    }

    /// Set Android-specific data, overriding the message data on Android
    pub fn data<I, K, V>(mut self, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut entries = serde_json::Map::new();
        merge_entries(&mut entries, data);
        self.data = Some(coerce_map(&entries));
        self
    }

    pub fn notification(mut self, notification: AndroidNotification) -> Self {
        self.notification = Some(notification);
        self
    }

    /// Allow delivery while the device is in direct boot mode
    pub fn direct_boot_ok(mut self, ok: bool) -> Self {
        self.direct_boot_ok = Some(ok);
        self
    }
}

/// LED color with channels normalized to `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LightColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl LightColor {
    fn from_hex(color: &str) -> Result<Self> {
        let [r, g, b] = parse_hex_color(color)?;
        Ok(Self {
            red: f64::from(r) / 255.0,
            green: f64::from(g) / 255.0,
            blue: f64::from(b) / 255.0,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightSettings {
    pub color: LightColor,
    pub light_on_duration: String,
    pub light_off_duration: String,
}

/// Android notification options rendered under `message.android.notification`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AndroidNotification {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    click_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body_loc_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body_loc_args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title_loc_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title_loc_args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ticker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sticky: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    local_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification_priority: Option<NotificationPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_sound: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_vibrate_timings: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_light_settings: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vibrate_timings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    light_settings: Option<LightSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

impl AndroidNotification {
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

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the icon color, `#RRGGBB`
    pub fn color(mut self, color: &str) -> Result<Self> {
        parse_hex_color(color)?;
        self.color = Some(color.to_string());
        Ok(self)
    }

    pub fn sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }

    /// Notifications with the same tag replace each other
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn click_action(mut self, action: impl Into<String>) -> Self {
        self.click_action = Some(action.into());
        self
    }

    pub fn body_loc_key(mut self, key: impl Into<String>) -> Self {
        self.body_loc_key = Some(key.into());
        self
    }

    pub fn body_loc_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body_loc_args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn title_loc_key(mut self, key: impl Into<String>) -> Self {
        self.title_loc_key = Some(key.into());
        self
    }

    pub fn title_loc_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.title_loc_args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Notification channel, required on Android O and above
    pub fn channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    pub fn ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    pub fn sticky(mut self, sticky: bool) -> Self {
        self.sticky = Some(sticky);
        self
    }

    /// Set the event time, an RFC 3339 timestamp
    pub fn event_time(mut self, timestamp: &str) -> Result<Self> {
        chrono::DateTime::parse_from_rfc3339(timestamp).map_err(|e| {
            PushError::Validation(format!("Event time must be an RFC 3339 timestamp: {}", e))
        })?;
        self.event_time = Some(timestamp.to_string());
        Ok(self)
    }

    /// Local-only notifications are not bridged to wearables
    pub fn local_only(mut self, local_only: bool) -> Self {
        self.local_only = Some(local_only);
        self
    }

    pub fn notification_priority(mut self, priority: &str) -> Result<Self> {
        self.notification_priority = Some(priority.parse()?);
        Ok(self)
    }

    pub fn default_sound(mut self, default: bool) -> Self {
        self.default_sound = Some(default);
        self
    }

    pub fn default_vibrate_timings(mut self, default: bool) -> Self {
        self.default_vibrate_timings = Some(default);
        self
    }

    pub fn default_light_settings(mut self, default: bool) -> Self {
        self.default_light_settings = Some(default);
        self
    }

    /// Set the vibration pattern, durations in milliseconds
    pub fn vibrate_timings<I>(mut self, timings_ms: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        self.vibrate_timings = Some(timings_ms.into_iter().map(duration_from_millis).collect());
        self
    }

    pub fn visibility(mut self, visibility: &str) -> Result<Self> {
        self.visibility = Some(visibility.parse()?);
        Ok(self)
    }

    /// Badge count shown on the launcher icon
    pub fn notification_count(mut self, count: i32) -> Self {
        self.notification_count = Some(count);
        self
    }

    /// Set LED color (`#RRGGBB`) and blink pattern in milliseconds
    pub fn light_settings(mut self, color: &str, on_ms: u64, off_ms: u64) -> Result<Self> {
        self.light_settings = Some(LightSettings {
            color: LightColor::from_hex(color)?,
            light_on_duration: duration_from_millis(on_ms),
            light_off_duration: duration_from_millis(off_ms),
        });
        Ok(self)
    }

    pub fn image(mut self, image_url: impl Into<String>) -> Self {
        self.image = Some(image_url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire<T: Serialize>(value: &T) -> Value {
        serde_json::to_value(value).unwrap()
    }

    #[test]
    fn test_empty_config_renders_empty_object() {
        assert_eq!(wire(&AndroidConfig::new()), json!({}));
        assert_eq!(wire(&AndroidNotification::new()), json!({}));
    }

    #[test]
    fn test_config_renders_only_set_fields() {
        let config = AndroidConfig::new()
            .collapse_key("orders")
            .priority("high")
            .unwrap()
            .ttl(3600)
            .unwrap()
            .restricted_package_name("com.example.app")
            .direct_boot_ok(true);

        assert_eq!(
            wire(&config),
            json!({
                "collapse_key": "orders",
                "priority": "high",
                "ttl": "3600s",
                "restricted_package_name": "com.example.app",
                "direct_boot_ok": true
            })
        );
    }

    #[test]
    fn test_priority_validation() {
        assert!(AndroidConfig::new().priority("normal").is_ok());
        let err = AndroidConfig::new().priority("urgent").unwrap_err();
        assert!(matches!(err, PushError::Validation(_)));
    }

    #[test]
    fn test_ttl_bounds() {
        assert!(AndroidConfig::new().ttl(0).is_ok());
        assert!(AndroidConfig::new().ttl(MAX_TTL_SECONDS).is_ok());
        assert!(AndroidConfig::new().ttl(-1).is_err());
        assert!(AndroidConfig::new().ttl(MAX_TTL_SECONDS + 1).is_err());

        let zero = AndroidConfig::new().ttl(0).unwrap();
        assert_eq!(wire(&zero)["ttl"], "0s");
    }

    #[test]
    fn test_data_is_string_coerced() {
        let config = AndroidConfig::new().data([
            ("count", json!(3)),
            ("flag", json!(false)),
            ("enabled", json!(true)),
            ("nested", json!({"a": 1})),
        ]);

        assert_eq!(
            wire(&config)["data"],
            json!({"count": "3", "flag": "", "enabled": "1", "nested": "{\"a\":1}"})
        );
    }

    #[test]
    fn test_color_validation() {
        assert!(AndroidNotification::new().color("red").is_err());

        let notification = AndroidNotification::new().color("#1A2B3C").unwrap();
        assert_eq!(wire(&notification)["color"], "#1A2B3C");
    }

    #[test]
    fn test_light_settings() {
        let notification = AndroidNotification::new()
            .light_settings("#00FF00", 1000, 500)
            .unwrap();

        assert_eq!(
            wire(&notification)["light_settings"],
            json!({
                "color": {"red": 0.0, "green": 1.0, "blue": 0.0},
                "light_on_duration": "1s",
                "light_off_duration": "0.5s"
            })
        );

        assert!(AndroidNotification::new().light_settings("green", 1000, 500).is_err());
    }

    #[test]
    fn test_vibrate_timings() {
        let notification = AndroidNotification::new().vibrate_timings([100, 200, 1000]);
        assert_eq!(
            wire(&notification)["vibrate_timings"],
            json!(["0.1s", "0.2s", "1s"])
        );
    }

    #[test]
    fn test_enum_fields() {
        let notification = AndroidNotification::new()
            .notification_priority("PRIORITY_HIGH")
            .unwrap()
            .visibility("PUBLIC")
            .unwrap();

        let value = wire(&notification);
        assert_eq!(value["notification_priority"], "PRIORITY_HIGH");
        assert_eq!(value["visibility"], "PUBLIC");

        assert!(AndroidNotification::new().notification_priority("INVALID").is_err());
        assert!(AndroidNotification::new().visibility("HIDDEN").is_err());
        assert_eq!(
            wire(&AndroidNotification::new().visibility("VISIBILITY_UNSPECIFIED").unwrap())
                ["visibility"],
            "VISIBILITY_UNSPECIFIED"
        );
    }

    #[test]
    fn test_event_time_validation() {
        assert!(AndroidNotification::new()
            .event_time("2024-06-24T10:00:00Z")
            .is_ok());
        assert!(AndroidNotification::new().event_time("yesterday").is_err());
    }

    #[test]
    fn test_nested_notification() {
        let config = AndroidConfig::new().notification(
            AndroidNotification::new()
                .title("Order shipped")
                .channel_id("orders")
                .sticky(false)
                .notification_count(2),
        );

        assert_eq!(
            wire(&config),
            json!({
                "notification": {
                    "title": "Order shipped",
                    "channel_id": "orders",
                    "sticky": false,
                    "notification_count": 2
                }
            })
        );
    }

    #[test]
    fn test_rendering_does_not_mutate() {
        let config = AndroidConfig::new().collapse_key("k");
        let first = wire(&config);
        let second = wire(&config);
        assert_eq!(first, second);
        assert_eq!(config, AndroidConfig::new().collapse_key("k"));
    }
}
