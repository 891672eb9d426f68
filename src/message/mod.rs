//! Message assembly: platform option sets, the message descriptor and the
//! wire envelope builder.
//!
//! # Payload modes
//!
//! A [`MessageDescriptor`] is in exactly one [`PayloadMode`]:
//!
//! - `Structured` (default): title/body/image/data plus option sets, rendered
//!   into one `{"message": {...}}` envelope per target
//! - `Raw`: a caller-supplied JSON object posted verbatim
//! - `Legacy`: a bulk `{registration_ids, data}` body posted once

pub mod android;
pub mod apns;
pub mod data;
mod descriptor;
mod envelope;
mod request;
pub mod webpush;

use crate::error::{PushError, Result};

pub use android::{
    AndroidConfig, AndroidMessagePriority, AndroidNotification, NotificationPriority, Visibility,
};
pub use apns::ApnsConfig;
pub use data::{coerce_map, coerce_value, DataMap};
pub use descriptor::{MessageDescriptor, PayloadMode};
pub use envelope::{build_envelopes, Envelope, EnvelopePlan, EnvelopeTarget};
pub use request::PushRequest;
pub use webpush::{Urgency, WebpushConfig};

/// Render a millisecond duration in the gateway's `"<seconds>s"` form.
///
/// 1000 → `"1s"`, 500 → `"0.5s"`, 1250 → `"1.25s"`.
pub(crate) fn duration_from_millis(ms: u64) -> String {
    let secs = ms / 1000;
    let frac = ms % 1000;
    if frac == 0 {
        return format!("{}s", secs);
    }

    let frac = format!("{:03}", frac);
    format!("{}.{}s", secs, frac.trim_end_matches('0'))
}

/// Parse a `#RRGGBB` color into its byte components.
pub(crate) fn parse_hex_color(color: &str) -> Result<[u8; 3]> {
    let invalid = || PushError::Validation("Color must be in #RRGGBB format".to_string());

    let hex = color.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => Ok([r, g, b]),
        _ => Err(invalid()),
    }
}
