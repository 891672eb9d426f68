use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Short-lived OAuth2 access token and the instant it stops being valid
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl BearerToken {
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Token valid for `expires_in` seconds from now.
    ///
    /// Lifetimes past the representable range saturate at the calendar
    /// bounds.
    pub fn expiring_in(access_token: impl Into<String>, expires_in: i64) -> Self {
        let expires_at = Duration::try_seconds(expires_in)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .unwrap_or(if expires_in < 0 {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            });

        Self::new(access_token, expires_at)
    }

    /// True when the token expires within `skew` of now (or already has)
    pub fn expires_within(&self, skew: Duration) -> bool {
        match Utc::now().checked_add_signed(skew) {
            Some(limit) => self.expires_at <= limit,
            None => skew > Duration::zero(),
        }
    }

    /// Whole seconds of validity left, zero once expired
    pub fn remaining_seconds(&self) -> u64 {
        (self.expires_at - Utc::now()).num_seconds().max(0) as u64
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
