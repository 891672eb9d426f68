use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::{PushError, Result};

use super::ServiceAccountKey;

/// Grant type of the signed-JWT assertion exchange
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion
pub const ASSERTION_LIFETIME_SECONDS: i64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Issuer (service-account email)
    pub iss: String,
    /// Subject (service-account email)
    pub sub: String,
    /// Space-separated OAuth2 scopes
    pub scope: String,
    /// Audience (token endpoint)
    pub aud: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AssertionClaims {
    pub fn new(key: &ServiceAccountKey, scope: &str, issued_at: DateTime<Utc>) -> Self {
        Self {
            iss: key.client_email.clone(),
            sub: key.client_email.clone(),
            scope: scope.to_string(),
            aud: key.token_uri.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(ASSERTION_LIFETIME_SECONDS)).timestamp(),
        }
    }
}

/// Signs RS256 assertions with a service-account private key
pub struct AssertionSigner {
    encoding_key: EncodingKey,
    header: Header,
}

impl AssertionSigner {
    pub fn new(key: &ServiceAccountKey) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| PushError::Auth(format!("Invalid service-account private key: {}", e)))?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(key.private_key_id.clone());

        Ok(Self {
            encoding_key,
            header,
        })
    }

    pub fn sign(&self, claims: &AssertionClaims) -> Result<String> {
        encode(&self.header, claims, &self.encoding_key)
            .map_err(|e| PushError::Auth(format!("Failed to sign assertion: {}", e)))
    }
}
