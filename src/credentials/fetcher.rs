use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::error::{PushError, Result};

use super::assertion::{AssertionClaims, AssertionSigner, JWT_BEARER_GRANT_TYPE};
use super::{BearerToken, ServiceAccountKey};

/// Source of fresh bearer tokens
#[async_trait]
pub trait TokenFetcher: Send + Sync {
    /// Identity the tokens are issued to; part of the cache key
    fn credential_id(&self) -> &str;

    /// Obtain a new token, bypassing any cache
    async fn fetch(&self) -> Result<BearerToken>;
}

/// Longest token lifetime accepted from the token endpoint
const MAX_TOKEN_LIFETIME_SECONDS: i64 = 86_400;

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Exchanges signed service-account assertions at the Google token endpoint
pub struct GoogleTokenFetcher {
    key: ServiceAccountKey,
    signer: AssertionSigner,
    scope: String,
    http: reqwest::Client,
}

impl GoogleTokenFetcher {
    pub fn new(key: ServiceAccountKey, scope: impl Into<String>, http: reqwest::Client) -> Result<Self> {
        let signer = AssertionSigner::new(&key)?;

        Ok(Self {
            key,
            signer,
            scope: scope.into(),
            http,
        })
    }

    pub fn service_account(&self) -> &ServiceAccountKey {
        &self.key
    }
}

#[async_trait]
impl TokenFetcher for GoogleTokenFetcher {
    fn credential_id(&self) -> &str {
        &self.key.client_email
    }

    async fn fetch(&self) -> Result<BearerToken> {
        let claims = AssertionClaims::new(&self.key, &self.scope, Utc::now());
        let assertion = self.signer.sign(&claims)?;

        let params = [
            ("grant_type", JWT_BEARER_GRANT_TYPE),
            ("assertion", assertion.as_str()),
        ];

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| PushError::Auth(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Auth(format!(
                "Token endpoint rejected assertion with status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| PushError::Auth(format!("Malformed token response: {}", e)))?;

        if token.expires_in <= 0 || token.expires_in > MAX_TOKEN_LIFETIME_SECONDS {
            return Err(PushError::Auth(format!(
                "Malformed token response: expires_in {} outside 1..={}",
                token.expires_in, MAX_TOKEN_LIFETIME_SECONDS
            )));
        }

        tracing::debug!(
            client_email = %self.key.client_email,
            expires_in = token.expires_in,
            "Obtained bearer token"
        );

        Ok(BearerToken::expiring_in(token.access_token, token.expires_in))
    }
}
