use std::sync::Arc;

use chrono::Duration;
use tokio::sync::Mutex;

use crate::config::TokenCacheConfig;
use crate::error::Result;
use crate::metrics::CredentialMetrics;

use super::fetcher::TokenFetcher;
use super::store::TokenStore;
use super::BearerToken;

/// Upper bound on the configured refresh skew
const MAX_REFRESH_SKEW_SECONDS: u64 = 86_400;

/// Caching behaviour of a [`CredentialProvider`]
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    /// When false every call fetches a fresh token and nothing is stored
    pub cache_enabled: bool,
    /// Tokens this close to expiry count as expired
    pub refresh_skew: Duration,
    pub key_prefix: String,
    pub tenant_id: String,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            refresh_skew: Duration::seconds(60),
            key_prefix: "fcm_auth_token".to_string(),
            tenant_id: "default".to_string(),
        }
    }
}

impl From<&TokenCacheConfig> for ProviderOptions {
    fn from(config: &TokenCacheConfig) -> Self {
        Self {
            cache_enabled: config.enabled,
            refresh_skew: Duration::seconds(
                config.refresh_skew_seconds.min(MAX_REFRESH_SKEW_SECONDS) as i64,
            ),
            key_prefix: config.prefix.clone(),
            tenant_id: config.tenant_id.clone(),
        }
    }
}

/// Hands out bearer tokens, reusing cached ones until they near expiry.
///
/// Refresh is single-flight: concurrent callers that miss the cache wait on
/// one fetch and then read its result from the store.
pub struct CredentialProvider {
    fetcher: Arc<dyn TokenFetcher>,
    store: Arc<dyn TokenStore>,
    options: ProviderOptions,
    cache_key: String,
    refresh_lock: Mutex<()>,
}

impl CredentialProvider {
    pub fn new(
        fetcher: Arc<dyn TokenFetcher>,
        store: Arc<dyn TokenStore>,
        options: ProviderOptions,
    ) -> Self {
        let cache_key = format!(
            "{}:{}:{}",
            options.key_prefix,
            options.tenant_id,
            fetcher.credential_id()
        );

        Self {
            fetcher,
            store,
            options,
            cache_key,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Key under which this provider's token is stored
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn tenant_id(&self) -> &str {
        &self.options.tenant_id
    }

    /// Return a valid access token, refreshing it if needed
    #[tracing::instrument(skip(self), fields(tenant_id = %self.options.tenant_id))]
    pub async fn bearer_token(&self) -> Result<String> {
        if !self.options.cache_enabled {
            return self.fetch().await.map(|token| token.access_token);
        }

        if let Some(token) = self.cached().await {
            CredentialMetrics::record_cache_hit();
            return Ok(token.access_token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the lock
        if let Some(token) = self.cached().await {
            CredentialMetrics::record_cache_hit();
            return Ok(token.access_token);
        }

        let token = self.fetch().await?;
        if let Err(e) = self.store.put(&self.cache_key, &token).await {
            tracing::warn!(error = %e, key = %self.cache_key, "Failed to cache bearer token");
        }

        Ok(token.access_token)
    }

    /// Drop the cached token so the next call refreshes
    pub async fn invalidate(&self) -> Result<()> {
        self.store.remove(&self.cache_key).await
    }

    async fn cached(&self) -> Option<BearerToken> {
        match self.store.get(&self.cache_key).await {
            Ok(Some(token)) if !token.expires_within(self.options.refresh_skew) => Some(token),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, key = %self.cache_key, "Token store read failed, refreshing");
                None
            }
        }
    }

    async fn fetch(&self) -> Result<BearerToken> {
        match self.fetcher.fetch().await {
            Ok(token) => {
                CredentialMetrics::record_refresh();
                tracing::info!(
                    credential = %self.fetcher.credential_id(),
                    expires_at = %token.expires_at,
                    "Bearer token refreshed"
                );
                Ok(token)
            }
            Err(e) => {
                CredentialMetrics::record_refresh_failure();
                tracing::error!(
                    credential = %self.fetcher.credential_id(),
                    error = %e,
                    "Bearer token refresh failed"
                );
                Err(e)
            }
        }
    }
}
