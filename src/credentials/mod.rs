//! Service-account credentials and bearer token management.
//!
//! A [`CredentialProvider`] signs an RS256 assertion with the service-account
//! key, exchanges it at the Google token endpoint and caches the resulting
//! bearer token in a [`TokenStore`] until it nears expiry.

mod assertion;
mod fetcher;
mod provider;
mod redis_store;
mod service_account;
mod store;
mod token;

use std::sync::Arc;

use crate::config::{Settings, TokenCacheConfig};
use crate::error::Result;

pub use assertion::{AssertionClaims, AssertionSigner, JWT_BEARER_GRANT_TYPE};
pub use fetcher::{GoogleTokenFetcher, TokenFetcher};
pub use provider::{CredentialProvider, ProviderOptions};
pub use redis_store::RedisTokenStore;
pub use service_account::ServiceAccountKey;
pub use store::{MemoryTokenStore, TokenStore, TokenStoreBackend};
pub use token::BearerToken;

/// Create a token store based on configuration.
///
/// Falls back to the in-memory store when Redis is requested but unreachable.
pub async fn create_token_store(config: &TokenCacheConfig) -> Arc<dyn TokenStore> {
    match config.backend.to_lowercase().as_str() {
        "redis" => match RedisTokenStore::new(&config.redis_url) {
            Ok(store) => match store.ping().await {
                Ok(()) => {
                    tracing::info!(
                        tenant_id = %config.tenant_id,
                        prefix = %config.prefix,
                        "Using Redis token store"
                    );
                    Arc::new(store)
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Redis token store unavailable, falling back to memory store"
                    );
                    Arc::new(MemoryTokenStore::new())
                }
            },
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Invalid Redis URL for token store, falling back to memory store"
                );
                Arc::new(MemoryTokenStore::new())
            }
        },
        "memory" => {
            tracing::info!("Using in-memory token store");
            Arc::new(MemoryTokenStore::new())
        }
        other => {
            tracing::warn!(
                backend = %other,
                "Unknown token store backend, using in-memory store"
            );
            Arc::new(MemoryTokenStore::new())
        }
    }
}

/// Build a provider from the configured credentials file and token cache
pub async fn create_credential_provider(
    settings: &Settings,
    http: reqwest::Client,
) -> Result<Arc<CredentialProvider>> {
    let key = ServiceAccountKey::from_file(&settings.firebase.credentials_path)?;
    let fetcher = GoogleTokenFetcher::new(key, settings.firebase.scope.clone(), http)?;
    let store = create_token_store(&settings.token_cache).await;

    Ok(Arc::new(CredentialProvider::new(
        Arc::new(fetcher),
        store,
        ProviderOptions::from(&settings.token_cache),
    )))
}
