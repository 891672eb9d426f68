//! Bearer token storage

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::Result;

use super::BearerToken;

/// Token store backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStoreBackend {
    Memory,
    Redis,
}

/// Cache of bearer tokens keyed by credential key
/// (`<prefix>:<tenant>:<client_email>`).
#[async_trait]
pub trait TokenStore: Send + Sync {
    fn backend_type(&self) -> TokenStoreBackend;

    async fn get(&self, key: &str) -> Result<Option<BearerToken>>;

    async fn put(&self, key: &str, token: &BearerToken) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-process token store
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: DashMap<String, BearerToken>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    fn backend_type(&self) -> TokenStoreBackend {
        TokenStoreBackend::Memory
    }

    async fn get(&self, key: &str) -> Result<Option<BearerToken>> {
        Ok(self.tokens.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: &str, token: &BearerToken) -> Result<()> {
        self.tokens.insert(key.to_string(), token.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.tokens.remove(key);
        Ok(())
    }
}
