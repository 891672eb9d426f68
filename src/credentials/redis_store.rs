//! Redis-backed token store shared across processes

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::RwLock;

use crate::error::{PushError, Result};

use super::store::{TokenStore, TokenStoreBackend};
use super::BearerToken;

/// Stores tokens as JSON with a TTL equal to their remaining lifetime.
///
/// The connection is established lazily on first use.
pub struct RedisTokenStore {
    client: Client,
    connection: RwLock<Option<ConnectionManager>>,
}

impl RedisTokenStore {
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::open(url)?;

        Ok(Self {
            client,
            connection: RwLock::new(None),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        {
            let conn = self.connection.read().await;
            if let Some(ref c) = *conn {
                return Ok(c.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // Another task may have connected while we waited
        if let Some(ref c) = *conn_guard {
            return Ok(c.clone());
        }

        match ConnectionManager::new(self.client.clone()).await {
            Ok(conn) => {
                *conn_guard = Some(conn.clone());
                tracing::info!("Redis token store connection established");
                Ok(conn)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect token store to Redis");
                Err(e.into())
            }
        }
    }

    /// Verify Redis is reachable
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    fn backend_type(&self) -> TokenStoreBackend {
        TokenStoreBackend::Redis
    }

    async fn get(&self, key: &str) -> Result<Option<BearerToken>> {
        let mut conn = self.connection().await?;
        let stored: Option<String> = conn.get(key).await?;

        stored
            .map(|json| {
                serde_json::from_str(&json)
                    .map_err(|e| PushError::Store(format!("Corrupt cached token: {}", e)))
            })
            .transpose()
    }

    async fn put(&self, key: &str, token: &BearerToken) -> Result<()> {
        let ttl = token.remaining_seconds();
        if ttl == 0 {
            return Ok(());
        }

        let json = serde_json::to_string(token)
            .map_err(|e| PushError::Store(format!("Failed to serialize token: {}", e)))?;

        let mut conn = self.connection().await?;
        let _: () = conn.set_ex(key, json, ttl).await?;

        tracing::debug!(key = %key, ttl_seconds = ttl, "Cached bearer token in Redis");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.del(key).await?;
        Ok(())
    }
}
