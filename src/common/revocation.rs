// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Token revocation list keyed by `jti`, with a time-to-live per entry.

use crate::{PlatformError, PlatformResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::info;

#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Mark `jti` revoked for `ttl`.
    async fn revoke(&self, jti: &str, ttl: Duration) -> PlatformResult<()>;

    async fn is_revoked(&self, jti: &str) -> PlatformResult<bool>;
}

/// Longest time an entry is kept. Tokens never live this long.
pub const MAX_REVOCATION_TTL: Duration = Duration::from_secs(366 * 24 * 60 * 60);

fn check_entry(jti: &str, ttl: Duration) -> PlatformResult<()> {
    if jti.trim().is_empty() {
        return Err(PlatformError::Validation("jti is required".to_string()));
    }
    if ttl.is_zero() {
        return Err(PlatformError::Validation(
            "ttlSeconds must be positive".to_string(),
        ));
    }
    if ttl > MAX_REVOCATION_TTL {
        return Err(PlatformError::Validation(format!(
            "ttlSeconds must be at most {}",
            MAX_REVOCATION_TTL.as_secs()
        )));
    }
    Ok(())
}

/// Revocation list held in process memory. Only shared by services running
/// in the same process.
#[derive(Default)]
pub struct MemoryRevocationStore {
    entries: RwLock<HashMap<String, Instant>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, jti: &str, ttl: Duration) -> PlatformResult<()> {
        check_entry(jti, ttl)?;
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| PlatformError::Validation("ttlSeconds is too large".to_string()))?;
        let mut entries = self.entries.write().await;
        entries.retain(|_, expires_at| *expires_at > now);
        entries.insert(jti.to_string(), expires_at);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> PlatformResult<bool> {
        Ok(self
            .entries
            .read()
            .await
            .get(jti)
            .is_some_and(|expires_at| *expires_at > Instant::now()))
    }
}

#[cfg(feature = "redis-revocation")]
pub use redis_store::RedisRevocationStore;

#[cfg(feature = "redis-revocation")]
mod redis_store {
    use super::*;
    use redis::aio::ConnectionManager;

    const KEY_PREFIX: &str = "revoked:";

    /// Revocation list in Redis, shared by the auth service and the gateway.
    #[derive(Clone)]
    pub struct RedisRevocationStore {
        connection: ConnectionManager,
    }

    impl RedisRevocationStore {
        pub async fn connect(url: &str) -> PlatformResult<Self> {
            let client = redis::Client::open(url)
                .map_err(|e| {
                PlatformError::Internal(format!("Failed to create Redis client: {e}"))
            })?;
            let connection = client
                .get_connection_manager()
                .await
                .map_err(|e| PlatformError::Internal(format!("Failed to connect to Redis: {e}")))?;
            Ok(Self { connection })
        }
    }

    #[async_trait]
    impl RevocationStore for RedisRevocationStore {
        async fn revoke(&self, jti: &str, ttl: Duration) -> PlatformResult<()> {
            check_entry(jti, ttl)?;
            let mut conn = self.connection.clone();
            redis::cmd("SET")
                .arg(format!("{KEY_PREFIX}{jti}"))
                .arg(1)
                .arg("EX")
                .arg(ttl.as_secs().max(1))
                .query_async::<_, ()>(&mut conn)
                .await
                .map_err(|e| PlatformError::Internal(format!("Redis SET failed: {e}")))
        }

        async fn is_revoked(&self, jti: &str) -> PlatformResult<bool> {
            let mut conn = self.connection.clone();
            redis::cmd("EXISTS")
                .arg(format!("{KEY_PREFIX}{jti}"))
                .query_async::<_, bool>(&mut conn)
                .await
                .map_err(|e| PlatformError::Internal(format!("Redis EXISTS failed: {e}")))
        }
    }
}

/// Open the revocation store: Redis when a URL is configured and the
/// `redis-revocation` feature is on, memory otherwise.
pub async fn open(redis_url: Option<&str>) -> PlatformResult<Arc<dyn RevocationStore>> {
    match redis_url {
        #[cfg(feature = "redis-revocation")]
        Some(url) => {
            info!("Using Redis revocation list");
            Ok(Arc::new(RedisRevocationStore::connect(url).await?))
        }
        #[cfg(not(feature = "redis-revocation"))]
        Some(_) => {
            tracing::warn!(
                "redis_url is set but the redis-revocation feature is off, using memory"
            );
            Ok(Arc::new(MemoryRevocationStore::new()))
        }
        None => {
            info!("Using in-memory revocation list");
            Ok(Arc::new(MemoryRevocationStore::new()))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_revoked_until_ttl_elapses() {
        let store = MemoryRevocationStore::new();
        assert!(!store.is_revoked("abc").await.expect("lookup"));

        store
            .revoke("abc", Duration::from_millis(50))
            .await
            .expect("revoke");
        assert!(store.is_revoked("abc").await.expect("lookup"));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!store.is_revoked("abc").await.expect("lookup"));
    }

    #[tokio::test]
    async fn test_zero_ttl_rejected() {
        let store = MemoryRevocationStore::new();
        assert!(matches!(
            store.revoke("abc", Duration::ZERO).await,
            Err(PlatformError::Validation(_))
        ));
        assert!(store.revoke(" ", Duration::from_secs(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_oversized_ttl_rejected() {
        let store = MemoryRevocationStore::new();
        assert!(matches!(
            store.revoke("abc", Duration::from_secs(u64::MAX)).await,
            Err(PlatformError::Validation(_))
        ));
        assert!(!store.is_revoked("abc").await.expect("lookup"));
        store
            .revoke("abc", MAX_REVOCATION_TTL)
            .await
            .expect("revoke at the cap");
        assert!(store.is_revoked("abc").await.expect("lookup"));
    }

    #[tokio::test]
    async fn test_open_without_url_uses_memory() {
        let store = open(None).await.expect("store");
        store.revoke("x", Duration::from_secs(5)).await.expect("revoke");
        assert!(store.is_revoked("x").await.expect("lookup"));
    }
}
