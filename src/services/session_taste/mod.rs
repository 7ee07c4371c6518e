// ============================================
// Session Taste Counters
// ============================================
//
// Persistence for the legacy per-session taste profile: one counter per
// archetype, incremented once per qualifying right-swipe, plus a total.
// Increments must be atomic at the store so concurrent requests in one
// session never lose counts to a read-modify-write race.
//
// Redis keys:
// - taste:{session_id}:counts - Sorted set of archetype counts
// - taste:{session_id}:total  - Total right-swipe counter

use crate::config::SessionConfig;
use crate::models::Archetype;
use crate::services::profile_builder::TasteProfile;
use async_trait::async_trait;
use dashmap::DashMap;
use redis::AsyncCommands;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SessionTasteError {
    #[error("Redis error: {0}")]
    RedisError(String),
}

pub type Result<T> = std::result::Result<T, SessionTasteError>;

/// Atomic counter store behind the legacy taste profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TasteCounterStore: Send + Sync {
    /// Record one right-swipe. `Unclassified` tags bump the total only.
    async fn record_right_swipe(&self, session_id: &str, tag: Archetype) -> Result<()>;

    async fn load(&self, session_id: &str) -> Result<TasteProfile>;

    async fn clear_session(&self, session_id: &str) -> Result<()>;
}

/// Redis-backed store. Sorted-set increments keep concurrent sessions exact.
pub struct RedisTasteStore {
    redis: redis::Client,
    /// Session TTL in seconds.
    taste_ttl: u64,
    key_prefix: String,
}

impl RedisTasteStore {
    pub fn new(redis: redis::Client, taste_ttl: u64) -> Self {
        Self {
            redis,
            taste_ttl,
            key_prefix: "taste".to_string(),
        }
    }

    /// Build the store from the engine's session settings so the TTL knob
    /// governs key expiry.
    pub fn from_config(redis: redis::Client, session: &SessionConfig) -> Self {
        Self::new(redis, session.taste_ttl_seconds)
    }

    fn counts_key(&self, session_id: &str) -> String {
        format!("{}:{}:counts", self.key_prefix, session_id)
    }

    fn total_key(&self, session_id: &str) -> String {
        format!("{}:{}:total", self.key_prefix, session_id)
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.redis
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| SessionTasteError::RedisError(e.to_string()))
    }
}

#[async_trait]
impl TasteCounterStore for RedisTasteStore {
    async fn record_right_swipe(&self, session_id: &str, tag: Archetype) -> Result<()> {
        let mut conn = self.connection().await?;

        let total_key = self.total_key(session_id);
        let _: () = conn
            .incr(&total_key, 1u32)
            .await
            .map_err(|e| SessionTasteError::RedisError(e.to_string()))?;
        let _: () = conn
            .expire(&total_key, self.taste_ttl as i64)
            .await
            .map_err(|e| SessionTasteError::RedisError(e.to_string()))?;

        if !tag.is_unclassified() {
            let counts_key = self.counts_key(session_id);
            let _: () = conn
                .zincr(&counts_key, tag.as_str(), 1u32)
                .await
                .map_err(|e| SessionTasteError::RedisError(e.to_string()))?;
            let _: () = conn
                .expire(&counts_key, self.taste_ttl as i64)
                .await
                .map_err(|e| SessionTasteError::RedisError(e.to_string()))?;
        }

        debug!(
            session_id = session_id,
            tag = %tag,
            "Session taste updated"
        );

        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<TasteProfile> {
        let mut conn = self.connection().await?;

        let raw: Vec<(String, u32)> = conn
            .zrange_withscores(self.counts_key(session_id), 0, -1)
            .await
            .map_err(|e| SessionTasteError::RedisError(e.to_string()))?;

        let total: Option<u32> = conn
            .get(self.total_key(session_id))
            .await
            .map_err(|e| SessionTasteError::RedisError(e.to_string()))?;

        let mut counts: HashMap<Archetype, u32> = HashMap::new();
        for (tag, count) in raw {
            let archetype = Archetype::parse_tag(&tag);
            if !archetype.is_unclassified() {
                counts.insert(archetype, count);
            }
        }

        Ok(TasteProfile::from_counts(counts, total.unwrap_or(0)))
    }

    async fn clear_session(&self, session_id: &str) -> Result<()> {
        let mut conn = self.connection().await?;

        let _: () = conn
            .del(vec![self.counts_key(session_id), self.total_key(session_id)])
            .await
            .map_err(|e| SessionTasteError::RedisError(e.to_string()))?;

        info!(session_id = session_id, "Session taste cleared");

        Ok(())
    }
}

/// In-memory store for tests and embedded use. Per-session entries mutate
/// under the map shard lock, which keeps increments atomic.
#[derive(Debug, Default)]
pub struct InMemoryTasteStore {
    profiles: DashMap<String, TasteProfile>,
}

impl InMemoryTasteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TasteCounterStore for InMemoryTasteStore {
    async fn record_right_swipe(&self, session_id: &str, tag: Archetype) -> Result<()> {
        self.profiles
            .entry(session_id.to_string())
            .or_default()
            .record_right_swipe(tag);
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<TasteProfile> {
        Ok(self
            .profiles
            .get(session_id)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }

    async fn clear_session(&self, session_id: &str) -> Result<()> {
        self.profiles.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn redis_store_takes_its_ttl_from_session_config() {
        let client = redis::Client::open("redis://127.0.0.1/").unwrap();
        let session = SessionConfig {
            taste_ttl_seconds: 900,
        };

        let store = RedisTasteStore::from_config(client, &session);
        assert_eq!(store.taste_ttl, 900);
        assert_eq!(store.counts_key("s-1"), "taste:s-1:counts");
    }

    #[tokio::test]
    async fn swipes_accumulate_per_session() {
        let store = InMemoryTasteStore::new();
        store.record_right_swipe("s-1", Archetype::Nomad).await.unwrap();
        store.record_right_swipe("s-1", Archetype::Nomad).await.unwrap();
        store
            .record_right_swipe("s-1", Archetype::Unclassified)
            .await
            .unwrap();
        store.record_right_swipe("s-2", Archetype::Purist).await.unwrap();

        let taste = store.load("s-1").await.unwrap();
        assert_eq!(taste.count(Archetype::Nomad), 2);
        assert_eq!(taste.total_swipes(), 3);

        let other = store.load("s-2").await.unwrap();
        assert_eq!(other.count(Archetype::Purist), 1);
        assert_eq!(other.total_swipes(), 1);
    }

    #[tokio::test]
    async fn unknown_session_loads_empty() {
        let store = InMemoryTasteStore::new();
        let taste = store.load("nope").await.unwrap();
        assert!(taste.is_empty());
    }

    #[tokio::test]
    async fn clear_session_resets_counts() {
        let store = InMemoryTasteStore::new();
        store.record_right_swipe("s-1", Archetype::Curator).await.unwrap();
        store.clear_session("s-1").await.unwrap();

        let taste = store.load("s-1").await.unwrap();
        assert!(taste.is_empty());
    }

    #[tokio::test]
    async fn concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemoryTasteStore::new());

        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.record_right_swipe("s-1", Archetype::Futurist).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let taste = store.load("s-1").await.unwrap();
        assert_eq!(taste.count(Archetype::Futurist), 32);
        assert_eq!(taste.total_swipes(), 32);
    }
}
