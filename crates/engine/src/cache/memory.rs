//! In-memory composition cache.
//!
//! A `tokio::sync::RwLock` over a `HashMap` keyed by digest. Lookups take
//! the write lock so the hit-count increment is atomic with the read;
//! administrative operations (clear, trim, cleanup) take the same lock and
//! are therefore serialized with stores.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::deps::Clock;

use super::entry::{CacheEntry, CacheStatistics, TopEntry};
use super::key::CacheKey;
use super::traits::{CompositionCache, Result};

pub struct InMemoryCompositionCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCompositionCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

#[async_trait]
impl CompositionCache for InMemoryCompositionCache {
    async fn lookup(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.hit_count += 1;
                Ok(Some(entry.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn store(&self, entry: CacheEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn delete_all(&self) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        debug!(target: "engine::cache", removed, "cache cleared");
        Ok(removed)
    }

    async fn cleanup_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(target: "engine::cache", removed, "expired entries cleaned up");
        }
        Ok(removed)
    }

    async fn trim_to_size(&self, max: usize) -> Result<usize> {
        let mut entries = self.entries.write().await;
        if entries.len() <= max {
            return Ok(0);
        }
        let mut by_age: Vec<(CacheKey, chrono::DateTime<chrono::Utc>)> = entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.created_at))
            .collect();
        // Oldest first; key as tie-break keeps eviction deterministic.
        by_age.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let excess = entries.len() - max;
        for (key, _) in by_age.into_iter().take(excess) {
            entries.remove(&key);
        }
        debug!(target: "engine::cache", evicted = excess, max, "cache trimmed");
        Ok(excess)
    }

    async fn statistics(&self, top_n: usize) -> Result<CacheStatistics> {
        let now = self.clock.now();
        let entries = self.entries.read().await;

        let total_hits: u64 = entries.values().map(|e| e.hit_count).sum();
        let expired_entries = entries.values().filter(|e| e.is_expired(now)).count();
        let approx_bytes: usize = entries.values().map(|e| e.approx_bytes).sum();
        let average_hits = if entries.is_empty() {
            0.0
        } else {
            total_hits as f64 / entries.len() as f64
        };

        let mut leaders: Vec<TopEntry> = entries
            .values()
            .map(|e| TopEntry {
                key: e.key.clone(),
                hit_count: e.hit_count,
            })
            .collect();
        leaders.sort_by(|a, b| b.hit_count.cmp(&a.hit_count).then_with(|| a.key.cmp(&b.key)));
        leaders.truncate(top_n);

        Ok(CacheStatistics {
            entries: entries.len(),
            expired_entries,
            total_hits,
            average_hits,
            top_entries: leaders,
            approx_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::ManualClock;
    use chrono::{Duration as ChronoDuration, Utc};
    use relic_core::{CombatContext, Composer, ComposeOptions, ENGINE_VERSION, RelicId};
    use std::time::Duration;

    fn entry_for(ids: &[&str], clock: &dyn Clock, ttl_secs: u64) -> CacheEntry {
        let relic_ids: Vec<RelicId> = ids.iter().map(|id| RelicId::from(*id)).collect();
        let ctx = CombatContext::default();
        let result = Composer::new()
            .compose(&[], &ctx, &ComposeOptions::default())
            .unwrap();
        let key = CacheKey::compute(&relic_ids, &ctx, ENGINE_VERSION);
        CacheEntry::new(
            key,
            relic_ids,
            ctx,
            result,
            clock.now(),
            Duration::from_secs(ttl_secs),
        )
    }

    #[tokio::test]
    async fn lookup_increments_hit_count() {
        let clock = Arc::new(ManualClock::starting_at(Utc::now()));
        let cache = InMemoryCompositionCache::new(clock.clone());
        let entry = entry_for(&["a"], clock.as_ref(), 3600);
        let key = entry.key.clone();
        cache.store(entry).await.unwrap();

        assert_eq!(cache.lookup(&key).await.unwrap().unwrap().hit_count, 1);
        assert_eq!(cache.lookup(&key).await.unwrap().unwrap().hit_count, 2);

        let stats = cache.statistics(5).await.unwrap();
        assert_eq!(stats.total_hits, 2);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn expired_entries_are_absent_but_counted_until_cleanup() {
        let clock = Arc::new(ManualClock::starting_at(Utc::now()));
        let cache = InMemoryCompositionCache::new(clock.clone());
        let entry = entry_for(&["a"], clock.as_ref(), 60);
        let key = entry.key.clone();
        cache.store(entry).await.unwrap();

        clock.advance(ChronoDuration::seconds(61));
        assert!(cache.lookup(&key).await.unwrap().is_none());

        let stats = cache.statistics(5).await.unwrap();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.expired_entries, 1);

        assert_eq!(cache.cleanup_expired().await.unwrap(), 1);
        assert_eq!(cache.statistics(5).await.unwrap().entries, 0);
    }

    #[tokio::test]
    async fn trim_evicts_oldest_first() {
        let clock = Arc::new(ManualClock::starting_at(Utc::now()));
        let cache = InMemoryCompositionCache::new(clock.clone());

        let oldest = entry_for(&["a"], clock.as_ref(), 3600);
        let oldest_key = oldest.key.clone();
        cache.store(oldest).await.unwrap();

        clock.advance(ChronoDuration::seconds(10));
        let newer = entry_for(&["b"], clock.as_ref(), 3600);
        let newer_key = newer.key.clone();
        cache.store(newer).await.unwrap();

        assert_eq!(cache.trim_to_size(1).await.unwrap(), 1);
        assert!(cache.lookup(&oldest_key).await.unwrap().is_none());
        assert!(cache.lookup(&newer_key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_all_reports_removed_count() {
        let clock = Arc::new(ManualClock::starting_at(Utc::now()));
        let cache = InMemoryCompositionCache::new(clock.clone());
        cache.store(entry_for(&["a"], clock.as_ref(), 3600)).await.unwrap();
        cache.store(entry_for(&["b"], clock.as_ref(), 3600)).await.unwrap();

        assert_eq!(cache.delete_all().await.unwrap(), 2);
        assert_eq!(cache.statistics(5).await.unwrap().entries, 0);
    }
}
