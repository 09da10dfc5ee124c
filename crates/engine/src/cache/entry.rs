//! Cache entry and statistics types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use relic_core::{CombatContext, CompositionResult, RelicId};

use super::key::CacheKey;

/// One stored composition result with its input snapshot and expiry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    /// Input snapshot: sorted relic ids.
    pub relic_ids: Vec<RelicId>,
    /// Input snapshot: normalized context.
    pub context: CombatContext,
    pub result: CompositionResult,
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub hit_count: u64,
    /// Serialized result size, captured at store time for statistics.
    #[serde(default)]
    pub approx_bytes: usize,
}

impl CacheEntry {
    /// Builds a fresh entry expiring `ttl` after `now`.
    pub fn new(
        key: CacheKey,
        relic_ids: Vec<RelicId>,
        context: CombatContext,
        result: CompositionResult,
        now: DateTime<Utc>,
        ttl: std::time::Duration,
    ) -> Self {
        let approx_bytes = serde_json::to_vec(&result).map(|b| b.len()).unwrap_or(0);
        let engine_version = result.engine_version.clone();
        Self {
            key,
            relic_ids,
            context,
            result,
            engine_version,
            created_at: now,
            expires_at: now + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(1)),
            hit_count: 0,
            approx_bytes,
        }
    }

    /// Entries past their expiry are treated as absent by lookups.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Hit-count leader reported by statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopEntry {
    pub key: CacheKey,
    pub hit_count: u64,
}

/// Aggregate cache accounting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheStatistics {
    pub entries: usize,
    /// Expired entries still awaiting cleanup.
    pub expired_entries: usize,
    pub total_hits: u64,
    pub average_hits: f64,
    pub top_entries: Vec<TopEntry>,
    pub approx_bytes: usize,
}
