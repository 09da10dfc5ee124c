//! Cache capability contract.

use async_trait::async_trait;
use thiserror::Error;

use super::entry::{CacheEntry, CacheStatistics};
use super::key::CacheKey;

/// Errors surfaced by cache implementations.
///
/// Store failures are logged and suppressed by the composition service;
/// lookup failures degrade to a cache miss.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// Content-addressed storage of composition results.
///
/// Implementations must make `lookup`'s read-then-increment a single atomic
/// step, and serialize administrative clears/trims with respect to stores.
/// Double-store races may resolve to last-writer-wins: results are
/// deterministic for a fixed engine version, so both writers carry the
/// same payload.
#[async_trait]
pub trait CompositionCache: Send + Sync {
    /// Returns the live entry for `key`, atomically incrementing its hit
    /// count. Expired entries are treated as absent (they remain stored
    /// until [`CompositionCache::cleanup_expired`]).
    async fn lookup(&self, key: &CacheKey) -> Result<Option<CacheEntry>>;

    /// Upserts an entry; an existing entry under the same key is replaced.
    async fn store(&self, entry: CacheEntry) -> Result<()>;

    /// Drops every entry, returning how many were removed.
    async fn delete_all(&self) -> Result<usize>;

    /// Deletes all expired entries, returning how many were removed.
    async fn cleanup_expired(&self) -> Result<usize>;

    /// Evicts oldest-by-creation entries until at most `max` remain.
    /// Returns how many were evicted.
    async fn trim_to_size(&self, max: usize) -> Result<usize>;

    /// Aggregate accounting, reporting up to `top_n` hit leaders.
    async fn statistics(&self, top_n: usize) -> Result<CacheStatistics>;
}
