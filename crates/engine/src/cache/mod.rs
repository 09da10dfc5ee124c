//! Memoization cache capability: content-addressed composition results.
//!
//! Keys are SHA-256 digests over a canonical JSON encoding of
//! `(sorted relic ids, normalized context, engine version)`, so permutations
//! of the same selection hit the same entry and an engine version bump
//! silently invalidates everything prior.

mod entry;
mod key;
mod memory;
mod traits;

pub use entry::{CacheEntry, CacheStatistics, TopEntry};
pub use key::CacheKey;
pub use memory::InMemoryCompositionCache;
pub use traits::{CacheError, CompositionCache, Result};
