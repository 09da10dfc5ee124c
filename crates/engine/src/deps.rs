//! Explicit dependency bundle threaded into the engine at construction.
//!
//! No implicit globals: the repository, cache, and clock the engine
//! consumes all arrive through [`EngineDeps`], so tests swap any of them
//! without touching process state.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use crate::cache::{CompositionCache, InMemoryCompositionCache};
use crate::repository::{InMemoryRelicRepo, RelicRepository};

/// Wall-clock source for cache TTLs and statistics.
///
/// Deadlines use `std::time::Instant` directly (monotonic time is not worth
/// abstracting); only wall-clock reads go through this trait.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for TTL and expiry tests.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// The capabilities the engine consumes, bundled for construction.
#[derive(Clone)]
pub struct EngineDeps {
    pub repo: Arc<dyn RelicRepository>,
    pub cache: Arc<dyn CompositionCache>,
    pub clock: Arc<dyn Clock>,
}

impl EngineDeps {
    pub fn new(
        repo: Arc<dyn RelicRepository>,
        cache: Arc<dyn CompositionCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repo, cache, clock }
    }

    /// Fully in-memory bundle: empty repository, memory cache, system clock.
    pub fn in_memory() -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            repo: Arc::new(InMemoryRelicRepo::new()),
            cache: Arc::new(InMemoryCompositionCache::new(Arc::clone(&clock))),
            clock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::starting_at(Utc::now());
        let before = clock.now();
        clock.advance(Duration::minutes(90));
        assert_eq!(clock.now() - before, Duration::minutes(90));
    }
}
