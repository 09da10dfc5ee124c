//! Engine configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use relic_core::{CombatStyle, RelicId};

/// Tunables for the engine's services.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Cooperative deadline for a single composition (default 5 s).
    pub composition_timeout: Duration,
    /// Wall-clock budget for a whole optimization run (default 10 s).
    pub optimization_timeout: Duration,
    /// Time-to-live for cached composition results (default 1 hour).
    pub cache_ttl: Duration,
    /// Entry cap enforced by `trim_to_size` (default 10 000).
    pub cache_max_entries: usize,
    /// How many top-hit entries cache statistics report.
    pub cache_top_n: usize,
    pub optimizer: OptimizerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            composition_timeout: Duration::from_secs(5),
            optimization_timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(3600),
            cache_max_entries: 10_000,
            cache_top_n: 10,
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_composition_timeout(mut self, timeout: Duration) -> Self {
        self.composition_timeout = timeout;
        self
    }

    pub fn with_optimization_timeout(mut self, timeout: Duration) -> Self {
        self.optimization_timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_cache_max_entries(mut self, max: usize) -> Self {
        self.cache_max_entries = max;
        self
    }

    pub fn with_optimizer(mut self, optimizer: OptimizerConfig) -> Self {
        self.optimizer = optimizer;
        self
    }
}

/// Candidate-evaluation tunables for the optimization service.
///
/// `meta_builds` holds per-combat-style canonical relic lists, filtered by
/// candidate-pool membership at generation time. This is configuration
/// data, deliberately not a hard-coded id table.
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
    /// Hard cap on composed candidates per run (default 1000).
    pub max_evaluations: usize,
    /// Minimum multiplier gain for a suggestion to survive (default 0.05).
    pub min_improvement: f64,
    /// Suggestions returned after ranking (default 5).
    pub max_suggestions: usize,
    pub meta_builds: BTreeMap<CombatStyle, Vec<Vec<RelicId>>>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_evaluations: 1000,
            min_improvement: 0.05,
            max_suggestions: 5,
            meta_builds: BTreeMap::new(),
        }
    }
}

impl OptimizerConfig {
    pub fn with_max_evaluations(mut self, max: usize) -> Self {
        self.max_evaluations = max;
        self
    }

    pub fn with_min_improvement(mut self, min: f64) -> Self {
        self.min_improvement = min;
        self
    }

    pub fn with_meta_build(
        mut self,
        style: CombatStyle,
        relic_ids: impl IntoIterator<Item = RelicId>,
    ) -> Self {
        self.meta_builds
            .entry(style)
            .or_default()
            .push(relic_ids.into_iter().collect());
        self
    }
}
