//! Cached composition: validate, consult the cache, compose, store.

use std::sync::Arc;

use tracing::{debug, warn};

use relic_core::{
    CombatContext, ComposeOptions, Composer, CompositionResult, Deadline, ENGINE_VERSION, RelicId,
};

use crate::cache::{CacheEntry, CacheKey};
use crate::config::EngineConfig;
use crate::deps::EngineDeps;
use crate::error::EngineError;

use super::validation::{PreprocessBundle, SelectionWarning, ValidationService};

/// Per-request composition options.
#[derive(Clone, Copy, Debug)]
pub struct ComposeRequestOptions {
    /// Skip the cache lookup (the fresh result is still stored).
    pub force_recalculate: bool,
    /// Emit the ordered breakdown trail (on by default).
    pub include_breakdown: bool,
    /// Caller-supplied deadline; defaults to the configured timeout.
    pub deadline: Option<Deadline>,
}

impl Default for ComposeRequestOptions {
    fn default() -> Self {
        Self {
            force_recalculate: false,
            include_breakdown: true,
            deadline: None,
        }
    }
}

/// A composition result plus its caching and validation byproducts.
#[derive(Clone, Debug)]
pub struct CompositionOutcome {
    pub result: CompositionResult,
    pub bundle: PreprocessBundle,
    pub cache_key: CacheKey,
    pub cache_hit: bool,
}

/// Composition service: the engine surface for one relic selection.
#[derive(Clone)]
pub struct CompositionService {
    deps: EngineDeps,
    validation: ValidationService,
    composer: Arc<Composer>,
    config: EngineConfig,
}

impl CompositionService {
    pub fn new(deps: EngineDeps, composer: Arc<Composer>, config: EngineConfig) -> Self {
        Self {
            validation: ValidationService::new(deps.clone()),
            deps,
            composer,
            config,
        }
    }

    /// Validates, then returns the cached or freshly composed result.
    ///
    /// Cache lookup failures degrade to a miss and store failures are
    /// logged and suppressed — a computed result is always returned.
    pub async fn compose(
        &self,
        relic_ids: &[RelicId],
        context: &CombatContext,
        options: ComposeRequestOptions,
    ) -> Result<CompositionOutcome, EngineError> {
        let bundle = self.validation.validate(relic_ids, context, false).await?;
        let cache_key = CacheKey::compute(relic_ids, &bundle.context, ENGINE_VERSION);

        if !options.force_recalculate {
            match self.deps.cache.lookup(&cache_key).await {
                Ok(Some(entry)) => {
                    debug!(
                        target: "engine::composition",
                        key = %cache_key,
                        hits = entry.hit_count,
                        "cache hit"
                    );
                    let mut result = entry.result;
                    if !options.include_breakdown {
                        result.breakdown.clear();
                    }
                    return Ok(CompositionOutcome {
                        result,
                        bundle,
                        cache_key,
                        cache_hit: true,
                    });
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(target: "engine::composition", %error, "cache lookup failed; composing");
                }
            }
        }

        let deadline = options
            .deadline
            .unwrap_or_else(|| Deadline::after(self.config.composition_timeout));
        // Entries always carry the full breakdown trail; the same key
        // serves both breakdown-wanting and breakdown-skipping callers.
        let compose_options = ComposeOptions {
            include_breakdown: true,
            deadline,
        };

        let mut result = self
            .composer
            .compose(&bundle.relics, &bundle.context, &compose_options)?;
        attach_selection_warnings(&mut result, &bundle.warnings);

        let mut sorted_ids = relic_ids.to_vec();
        sorted_ids.sort();
        let entry = CacheEntry::new(
            cache_key.clone(),
            sorted_ids,
            bundle.context.clone(),
            result.clone(),
            self.deps.clock.now(),
            self.config.cache_ttl,
        );
        if let Err(error) = self.deps.cache.store(entry).await {
            warn!(target: "engine::composition", %error, "cache store failed; result still returned");
        }

        debug!(
            target: "engine::composition",
            key = %cache_key,
            multiplier = result.total_multiplier,
            "composed"
        );
        if !options.include_breakdown {
            result.breakdown.clear();
        }
        Ok(CompositionOutcome {
            result,
            bundle,
            cache_key,
            cache_hit: false,
        })
    }
}

/// Folds validation warnings into the result's warning list so cached and
/// fresh responses carry the same advisory text.
fn attach_selection_warnings(result: &mut CompositionResult, warnings: &[SelectionWarning]) {
    for warning in warnings {
        let text = warning.to_string();
        if !result.warnings.contains(&text) {
            result.warnings.push(text);
        }
    }
}
