//! Build optimization: generate candidates, evaluate under budget, rank.

mod candidates;
mod suggestion;

pub use suggestion::{SuggestedRelic, Suggestion};

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use relic_core::{CombatContext, CombatStyle, Deadline, Relic, RelicCategory, RelicId};

use crate::config::EngineConfig;
use crate::deps::EngineDeps;
use crate::error::{EngineError, OptError};
use crate::repository::RelicFilter;

use super::analysis::PerformanceTier;
use super::composition::{ComposeRequestOptions, CompositionService};

/// Hard constraints on the candidate pool.
#[derive(Clone, Debug, Default)]
pub struct OptimizationConstraints {
    pub max_difficulty: Option<u8>,
    pub allowed_categories: Vec<RelicCategory>,
    pub exclude_relic_ids: Vec<RelicId>,
}

/// Soft preferences applied to filtering and ranking.
#[derive(Clone, Debug, Default)]
pub struct OptimizationPreferences {
    /// Prefer higher rarity on improvement ties.
    pub prefer_high_rarity: bool,
    /// Prefer lower difficulty on improvement ties.
    pub prefer_low_difficulty: bool,
    /// Override for the configured minimum improvement threshold.
    pub min_improvement: Option<f64>,
}

/// One optimization request.
#[derive(Clone, Debug, Default)]
pub struct OptimizationRequest {
    /// Current build; may be empty for greenfield suggestions.
    pub current_ids: Vec<RelicId>,
    pub combat_style: CombatStyle,
    pub constraints: OptimizationConstraints,
    pub preferences: OptimizationPreferences,
    pub context: Option<CombatContext>,
    /// Caller-supplied deadline overriding the configured budget.
    pub deadline: Option<Deadline>,
    /// Return accumulated suggestions instead of failing on timeout.
    pub allow_partial_on_timeout: bool,
}

/// Run accounting returned with every optimization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OptimizationMetadata {
    pub generated: usize,
    pub evaluated: usize,
    /// Candidates whose composition failed and were skipped.
    pub skipped: usize,
    /// True when the evaluation cap cut the run short.
    pub truncated: bool,
    /// True when the deadline cut the run short (partial results).
    pub timed_out: bool,
    pub elapsed_ms: u64,
}

#[derive(Clone, Debug)]
pub struct OptimizationResult {
    pub suggestions: Vec<Suggestion>,
    pub current_multiplier: f64,
    pub current_rating: PerformanceTier,
    pub metadata: OptimizationMetadata,
}

/// Optimization service over the repository and cached composition.
#[derive(Clone)]
pub struct OptimizationService {
    deps: EngineDeps,
    composition: CompositionService,
    config: EngineConfig,
}

impl OptimizationService {
    pub fn new(deps: EngineDeps, composition: CompositionService, config: EngineConfig) -> Self {
        Self {
            deps,
            composition,
            config,
        }
    }

    pub async fn optimize(
        &self,
        request: OptimizationRequest,
    ) -> Result<OptimizationResult, EngineError> {
        let started = Instant::now();

        let mut context = request.context.clone().unwrap_or_default();
        context.combat_style = request.combat_style;
        let context = context.normalized();
        context
            .validate()
            .map_err(crate::error::ValidationError::from)?;

        // Current build multiplier; an empty build scores 1.0.
        let (current_multiplier, current_relics) = if request.current_ids.is_empty() {
            (1.0, Vec::new())
        } else {
            let outcome = self
                .composition
                .compose(
                    &request.current_ids,
                    &context,
                    ComposeRequestOptions {
                        include_breakdown: false,
                        ..ComposeRequestOptions::default()
                    },
                )
                .await?;
            (outcome.result.total_multiplier, outcome.bundle.relics)
        };

        let pool = self
            .deps
            .repo
            .list_relics(&pool_filter(&request.constraints))
            .await?;

        let combos = candidates::generate(
            &current_relics,
            &pool,
            request.combat_style,
            &self.config.optimizer.meta_builds,
        );
        let generated = combos.len();
        debug!(
            target: "engine::optimization",
            generated,
            pool = pool.len(),
            current = current_relics.len(),
            "candidates generated"
        );

        let relic_map: BTreeMap<&RelicId, &Relic> = current_relics
            .iter()
            .chain(pool.iter())
            .map(|r| (&r.id, r))
            .collect();

        let min_improvement = request
            .preferences
            .min_improvement
            .unwrap_or(self.config.optimizer.min_improvement);
        let deadline = request
            .deadline
            .unwrap_or_else(|| Deadline::after(self.config.optimization_timeout));

        let mut metadata = OptimizationMetadata {
            generated,
            ..OptimizationMetadata::default()
        };
        let mut suggestions: Vec<Suggestion> = Vec::new();

        for combo in &combos {
            if deadline.expired() {
                if request.allow_partial_on_timeout {
                    metadata.timed_out = true;
                    break;
                }
                return Err(OptError::Timeout {
                    elapsed_ms: started.elapsed().as_millis() as u64,
                    evaluated: metadata.evaluated,
                }
                .into());
            }
            if metadata.evaluated >= self.config.optimizer.max_evaluations {
                metadata.truncated = true;
                break;
            }

            metadata.evaluated += 1;
            let outcome = match self
                .composition
                .compose(
                    combo,
                    &context,
                    ComposeRequestOptions {
                        include_breakdown: false,
                        deadline: Some(deadline),
                        ..ComposeRequestOptions::default()
                    },
                )
                .await
            {
                Ok(outcome) => outcome,
                Err(error) => {
                    metadata.skipped += 1;
                    debug!(
                        target: "engine::optimization",
                        code = error.error_code(),
                        "candidate skipped"
                    );
                    continue;
                }
            };

            let improvement = outcome.result.total_multiplier - current_multiplier;
            if improvement < min_improvement {
                continue;
            }

            let relics: Vec<&Relic> = combo
                .iter()
                .filter_map(|id| relic_map.get(id).copied())
                .collect();
            suggestions.push(suggestion::build_suggestion(
                combo,
                &relics,
                &outcome.result,
                improvement,
            ));
        }

        rank(&mut suggestions, &request.preferences);
        suggestions.truncate(self.config.optimizer.max_suggestions);
        metadata.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            target: "engine::optimization",
            evaluated = metadata.evaluated,
            skipped = metadata.skipped,
            suggestions = suggestions.len(),
            elapsed_ms = metadata.elapsed_ms,
            "optimization finished"
        );

        Ok(OptimizationResult {
            suggestions,
            current_multiplier,
            current_rating: PerformanceTier::from_multiplier(current_multiplier),
            metadata,
        })
    }
}

fn pool_filter(constraints: &OptimizationConstraints) -> RelicFilter {
    let mut filter = RelicFilter::active_only();
    filter.categories = constraints.allowed_categories.clone();
    filter.exclude_ids = constraints.exclude_relic_ids.clone();
    if let Some(max) = constraints.max_difficulty {
        filter.difficulty_range = Some((1, max));
    }
    filter
}

/// Improvement descending; preference-driven tie-breaks keep the ordering
/// total and deterministic.
fn rank(suggestions: &mut [Suggestion], preferences: &OptimizationPreferences) {
    suggestions.sort_by(|a, b| {
        b.estimated_improvement
            .partial_cmp(&a.estimated_improvement)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                if preferences.prefer_high_rarity {
                    rarity_rank_sum(b).cmp(&rarity_rank_sum(a))
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .then_with(|| {
                if preferences.prefer_low_difficulty {
                    a.difficulty_rating
                        .partial_cmp(&b.difficulty_rating)
                        .unwrap_or(std::cmp::Ordering::Equal)
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .then_with(|| a.relic_ids.cmp(&b.relic_ids))
    });
}

fn rarity_rank_sum(suggestion: &Suggestion) -> u32 {
    suggestion
        .relics
        .iter()
        .map(|r| u32::from(r.rarity.rank()))
        .sum()
}
