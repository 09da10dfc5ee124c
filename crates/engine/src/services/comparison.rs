//! Multi-build comparison: rank 2..10 combinations on damage, efficiency,
//! and obtainment difficulty.

use serde::Serialize;
use tracing::debug;

use relic_core::{CombatContext, RelicId};

use crate::error::{ComparisonError, EngineError};

use super::composition::{ComposeRequestOptions, CompositionService};

/// Allowed number of combinations per comparison.
pub const COMBINATION_RANGE: std::ops::RangeInclusive<usize> = 2..=10;

/// One evaluated combination.
///
/// Combinations whose composition fails stay in the report with their
/// error code but are excluded from rankings and the summary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparedCombination {
    pub index: usize,
    pub relic_ids: Vec<RelicId>,
    pub relic_count: usize,
    pub total_multiplier: Option<f64>,
    /// `multiplier / relic_count`; 0 for an empty combination.
    pub efficiency: Option<f64>,
    pub average_difficulty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

/// Indices into `combinations`, best first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComparisonRankings {
    pub by_multiplier: Vec<usize>,
    pub by_efficiency: Vec<usize>,
    pub by_difficulty: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComparisonWinners {
    pub overall: usize,
    pub most_efficient: usize,
    pub easiest_to_build: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub min_multiplier: f64,
    pub max_multiplier: f64,
    pub average_multiplier: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub combinations: Vec<ComparedCombination>,
    pub rankings: ComparisonRankings,
    pub winners: ComparisonWinners,
    pub summary: ComparisonSummary,
}

/// Comparison service layered over cached composition.
#[derive(Clone)]
pub struct ComparisonService {
    composition: CompositionService,
}

impl ComparisonService {
    pub fn new(composition: CompositionService) -> Self {
        Self { composition }
    }

    pub async fn compare(
        &self,
        combinations: &[Vec<RelicId>],
        context: &CombatContext,
    ) -> Result<ComparisonReport, EngineError> {
        if !COMBINATION_RANGE.contains(&combinations.len()) {
            return Err(ComparisonError::CombinationCount {
                provided: combinations.len(),
                min: *COMBINATION_RANGE.start(),
                max: *COMBINATION_RANGE.end(),
            }
            .into());
        }

        let mut compared = Vec::with_capacity(combinations.len());
        for (index, relic_ids) in combinations.iter().enumerate() {
            let entry = match self
                .composition
                .compose(
                    relic_ids,
                    context,
                    ComposeRequestOptions {
                        include_breakdown: false,
                        ..ComposeRequestOptions::default()
                    },
                )
                .await
            {
                Ok(outcome) => {
                    let multiplier = outcome.result.total_multiplier;
                    let efficiency = if relic_ids.is_empty() {
                        0.0
                    } else {
                        multiplier / relic_ids.len() as f64
                    };
                    ComparedCombination {
                        index,
                        relic_ids: relic_ids.clone(),
                        relic_count: relic_ids.len(),
                        total_multiplier: Some(multiplier),
                        efficiency: Some(efficiency),
                        average_difficulty: Some(outcome.bundle.summary.average_difficulty),
                        error: None,
                    }
                }
                Err(error) => {
                    debug!(
                        target: "engine::comparison",
                        index,
                        code = error.error_code(),
                        "combination excluded from rankings"
                    );
                    ComparedCombination {
                        index,
                        relic_ids: relic_ids.clone(),
                        relic_count: relic_ids.len(),
                        total_multiplier: None,
                        efficiency: None,
                        average_difficulty: None,
                        error: Some(error.error_code()),
                    }
                }
            };
            compared.push(entry);
        }

        let evaluable: Vec<&ComparedCombination> =
            compared.iter().filter(|c| c.error.is_none()).collect();
        if evaluable.len() < 2 {
            return Err(ComparisonError::TooFewEvaluable {
                evaluable: evaluable.len(),
            }
            .into());
        }

        let by_multiplier = ranked(&evaluable, |c| c.total_multiplier.unwrap_or(0.0), true);
        let by_efficiency = ranked(&evaluable, |c| c.efficiency.unwrap_or(0.0), true);
        let by_difficulty = ranked(&evaluable, |c| c.average_difficulty.unwrap_or(0.0), false);

        let winners = ComparisonWinners {
            overall: by_multiplier[0],
            most_efficient: by_efficiency[0],
            easiest_to_build: by_difficulty[0],
        };

        let multipliers: Vec<f64> = evaluable
            .iter()
            .filter_map(|c| c.total_multiplier)
            .collect();
        let summary = ComparisonSummary {
            min_multiplier: round3(multipliers.iter().copied().fold(f64::INFINITY, f64::min)),
            max_multiplier: round3(multipliers.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            average_multiplier: round3(multipliers.iter().sum::<f64>() / multipliers.len() as f64),
        };

        Ok(ComparisonReport {
            combinations: compared,
            rankings: ComparisonRankings {
                by_multiplier,
                by_efficiency,
                by_difficulty,
            },
            winners,
            summary,
        })
    }
}

/// Multiplier display precision, matching composition results.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Orders evaluable combinations by `key`; index breaks ties for stability.
fn ranked(
    evaluable: &[&ComparedCombination],
    key: impl Fn(&ComparedCombination) -> f64,
    descending: bool,
) -> Vec<usize> {
    let mut indices: Vec<(usize, f64)> = evaluable.iter().map(|c| (c.index, key(c))).collect();
    indices.sort_by(|a, b| {
        let ordering = a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal);
        let ordering = if descending { ordering.reverse() } else { ordering };
        ordering.then_with(|| a.0.cmp(&b.0))
    });
    indices.into_iter().map(|(index, _)| index).collect()
}
