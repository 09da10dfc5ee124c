//! Build analysis: synergy grouping, ratings, recommendations.

use serde::{Deserialize, Serialize};

use relic_core::{CombatContext, CompositionResult, EffectType, Relic, RelicId, StackingRule};

use crate::error::EngineError;

use super::composition::{CompositionService, ComposeRequestOptions};
use super::validation::SelectionSummary;

/// Multiplier tier buckets.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PerformanceTier {
    Poor,
    BelowAverage,
    Average,
    Good,
    Excellent,
    Exceptional,
}

impl PerformanceTier {
    pub fn from_multiplier(multiplier: f64) -> Self {
        if multiplier < 1.2 {
            Self::Poor
        } else if multiplier < 1.5 {
            Self::BelowAverage
        } else if multiplier < 2.0 {
            Self::Average
        } else if multiplier < 2.5 {
            Self::Good
        } else if multiplier < 3.0 {
            Self::Excellent
        } else {
            Self::Exceptional
        }
    }
}

/// Average-obtainment-difficulty tier buckets.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DifficultyTier {
    Easy,
    Moderate,
    Hard,
    VeryHard,
}

impl DifficultyTier {
    pub fn from_average(average: f64) -> Self {
        if average < 3.0 {
            Self::Easy
        } else if average < 6.0 {
            Self::Moderate
        } else if average < 8.0 {
            Self::Hard
        } else {
            Self::VeryHard
        }
    }
}

/// A same-type effect cluster with its synergy score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SynergyGroupReport {
    pub effect_type: EffectType,
    pub count: usize,
    pub additive_count: usize,
    pub total_value: f64,
    pub score: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecommendationKind {
    Performance,
    Difficulty,
    Complexity,
    Rarity,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
}

/// Full analysis of one relic selection.
#[derive(Clone, Debug)]
pub struct AnalysisReport {
    pub composition: CompositionResult,
    pub summary: SelectionSummary,
    pub synergies: Vec<SynergyGroupReport>,
    pub recommendations: Vec<Recommendation>,
    pub performance: PerformanceTier,
    pub difficulty: DifficultyTier,
}

/// Analysis service layered over cached composition.
#[derive(Clone)]
pub struct AnalysisService {
    composition: CompositionService,
}

impl AnalysisService {
    pub fn new(composition: CompositionService) -> Self {
        Self { composition }
    }

    pub async fn analyze(
        &self,
        relic_ids: &[RelicId],
        context: &CombatContext,
    ) -> Result<AnalysisReport, EngineError> {
        let outcome = self
            .composition
            .compose(relic_ids, context, ComposeRequestOptions::default())
            .await?;

        let synergies = synergy_groups(&outcome.bundle.relics);
        let performance = PerformanceTier::from_multiplier(outcome.result.total_multiplier);
        let difficulty = DifficultyTier::from_average(outcome.bundle.summary.average_difficulty);
        let recommendations =
            recommendations(&outcome.result, &outcome.bundle.summary, performance, difficulty);

        Ok(AnalysisReport {
            composition: outcome.result,
            summary: outcome.bundle.summary,
            synergies,
            recommendations,
            performance,
            difficulty,
        })
    }
}

/// Groups active effects by type; clusters of at least two score
/// `count×10 + Σvalue×0.1 + 5×additive_count`, sorted by score descending.
pub(crate) fn synergy_groups(relics: &[Relic]) -> Vec<SynergyGroupReport> {
    let mut groups: Vec<SynergyGroupReport> = Vec::new();
    for relic in relics {
        for effect in relic.active_effects() {
            let additive = usize::from(effect.stacking_rule == StackingRule::Additive);
            match groups.iter_mut().find(|g| g.effect_type == effect.effect_type) {
                Some(group) => {
                    group.count += 1;
                    group.additive_count += additive;
                    group.total_value += effect.value;
                }
                None => groups.push(SynergyGroupReport {
                    effect_type: effect.effect_type,
                    count: 1,
                    additive_count: additive,
                    total_value: effect.value,
                    score: 0.0,
                }),
            }
        }
    }
    groups.retain(|g| g.count >= 2);
    for group in &mut groups {
        group.score =
            group.count as f64 * 10.0 + group.total_value * 0.1 + 5.0 * group.additive_count as f64;
    }
    groups.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.effect_type.cmp(&b.effect_type))
    });
    groups
}

fn recommendations(
    result: &CompositionResult,
    summary: &SelectionSummary,
    performance: PerformanceTier,
    difficulty: DifficultyTier,
) -> Vec<Recommendation> {
    let mut out = Vec::with_capacity(4);

    let performance_msg = match performance {
        PerformanceTier::Poor | PerformanceTier::BelowAverage => {
            "multiplier is low; add attack percentage or multiplier effects".to_owned()
        }
        PerformanceTier::Average => {
            "solid baseline; a multiplicative effect would lift it further".to_owned()
        }
        PerformanceTier::Good | PerformanceTier::Excellent => {
            "strong multiplier; refine conditions to keep it consistent".to_owned()
        }
        PerformanceTier::Exceptional => "top-tier multiplier; little room left".to_owned(),
    };
    out.push(Recommendation {
        kind: RecommendationKind::Performance,
        message: performance_msg,
    });

    let difficulty_msg = match difficulty {
        DifficultyTier::Easy => "all relics are easy to obtain".to_owned(),
        DifficultyTier::Moderate => "moderate farming required".to_owned(),
        DifficultyTier::Hard => "expect a long grind for these relics".to_owned(),
        DifficultyTier::VeryHard => {
            format!(
                "very hard to assemble (total difficulty {}); consider cheaper substitutes",
                summary.total_difficulty
            )
        }
    };
    out.push(Recommendation {
        kind: RecommendationKind::Difficulty,
        message: difficulty_msg,
    });

    let conditional = result.conditional_effects.len()
        + result
            .stacking_bonuses
            .iter()
            .filter(|b| !b.applied && b.note.as_deref() == Some("conditions not met"))
            .count();
    let complexity_msg = if conditional > 3 {
        format!("{conditional} effects are conditional; damage will swing with the situation")
    } else {
        "few conditional effects; output is stable across fights".to_owned()
    };
    out.push(Recommendation {
        kind: RecommendationKind::Complexity,
        message: complexity_msg,
    });

    let legendaries = summary
        .rarity_counts
        .get(&relic_core::Rarity::Legendary)
        .copied()
        .unwrap_or(0);
    let rarity_msg = if legendaries > MANY_LEGENDARIES_FOR_NOTE {
        format!("{legendaries} legendaries; drop rates will gate this build")
    } else {
        "rarity mix is attainable".to_owned()
    };
    out.push(Recommendation {
        kind: RecommendationKind::Rarity,
        message: rarity_msg,
    });

    out
}

const MANY_LEGENDARIES_FOR_NOTE: usize = 2;

#[cfg(test)]
mod tests {
    use super::*;
    use relic_core::{Effect, Quality, Rarity, RelicCategory};

    #[test]
    fn tier_boundaries_match_the_buckets() {
        assert_eq!(PerformanceTier::from_multiplier(1.19), PerformanceTier::Poor);
        assert_eq!(PerformanceTier::from_multiplier(1.2), PerformanceTier::BelowAverage);
        assert_eq!(PerformanceTier::from_multiplier(1.99), PerformanceTier::Average);
        assert_eq!(PerformanceTier::from_multiplier(2.0), PerformanceTier::Good);
        assert_eq!(PerformanceTier::from_multiplier(2.5), PerformanceTier::Excellent);
        assert_eq!(PerformanceTier::from_multiplier(3.0), PerformanceTier::Exceptional);

        assert_eq!(DifficultyTier::from_average(2.9), DifficultyTier::Easy);
        assert_eq!(DifficultyTier::from_average(3.0), DifficultyTier::Moderate);
        assert_eq!(DifficultyTier::from_average(6.0), DifficultyTier::Hard);
        assert_eq!(DifficultyTier::from_average(8.0), DifficultyTier::VeryHard);
    }

    #[test]
    fn synergy_requires_at_least_two_of_a_type() {
        let solo = Relic::new("a", "Solo", RelicCategory::Attack, Rarity::Common, Quality::Delicate, 1)
            .with_effect(Effect::new(
                "e1",
                "Edge",
                EffectType::AttackPercentage,
                10.0,
                StackingRule::Additive,
            ));
        assert!(synergy_groups(std::slice::from_ref(&solo)).is_empty());

        let pair = Relic::new("b", "Pair", RelicCategory::Attack, Rarity::Common, Quality::Delicate, 1)
            .with_effect(Effect::new(
                "e2",
                "Point",
                EffectType::AttackPercentage,
                20.0,
                StackingRule::Additive,
            ));
        let groups = synergy_groups(&[solo, pair]);
        assert_eq!(groups.len(), 1);
        // 2×10 + 30×0.1 + 5×2 = 33
        assert!((groups[0].score - 33.0).abs() < 1e-9);
    }
}
