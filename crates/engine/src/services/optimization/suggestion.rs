//! Suggestion assembly: explanations, pros/cons, confidence scoring.

use serde::Serialize;

use relic_core::{CompositionResult, Rarity, Relic, RelicId};

/// Slim relic view embedded in a suggestion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SuggestedRelic {
    pub id: RelicId,
    pub name: String,
    pub rarity: Rarity,
    pub obtainment_difficulty: u8,
}

/// One ranked optimization suggestion.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Suggestion {
    pub relic_ids: Vec<RelicId>,
    pub relics: Vec<SuggestedRelic>,
    /// Multiplier gain over the current build.
    pub estimated_improvement: f64,
    pub explanation: String,
    /// Average obtainment difficulty of the suggested relics.
    pub difficulty_rating: f64,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    /// Heuristic trust score in `[0.1, 1.0]`.
    pub confidence: f64,
}

/// Applied effects below this value are not worth naming in explanations.
const EXPLANATION_VALUE_FLOOR: f64 = 10.0;
/// At most this many contributing effects are named.
const EXPLANATION_EFFECT_CAP: usize = 3;

pub(crate) fn build_suggestion(
    ids: &[RelicId],
    relics: &[&Relic],
    result: &CompositionResult,
    improvement: f64,
) -> Suggestion {
    let difficulty_rating = if relics.is_empty() {
        0.0
    } else {
        relics
            .iter()
            .map(|r| f64::from(r.obtainment_difficulty))
            .sum::<f64>()
            / relics.len() as f64
    };

    Suggestion {
        relic_ids: ids.to_vec(),
        relics: relics
            .iter()
            .map(|r| SuggestedRelic {
                id: r.id.clone(),
                name: r.name.clone(),
                rarity: r.rarity,
                obtainment_difficulty: r.obtainment_difficulty,
            })
            .collect(),
        estimated_improvement: improvement,
        explanation: explanation(result, improvement),
        difficulty_rating,
        pros: pros(relics, improvement, difficulty_rating),
        cons: cons(relics, result, difficulty_rating),
        confidence: confidence(result, improvement),
    }
}

fn explanation(result: &CompositionResult, improvement: f64) -> String {
    let mut text = format!(
        "Raises the attack multiplier by {:.1}% to ×{:.3}",
        improvement * 100.0,
        result.total_multiplier
    );

    let mut contributors: Vec<&relic_core::StackingBonus> = result
        .applied_bonuses()
        .filter(|b| b.value > EXPLANATION_VALUE_FLOOR)
        .collect();
    contributors.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.effect_id.cmp(&b.effect_id))
    });
    let names: Vec<&str> = contributors
        .iter()
        .take(EXPLANATION_EFFECT_CAP)
        .map(|b| b.effect_name.as_str())
        .collect();
    if !names.is_empty() {
        text.push_str(&format!(", driven by {}", names.join(", ")));
    }
    text
}

fn pros(relics: &[&Relic], improvement: f64, difficulty_rating: f64) -> Vec<String> {
    let mut out = Vec::new();
    if improvement >= 0.5 {
        out.push("large damage increase".to_owned());
    }
    if difficulty_rating <= 3.0 {
        out.push("easy to assemble".to_owned());
    }
    let legendaries = relics.iter().filter(|r| r.rarity == Rarity::Legendary).count();
    if legendaries > 0 {
        out.push(format!("{legendaries} legendary relic(s) anchor the build"));
    }
    out
}

fn cons(relics: &[&Relic], result: &CompositionResult, difficulty_rating: f64) -> Vec<String> {
    let mut out = Vec::new();
    if difficulty_rating >= 7.0 {
        out.push("relics are hard to obtain".to_owned());
    }
    if !result.conditional_effects.is_empty() {
        out.push(format!(
            "depends on {} conditional effect(s)",
            result.conditional_effects.len()
        ));
    }
    if !result.warnings.is_empty() {
        out.push("composition emitted warnings".to_owned());
    }
    if relics.len() == relic_core::MAX_RELIC_SELECTION {
        out.push("no free slots left".to_owned());
    }
    out
}

/// Confidence: 0.5 baseline, bounded improvement bonus, penalties for
/// conditional dependence and warnings, clamped to `[0.1, 1.0]`.
fn confidence(result: &CompositionResult, improvement: f64) -> f64 {
    let mut score = 0.5 + (improvement * 2.0).min(0.3);
    score -= 0.05 * result.conditional_effects.len() as f64;
    if !result.warnings.is_empty() {
        score -= 0.1;
    }
    score.clamp(0.1, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relic_core::{CombatContext, ComposeOptions, Composer};

    fn empty_result() -> CompositionResult {
        Composer::new()
            .compose(&[], &CombatContext::default(), &ComposeOptions::default())
            .unwrap()
    }

    #[test]
    fn confidence_is_clamped() {
        let result = empty_result();
        assert_eq!(confidence(&result, 10.0), 0.8);
        assert_eq!(confidence(&result, 0.0), 0.5);

        let mut warned = empty_result();
        warned.warnings.push("w".to_owned());
        for _ in 0..12 {
            warned.conditional_effects.push(relic_core::ConditionalEffectNote {
                relic_name: "r".to_owned(),
                effect_name: "e".to_owned(),
                effect_type: relic_core::EffectType::ConditionalDamage,
                value: 1.0,
                conditions: vec![],
                satisfied: false,
            });
        }
        assert_eq!(confidence(&warned, 0.0), 0.1);
    }

    #[test]
    fn explanation_names_strong_contributors() {
        let mut result = empty_result();
        result.total_multiplier = 1.4;
        result.stacking_bonuses.push(relic_core::StackingBonus {
            stacking_rule: relic_core::StackingRule::Additive,
            effect_type: relic_core::EffectType::AttackPercentage,
            relic_id: RelicId::from("r"),
            relic_name: "Relic".to_owned(),
            effect_id: relic_core::EffectId::from("e"),
            effect_name: "Keen Edge".to_owned(),
            value: 40.0,
            applied: true,
            note: None,
        });
        let text = explanation(&result, 0.4);
        assert!(text.contains("40.0%"));
        assert!(text.contains("Keen Edge"));
    }
}
