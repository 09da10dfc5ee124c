//! Repository contract for relic lookup and enumeration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use relic_core::{EffectType, Quality, Rarity, Relic, RelicCategory, RelicId};

use super::error::Result;

/// Enumeration filter for candidate sourcing.
///
/// All clauses are conjunctive; empty vectors mean "no restriction".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RelicFilter {
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<RelicCategory>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rarities: Vec<Rarity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualities: Vec<Quality>,
    /// Inclusive `(min, max)` bounds on obtainment difficulty.
    pub difficulty_range: Option<(u8, u8)>,
    /// Keep relics carrying at least one active effect of any listed type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effect_types: Vec<EffectType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_ids: Vec<RelicId>,
    pub name_substring: Option<String>,
}

impl RelicFilter {
    /// Filter matching every active relic.
    pub fn active_only() -> Self {
        Self {
            active: Some(true),
            ..Self::default()
        }
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = RelicCategory>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn with_rarities(mut self, rarities: impl IntoIterator<Item = Rarity>) -> Self {
        self.rarities = rarities.into_iter().collect();
        self
    }

    pub fn with_difficulty_range(mut self, min: u8, max: u8) -> Self {
        self.difficulty_range = Some((min, max));
        self
    }

    pub fn with_excluded(mut self, ids: impl IntoIterator<Item = RelicId>) -> Self {
        self.exclude_ids = ids.into_iter().collect();
        self
    }

    pub fn with_name_substring(mut self, needle: impl Into<String>) -> Self {
        self.name_substring = Some(needle.into());
        self
    }

    /// Whether a relic satisfies every clause of this filter.
    pub fn matches(&self, relic: &Relic) -> bool {
        if let Some(active) = self.active {
            if relic.active != active {
                return false;
            }
        }
        if !self.categories.is_empty() && !self.categories.contains(&relic.category) {
            return false;
        }
        if !self.rarities.is_empty() && !self.rarities.contains(&relic.rarity) {
            return false;
        }
        if !self.qualities.is_empty() && !self.qualities.contains(&relic.quality) {
            return false;
        }
        if let Some((min, max)) = self.difficulty_range {
            if relic.obtainment_difficulty < min || relic.obtainment_difficulty > max {
                return false;
            }
        }
        if !self.effect_types.is_empty()
            && !relic
                .active_effects()
                .any(|e| self.effect_types.contains(&e.effect_type))
        {
            return false;
        }
        if self.exclude_ids.contains(&relic.id) {
            return false;
        }
        if let Some(needle) = &self.name_substring {
            if !relic.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// Read-only relic lookup with embedded active effects.
#[async_trait]
pub trait RelicRepository: Send + Sync {
    /// Batch lookup preserving request order; missing ids are reported by
    /// absence, not error.
    async fn get_relics_by_ids(&self, ids: &[RelicId]) -> Result<Vec<Relic>>;

    /// Enumerates relics matching the filter, ordered by id for
    /// deterministic candidate generation.
    async fn list_relics(&self, filter: &RelicFilter) -> Result<Vec<Relic>>;

    /// Single relic lookup.
    async fn get_relic(&self, id: &RelicId) -> Result<Option<Relic>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use relic_core::{Effect, StackingRule};

    fn relic(id: &str, rarity: Rarity, difficulty: u8) -> Relic {
        Relic::new(
            id,
            format!("Relic {id}"),
            RelicCategory::Attack,
            rarity,
            Quality::Polished,
            difficulty,
        )
    }

    #[test]
    fn filter_clauses_are_conjunctive() {
        let filter = RelicFilter::active_only()
            .with_rarities([Rarity::Epic])
            .with_difficulty_range(1, 5);

        assert!(filter.matches(&relic("a", Rarity::Epic, 4)));
        assert!(!filter.matches(&relic("b", Rarity::Epic, 7)));
        assert!(!filter.matches(&relic("c", Rarity::Common, 4)));
        assert!(!filter.matches(&relic("d", Rarity::Epic, 4).deactivated()));
    }

    #[test]
    fn effect_type_clause_ignores_inactive_effects() {
        let mut filter = RelicFilter::default();
        filter.effect_types = vec![EffectType::AttackFlat];

        let with_active = relic("a", Rarity::Common, 1).with_effect(Effect::new(
            "e1",
            "Edge",
            EffectType::AttackFlat,
            5.0,
            StackingRule::Additive,
        ));
        assert!(filter.matches(&with_active));

        let with_inactive = relic("b", Rarity::Common, 1).with_effect(
            Effect::new("e2", "Dull", EffectType::AttackFlat, 5.0, StackingRule::Additive)
                .deactivated(),
        );
        assert!(!filter.matches(&with_inactive));
    }

    #[test]
    fn name_substring_is_case_insensitive() {
        let filter = RelicFilter::default().with_name_substring("relic A");
        assert!(filter.matches(&relic("a", Rarity::Common, 1)));
        assert!(!filter.matches(&relic("b", Rarity::Common, 1)));
    }
}
