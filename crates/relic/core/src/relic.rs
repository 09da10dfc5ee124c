//! Relic catalog types.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::effect::Effect;

/// Stable relic identifier.
///
/// Ids are opaque strings assigned by the catalog. Ordering is lexicographic
/// and is part of the engine contract (overwrite tie-breaks, cache keys).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelicId(String);

impl RelicId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelicId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for RelicId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Broad gameplay role of a relic.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RelicCategory {
    Attack,
    Defense,
    Utility,
    Critical,
    Elemental,
}

/// Relic rarity with an ordering rank used for preferences and summaries.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Ordering rank, 1 (common) through 4 (legendary).
    pub const fn rank(self) -> u8 {
        match self {
            Self::Common => 1,
            Self::Rare => 2,
            Self::Epic => 3,
            Self::Legendary => 4,
        }
    }
}

/// Physical quality grade of a relic.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Quality {
    Delicate,
    Polished,
    Grand,
}

/// Valid range for `obtainment_difficulty`.
pub const DIFFICULTY_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// A named, typed, self-contained bundle of effects selectable by the player.
///
/// Relics own their effects. A relic with `active = false` is invisible to
/// the engine: validation rejects it outright rather than silently skipping.
///
/// `conflicts` is stored one-sided in catalog data; the engine treats the
/// relation as undirected and unions both directions during validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relic {
    pub id: RelicId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: RelicCategory,
    pub rarity: Rarity,
    pub quality: Quality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// How hard the relic is to obtain, 1..=10.
    pub obtainment_difficulty: u8,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub conflicts: BTreeSet<RelicId>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

fn default_active() -> bool {
    true
}

impl Relic {
    pub fn new(
        id: impl Into<RelicId>,
        name: impl Into<String>,
        category: RelicCategory,
        rarity: Rarity,
        quality: Quality,
        obtainment_difficulty: u8,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category,
            rarity,
            quality,
            icon_url: None,
            obtainment_difficulty,
            conflicts: BTreeSet::new(),
            active: true,
            effects: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_conflict(mut self, id: impl Into<RelicId>) -> Self {
        self.conflicts.insert(id.into());
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// Effects that participate in composition, in stable insertion order.
    pub fn active_effects(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter().filter(|e| e.active)
    }

    /// Returns true if this relic declares a conflict with `other`.
    ///
    /// Direction matters here; callers that need the undirected relation
    /// check both sides.
    pub fn conflicts_with(&self, other: &RelicId) -> bool {
        self.conflicts.contains(other)
    }

    /// Structural defects on the relic itself (effects are checked separately).
    ///
    /// Returns human-readable issue descriptions; empty means structurally
    /// valid. Used by strict-mode validation and catalog loading.
    pub fn structural_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.id.as_str().trim().is_empty() {
            issues.push("relic id is blank".to_owned());
        }
        if self.name.trim().is_empty() {
            issues.push("relic name is blank".to_owned());
        }
        if !DIFFICULTY_RANGE.contains(&self.obtainment_difficulty) {
            issues.push(format!(
                "obtainment_difficulty {} outside {}..={}",
                self.obtainment_difficulty,
                DIFFICULTY_RANGE.start(),
                DIFFICULTY_RANGE.end()
            ));
        }
        if self.conflicts.contains(&self.id) {
            issues.push("relic lists itself as a conflict".to_owned());
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn rarity_ranks_are_ordered() {
        assert!(Rarity::Common.rank() < Rarity::Rare.rank());
        assert!(Rarity::Rare.rank() < Rarity::Epic.rank());
        assert!(Rarity::Epic.rank() < Rarity::Legendary.rank());
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(
            RelicCategory::from_str("Attack").unwrap(),
            RelicCategory::Attack
        );
        assert_eq!(
            RelicCategory::from_str("elemental").unwrap(),
            RelicCategory::Elemental
        );
        assert!(RelicCategory::from_str("melee").is_err());
    }

    #[test]
    fn structural_issues_flag_bad_difficulty_and_self_conflict() {
        let mut relic = Relic::new(
            "r1",
            "Cracked Band",
            RelicCategory::Attack,
            Rarity::Common,
            Quality::Delicate,
            11,
        );
        relic.conflicts.insert(RelicId::from("r1"));

        let issues = relic.structural_issues();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].contains("obtainment_difficulty"));
    }

    #[test]
    fn serde_round_trips_snake_case_enums() {
        let relic = Relic::new(
            "r2",
            "Storm Idol",
            RelicCategory::Elemental,
            Rarity::Epic,
            Quality::Grand,
            7,
        );
        let json = serde_json::to_value(&relic).unwrap();
        assert_eq!(json["category"], "elemental");
        assert_eq!(json["rarity"], "epic");
        assert_eq!(json["quality"], "grand");

        let back: Relic = serde_json::from_value(json).unwrap();
        assert_eq!(back, relic);
    }
}
