//! Effect types: the single stacking contributions attached to relics.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// Stable effect identifier, unique within the catalog.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectId(String);

impl EffectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EffectId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for EffectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What an effect's value means.
///
/// Only the attack lanes (`attack_flat`, `attack_percentage`,
/// `attack_multiplier`) change the final multiplier directly. Critical and
/// elemental types are recorded in stacking traces but stay out of the
/// number unless their stacking rule routes them through a numeric lane.
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
pub enum EffectType {
    AttackMultiplier,
    AttackFlat,
    AttackPercentage,
    CriticalMultiplier,
    CriticalChance,
    ElementalDamage,
    ConditionalDamage,
    WeaponSpecific,
    Unique,
}

/// How multiple effects of the same kind combine.
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
pub enum StackingRule {
    Additive,
    Multiplicative,
    Overwrite,
    Unique,
}

impl StackingRule {
    /// Fixed processing order of stacking groups during composition.
    ///
    /// This ordering is part of the engine contract: additive sums settle
    /// the flat and percentage lanes, multiplicative products follow,
    /// overwrite winners may replace a lane, and unique effects coexist last.
    pub const PROCESSING_ORDER: [StackingRule; 4] = [
        StackingRule::Additive,
        StackingRule::Multiplicative,
        StackingRule::Overwrite,
        StackingRule::Unique,
    ];
}

/// Damage typing carried by effects; typed allocation of the final number
/// is future work, today only `physical` receives the total.
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
pub enum DamageType {
    Physical,
    Magical,
    Fire,
    Ice,
    Lightning,
    Dark,
    Holy,
}

/// Synergy bucket an effect contributes to, used by build optimization.
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
pub enum SynergyGroup {
    AttackBoost,
    CriticalFocus,
    WeaponSpecific,
    ConditionalDamage,
    ElementalDamage,
}

impl EffectType {
    /// Maps an effect type to its synergy bucket.
    ///
    /// `unique` carries no inherent synergy and returns `None`.
    pub const fn synergy_group(self) -> Option<SynergyGroup> {
        match self {
            Self::AttackMultiplier | Self::AttackFlat | Self::AttackPercentage => {
                Some(SynergyGroup::AttackBoost)
            }
            Self::CriticalMultiplier | Self::CriticalChance => Some(SynergyGroup::CriticalFocus),
            Self::WeaponSpecific => Some(SynergyGroup::WeaponSpecific),
            Self::ConditionalDamage => Some(SynergyGroup::ConditionalDamage),
            Self::ElementalDamage => Some(SynergyGroup::ElementalDamage),
            Self::Unique => None,
        }
    }
}

/// Maximum effect value accepted by structural validation.
pub const MAX_EFFECT_VALUE: f64 = 1000.0;

/// Valid range for effect priority (overwrite tie-break input).
pub const PRIORITY_RANGE: std::ops::RangeInclusive<u8> = 0..=10;

/// A single stacking contribution attached to a relic.
///
/// `conditions` use all-must-hold semantics: the effect participates in
/// composition only when every condition evaluates true against the context.
/// Inactive effects are filtered out before composition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub id: EffectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub effect_type: EffectType,
    pub value: f64,
    pub stacking_rule: StackingRule,
    /// Used only to break ties between overwrite effects of the same type.
    #[serde(default)]
    pub priority: u8,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub damage_types: BTreeSet<DamageType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Effect {
    pub fn new(
        id: impl Into<EffectId>,
        name: impl Into<String>,
        effect_type: EffectType,
        value: f64,
        stacking_rule: StackingRule,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            effect_type,
            value,
            stacking_rule,
            priority: 0,
            damage_types: BTreeSet::new(),
            conditions: Vec::new(),
            active: true,
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_damage_type(mut self, damage_type: DamageType) -> Self {
        self.damage_types.insert(damage_type);
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// Structural defects on this effect.
    ///
    /// Empty means structurally valid. Condition shapes are checked through
    /// their tagged representation: an `Unknown` condition is structurally
    /// acceptable (it evaluates false) but a malformed known tag is not.
    pub fn structural_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.id.as_str().trim().is_empty() {
            issues.push("effect id is blank".to_owned());
        }
        if self.name.trim().is_empty() {
            issues.push("effect name is blank".to_owned());
        }
        if !self.value.is_finite() || self.value <= 0.0 {
            issues.push(format!("effect value {} is not a positive number", self.value));
        } else if self.value > MAX_EFFECT_VALUE {
            issues.push(format!(
                "effect value {} exceeds maximum {}",
                self.value, MAX_EFFECT_VALUE
            ));
        }
        if !PRIORITY_RANGE.contains(&self.priority) {
            issues.push(format!(
                "priority {} outside {}..={}",
                self.priority,
                PRIORITY_RANGE.start(),
                PRIORITY_RANGE.end()
            ));
        }
        for condition in &self.conditions {
            if let Some(issue) = condition.structural_issue() {
                issues.push(issue);
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_type_serializes_snake_case() {
        let json = serde_json::to_value(EffectType::AttackPercentage).unwrap();
        assert_eq!(json, "attack_percentage");

        let back: EffectType = serde_json::from_value(json).unwrap();
        assert_eq!(back, EffectType::AttackPercentage);
    }

    #[test]
    fn processing_order_is_fixed() {
        assert_eq!(
            StackingRule::PROCESSING_ORDER,
            [
                StackingRule::Additive,
                StackingRule::Multiplicative,
                StackingRule::Overwrite,
                StackingRule::Unique,
            ]
        );
    }

    #[test]
    fn structural_issues_reject_nonpositive_and_oversized_values() {
        let zero = Effect::new("e1", "Null", EffectType::AttackFlat, 0.0, StackingRule::Additive);
        assert_eq!(zero.structural_issues().len(), 1);

        let huge = Effect::new(
            "e2",
            "Overflow",
            EffectType::AttackFlat,
            1000.5,
            StackingRule::Additive,
        );
        assert_eq!(huge.structural_issues().len(), 1);

        let ok = Effect::new("e3", "Fine", EffectType::AttackFlat, 10.0, StackingRule::Additive);
        assert!(ok.structural_issues().is_empty());
    }

    #[test]
    fn synergy_groups_cover_all_but_unique() {
        assert_eq!(
            EffectType::AttackFlat.synergy_group(),
            Some(SynergyGroup::AttackBoost)
        );
        assert_eq!(
            EffectType::CriticalChance.synergy_group(),
            Some(SynergyGroup::CriticalFocus)
        );
        assert_eq!(EffectType::Unique.synergy_group(), None);
    }
}
