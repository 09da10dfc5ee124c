//! Combat context: the runtime situation effect conditions evaluate against.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::condition::ConditionValue;

/// Combat style the attack chain is performed in.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
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
pub enum CombatStyle {
    #[default]
    Melee,
    Ranged,
    Magic,
    Hybrid,
}

/// Valid range for `character_level`.
pub const CHARACTER_LEVEL_RANGE: std::ops::RangeInclusive<u32> = 1..=999;

/// Default base attack power when the caller supplies none.
pub const DEFAULT_BASE_ATTACK: f64 = 100.0;

/// Context errors, surfaced before composition starts.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("character_level {level} outside {min}..={max}", min = CHARACTER_LEVEL_RANGE.start(), max = CHARACTER_LEVEL_RANGE.end())]
    CharacterLevelOutOfRange { level: u32 },

    #[error("base attack power {value} must be a positive finite number")]
    InvalidBaseAttack { value: String },

    #[error("unrecognized combat style '{provided}'")]
    InvalidCombatStyle { provided: String },
}

impl ContextError {
    /// Stable identifier for transport-layer mapping.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::CharacterLevelOutOfRange { .. } | Self::InvalidBaseAttack { .. } => {
                "INVALID_CALCULATION_CONTEXT"
            }
            Self::InvalidCombatStyle { .. } => "INVALID_COMBAT_STYLE",
        }
    }
}

/// Parses a wire-format combat style, mapping failures to the stable
/// `INVALID_COMBAT_STYLE` error instead of a bare parse error.
pub fn parse_combat_style(input: &str) -> Result<CombatStyle, ContextError> {
    input
        .parse()
        .map_err(|_| ContextError::InvalidCombatStyle {
            provided: input.to_owned(),
        })
}

/// Engine input describing the combat situation.
///
/// All fields are optional on the wire; [`CombatContext::normalized`]
/// applies the documented defaults. The `conditions` map backs symbolic
/// lookups (health percentage, chain position, enemy type, equipment count)
/// and is ordered, which keeps the canonical serialization stable for
/// cache-key hashing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatContext {
    pub combat_style: CombatStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon_type: Option<String>,
    pub character_level: u32,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub conditions: BTreeMap<String, ConditionValue>,
    pub base_attack: f64,
}

impl Default for CombatContext {
    fn default() -> Self {
        Self {
            combat_style: CombatStyle::Melee,
            weapon_type: None,
            character_level: 1,
            conditions: BTreeMap::new(),
            base_attack: DEFAULT_BASE_ATTACK,
        }
    }
}

impl CombatContext {
    pub fn new(combat_style: CombatStyle) -> Self {
        Self {
            combat_style,
            ..Self::default()
        }
    }

    pub fn with_weapon(mut self, weapon_type: impl Into<String>) -> Self {
        self.weapon_type = Some(weapon_type.into());
        self
    }

    pub fn with_level(mut self, character_level: u32) -> Self {
        self.character_level = character_level;
        self
    }

    pub fn with_base_attack(mut self, base_attack: f64) -> Self {
        self.base_attack = base_attack;
        self
    }

    pub fn with_condition(mut self, key: impl Into<String>, value: impl Into<ConditionValue>) -> Self {
        self.conditions.insert(key.into(), value.into());
        self
    }

    /// Numeric symbolic lookup from the conditions map.
    pub fn condition_number(&self, key: &str) -> Option<f64> {
        self.conditions.get(key).and_then(ConditionValue::as_number)
    }

    /// Textual symbolic lookup from the conditions map.
    pub fn condition_text(&self, key: &str) -> Option<&str> {
        self.conditions.get(key).and_then(ConditionValue::as_text)
    }

    /// Canonical form used for composition and cache-key hashing.
    ///
    /// Blank weapon types collapse to absent so `""` and `null` hash the
    /// same; defaults are already materialized by `serde(default)`.
    pub fn normalized(&self) -> Self {
        let mut ctx = self.clone();
        if let Some(weapon) = &ctx.weapon_type {
            let trimmed = weapon.trim();
            if trimmed.is_empty() {
                ctx.weapon_type = None;
            } else if trimmed.len() != weapon.len() {
                ctx.weapon_type = Some(trimmed.to_owned());
            }
        }
        ctx
    }

    /// Rejects contexts the engine cannot compose against.
    pub fn validate(&self) -> Result<(), ContextError> {
        if !CHARACTER_LEVEL_RANGE.contains(&self.character_level) {
            return Err(ContextError::CharacterLevelOutOfRange {
                level: self.character_level,
            });
        }
        if !self.base_attack.is_finite() || self.base_attack <= 0.0 {
            return Err(ContextError::InvalidBaseAttack {
                value: format!("{}", self.base_attack),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn defaults_match_the_documented_context() {
        let ctx = CombatContext::default();
        assert_eq!(ctx.combat_style, CombatStyle::Melee);
        assert_eq!(ctx.character_level, 1);
        assert_eq!(ctx.base_attack, DEFAULT_BASE_ATTACK);
        assert!(ctx.weapon_type.is_none());
        assert!(ctx.conditions.is_empty());
    }

    #[test]
    fn empty_json_object_deserializes_to_defaults() {
        let ctx: CombatContext = serde_json::from_str("{}").unwrap();
        assert_eq!(ctx, CombatContext::default());
    }

    #[test]
    fn normalization_drops_blank_weapon_types() {
        let blank = CombatContext::default().with_weapon("   ");
        assert_eq!(blank.normalized().weapon_type, None);

        let padded = CombatContext::default().with_weapon(" bow ");
        assert_eq!(padded.normalized().weapon_type.as_deref(), Some("bow"));
    }

    #[test]
    fn validation_bounds_level_and_base_attack() {
        let level_zero = CombatContext::default().with_level(0);
        assert_eq!(
            level_zero.validate().unwrap_err().error_code(),
            "INVALID_CALCULATION_CONTEXT"
        );

        let level_high = CombatContext::default().with_level(1000);
        assert!(level_high.validate().is_err());

        let negative = CombatContext::default().with_base_attack(-5.0);
        assert!(negative.validate().is_err());

        assert!(CombatContext::default().with_level(999).validate().is_ok());
    }

    #[test]
    fn combat_style_parses_case_insensitively() {
        assert_eq!(CombatStyle::from_str("Magic").unwrap(), CombatStyle::Magic);
        assert_eq!(CombatStyle::from_str("RANGED").unwrap(), CombatStyle::Ranged);
        assert!(CombatStyle::from_str("psychic").is_err());
    }

    #[test]
    fn wire_parse_failure_carries_the_stable_code() {
        let error = parse_combat_style("psychic").unwrap_err();
        assert_eq!(error.error_code(), "INVALID_COMBAT_STYLE");
        assert_eq!(parse_combat_style("hybrid").unwrap(), CombatStyle::Hybrid);
    }
}
