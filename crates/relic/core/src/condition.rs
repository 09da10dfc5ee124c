//! Conditional activation of effects.
//!
//! A condition is a tagged predicate evaluated against the combat context.
//! All conditions on an effect must hold for the effect to participate in
//! composition. Unknown tags are preserved opaquely and evaluate to false,
//! so catalog data from a newer schema degrades safely instead of failing.

use std::fmt;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::{CombatContext, CombatStyle};

/// Literal value stored in the context's symbolic condition map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Number(f64),
    Text(String),
}

impl ConditionValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl From<f64> for ConditionValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ConditionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

/// Requirement carried by an `equipment_count` condition.
///
/// The literal string `"character_level"` is a scaling marker rather than a
/// predicate: it multiplies an `attack_percentage` effect's value by the
/// character level and always passes the condition check itself.
#[derive(Clone, Debug, PartialEq)]
pub enum EquipmentRequirement {
    /// At least this many equipped pieces (`context.equipment_count >= n`).
    AtLeast(u32),
    /// Level-scaling marker; always passes.
    CharacterLevel,
}

/// A single typed predicate attached to an effect.
///
/// Serialized as `{"type": "<tag>", "value": ..., "description": ...}`.
/// Tags outside the known set round-trip through [`Condition::Unknown`]
/// byte-for-byte and evaluate to false.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    WeaponType {
        value: String,
        description: Option<String>,
    },
    CombatStyle {
        value: CombatStyle,
        description: Option<String>,
    },
    HealthThreshold {
        value: f64,
        description: Option<String>,
    },
    ChainPosition {
        value: u32,
        description: Option<String>,
    },
    EnemyType {
        value: String,
        description: Option<String>,
    },
    /// Documented as unimplemented: always evaluates true.
    TimeBased {
        value: Option<String>,
        description: Option<String>,
    },
    EquipmentCount {
        value: EquipmentRequirement,
        description: Option<String>,
    },
    /// Unrecognized or malformed condition payload, kept verbatim.
    Unknown { raw: Value },
}

/// Known tags, used to distinguish "unknown" from "known but malformed".
const KNOWN_TAGS: [&str; 7] = [
    "weapon_type",
    "combat_style",
    "health_threshold",
    "chain_position",
    "enemy_type",
    "time_based",
    "equipment_count",
];

impl Condition {
    pub fn weapon_type(value: impl Into<String>) -> Self {
        Self::WeaponType {
            value: value.into(),
            description: None,
        }
    }

    pub fn combat_style(value: CombatStyle) -> Self {
        Self::CombatStyle {
            value,
            description: None,
        }
    }

    pub fn health_threshold(value: f64) -> Self {
        Self::HealthThreshold {
            value,
            description: None,
        }
    }

    pub fn chain_position(value: u32) -> Self {
        Self::ChainPosition {
            value,
            description: None,
        }
    }

    pub fn enemy_type(value: impl Into<String>) -> Self {
        Self::EnemyType {
            value: value.into(),
            description: None,
        }
    }

    pub fn equipment_count(count: u32) -> Self {
        Self::EquipmentCount {
            value: EquipmentRequirement::AtLeast(count),
            description: None,
        }
    }

    pub fn character_level_scaling() -> Self {
        Self::EquipmentCount {
            value: EquipmentRequirement::CharacterLevel,
            description: None,
        }
    }

    pub fn described(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        match &mut self {
            Self::WeaponType { description, .. }
            | Self::CombatStyle { description, .. }
            | Self::HealthThreshold { description, .. }
            | Self::ChainPosition { description, .. }
            | Self::EnemyType { description, .. }
            | Self::TimeBased { description, .. }
            | Self::EquipmentCount { description, .. } => *description = Some(text),
            Self::Unknown { .. } => {}
        }
        self
    }

    /// Evaluates this condition against the context.
    ///
    /// Missing context data fails the predicate (a health threshold cannot
    /// hold when no health percentage was supplied). `time_based` always
    /// passes; unknown tags always fail.
    pub fn evaluate(&self, ctx: &CombatContext) -> bool {
        match self {
            Self::WeaponType { value, .. } => ctx.weapon_type.as_deref() == Some(value.as_str()),
            Self::CombatStyle { value, .. } => ctx.combat_style == *value,
            Self::HealthThreshold { value, .. } => ctx
                .condition_number("health_percentage")
                .is_some_and(|health| health <= *value),
            Self::ChainPosition { value, .. } => ctx
                .condition_number("chain_position")
                .is_some_and(|pos| pos == f64::from(*value)),
            Self::EnemyType { value, .. } => {
                ctx.condition_text("enemy_type") == Some(value.as_str())
            }
            Self::TimeBased { .. } => true,
            Self::EquipmentCount { value, .. } => match value {
                EquipmentRequirement::AtLeast(n) => ctx
                    .condition_number("equipment_count")
                    .is_some_and(|count| count >= f64::from(*n)),
                EquipmentRequirement::CharacterLevel => true,
            },
            Self::Unknown { .. } => false,
        }
    }

    /// True for the `equipment_count: "character_level"` scaling marker.
    pub fn is_character_level_scaling(&self) -> bool {
        matches!(
            self,
            Self::EquipmentCount {
                value: EquipmentRequirement::CharacterLevel,
                ..
            }
        )
    }

    /// Short label for breakdown display: the description when present,
    /// otherwise a generated summary of the predicate.
    pub fn display_label(&self) -> String {
        let described = match self {
            Self::WeaponType { description, .. }
            | Self::CombatStyle { description, .. }
            | Self::HealthThreshold { description, .. }
            | Self::ChainPosition { description, .. }
            | Self::EnemyType { description, .. }
            | Self::TimeBased { description, .. }
            | Self::EquipmentCount { description, .. } => description.as_deref(),
            Self::Unknown { .. } => None,
        };
        if let Some(text) = described {
            return text.to_owned();
        }
        match self {
            Self::WeaponType { value, .. } => format!("weapon is {value}"),
            Self::CombatStyle { value, .. } => format!("combat style is {value}"),
            Self::HealthThreshold { value, .. } => format!("health at or below {value}%"),
            Self::ChainPosition { value, .. } => format!("chain position {value}"),
            Self::EnemyType { value, .. } => format!("enemy is {value}"),
            Self::TimeBased { value, .. } => match value {
                Some(v) => format!("time window {v}"),
                None => "time-based".to_owned(),
            },
            Self::EquipmentCount { value, .. } => match value {
                EquipmentRequirement::AtLeast(n) => format!("at least {n} equipped"),
                EquipmentRequirement::CharacterLevel => "scales with character level".to_owned(),
            },
            Self::Unknown { raw } => {
                let tag = raw.get("type").and_then(Value::as_str).unwrap_or("?");
                format!("unknown condition ({tag})")
            }
        }
    }

    /// Reports a structural defect, if any.
    ///
    /// A genuinely unknown tag is acceptable (forward compatibility); a
    /// known tag that failed to parse into its typed form is a defect.
    pub fn structural_issue(&self) -> Option<String> {
        if let Self::Unknown { raw } = self {
            let tag = raw.get("type").and_then(Value::as_str);
            if let Some(tag) = tag {
                if KNOWN_TAGS.contains(&tag) {
                    return Some(format!("malformed value for condition type '{tag}'"));
                }
            } else {
                return Some("condition is missing a 'type' tag".to_owned());
            }
        }
        None
    }

    const fn tag(&self) -> Option<&'static str> {
        match self {
            Self::WeaponType { .. } => Some("weapon_type"),
            Self::CombatStyle { .. } => Some("combat_style"),
            Self::HealthThreshold { .. } => Some("health_threshold"),
            Self::ChainPosition { .. } => Some("chain_position"),
            Self::EnemyType { .. } => Some("enemy_type"),
            Self::TimeBased { .. } => Some("time_based"),
            Self::EquipmentCount { .. } => Some("equipment_count"),
            Self::Unknown { .. } => None,
        }
    }

    fn from_value(raw: Value) -> Self {
        let Some(tag) = raw.get("type").and_then(Value::as_str) else {
            return Self::Unknown { raw };
        };
        let description = raw
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let value = raw.get("value");

        let parsed = match tag {
            "weapon_type" => value
                .and_then(Value::as_str)
                .map(|weapon| Self::WeaponType {
                    value: weapon.to_owned(),
                    description: description.clone(),
                }),
            "combat_style" => value
                .and_then(Value::as_str)
                .and_then(|style| style.parse::<CombatStyle>().ok())
                .map(|style| Self::CombatStyle {
                    value: style,
                    description: description.clone(),
                }),
            "health_threshold" => value.and_then(Value::as_f64).map(|threshold| {
                Self::HealthThreshold {
                    value: threshold,
                    description: description.clone(),
                }
            }),
            "chain_position" => value
                .and_then(Value::as_u64)
                .and_then(|pos| u32::try_from(pos).ok())
                .map(|pos| Self::ChainPosition {
                    value: pos,
                    description: description.clone(),
                }),
            "enemy_type" => value.and_then(Value::as_str).map(|enemy| Self::EnemyType {
                value: enemy.to_owned(),
                description: description.clone(),
            }),
            "time_based" => Some(Self::TimeBased {
                value: value.and_then(Value::as_str).map(str::to_owned),
                description: description.clone(),
            }),
            "equipment_count" => match value {
                Some(Value::Number(n)) => n
                    .as_u64()
                    .and_then(|count| u32::try_from(count).ok())
                    .map(|count| Self::EquipmentCount {
                        value: EquipmentRequirement::AtLeast(count),
                        description: description.clone(),
                    }),
                Some(Value::String(s)) if s == "character_level" => Some(Self::EquipmentCount {
                    value: EquipmentRequirement::CharacterLevel,
                    description: description.clone(),
                }),
                _ => None,
            },
            _ => None,
        };

        parsed.unwrap_or(Self::Unknown { raw })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_label())
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Unknown payloads serialize back verbatim so foreign conditions
        // survive a load/store round trip untouched.
        if let Self::Unknown { raw } = self {
            return raw.serialize(serializer);
        }

        let description = match self {
            Self::WeaponType { description, .. }
            | Self::CombatStyle { description, .. }
            | Self::HealthThreshold { description, .. }
            | Self::ChainPosition { description, .. }
            | Self::EnemyType { description, .. }
            | Self::TimeBased { description, .. }
            | Self::EquipmentCount { description, .. } => description.as_deref(),
            Self::Unknown { .. } => unreachable!(),
        };

        let value = match self {
            Self::WeaponType { value, .. } => Some(Value::from(value.as_str())),
            Self::CombatStyle { value, .. } => Some(Value::from(value.to_string())),
            Self::HealthThreshold { value, .. } => Some(Value::from(*value)),
            Self::ChainPosition { value, .. } => Some(Value::from(*value)),
            Self::EnemyType { value, .. } => Some(Value::from(value.as_str())),
            Self::TimeBased { value, .. } => value.as_deref().map(Value::from),
            Self::EquipmentCount { value, .. } => Some(match value {
                EquipmentRequirement::AtLeast(n) => Value::from(*n),
                EquipmentRequirement::CharacterLevel => Value::from("character_level"),
            }),
            Self::Unknown { .. } => unreachable!(),
        };

        let mut len = 1;
        if value.is_some() {
            len += 1;
        }
        if description.is_some() {
            len += 1;
        }

        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("type", self.tag().expect("known tag"))?;
        if let Some(value) = &value {
            map.serialize_entry("value", value)?;
        }
        if let Some(description) = description {
            map.serialize_entry("description", description)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from_value(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx_with(key: &str, value: ConditionValue) -> CombatContext {
        let mut ctx = CombatContext::default();
        ctx.conditions.insert(key.to_owned(), value);
        ctx
    }

    #[test]
    fn known_tags_round_trip() {
        let condition = Condition::weapon_type("straight_sword").described("sword only");
        let json = serde_json::to_value(&condition).unwrap();
        assert_eq!(
            json,
            json!({"type": "weapon_type", "value": "straight_sword", "description": "sword only"})
        );
        let back: Condition = serde_json::from_value(json).unwrap();
        assert_eq!(back, condition);
    }

    #[test]
    fn unknown_tag_round_trips_opaquely_and_fails() {
        let raw = json!({"type": "moon_phase", "value": "full", "extra": 1});
        let condition: Condition = serde_json::from_value(raw.clone()).unwrap();
        assert!(matches!(condition, Condition::Unknown { .. }));
        assert!(!condition.evaluate(&CombatContext::default()));
        assert_eq!(serde_json::to_value(&condition).unwrap(), raw);
        assert!(condition.structural_issue().is_none());
    }

    #[test]
    fn malformed_known_tag_is_a_structural_issue() {
        let raw = json!({"type": "health_threshold", "value": "half"});
        let condition: Condition = serde_json::from_value(raw).unwrap();
        assert!(matches!(condition, Condition::Unknown { .. }));
        assert!(condition.structural_issue().unwrap().contains("health_threshold"));
    }

    #[test]
    fn health_threshold_requires_context_value() {
        let condition = Condition::health_threshold(30.0);
        assert!(!condition.evaluate(&CombatContext::default()));
        assert!(condition.evaluate(&ctx_with("health_percentage", ConditionValue::Number(25.0))));
        assert!(!condition.evaluate(&ctx_with("health_percentage", ConditionValue::Number(31.0))));
    }

    #[test]
    fn equipment_count_compares_and_scaling_marker_passes() {
        let at_least = Condition::equipment_count(3);
        assert!(at_least.evaluate(&ctx_with("equipment_count", ConditionValue::Number(3.0))));
        assert!(!at_least.evaluate(&ctx_with("equipment_count", ConditionValue::Number(2.0))));
        assert!(!at_least.evaluate(&CombatContext::default()));

        let scaling = Condition::character_level_scaling();
        assert!(scaling.evaluate(&CombatContext::default()));
        assert!(scaling.is_character_level_scaling());
    }

    #[test]
    fn equipment_count_scaling_marker_round_trips() {
        let scaling = Condition::character_level_scaling();
        let json = serde_json::to_value(&scaling).unwrap();
        assert_eq!(json, json!({"type": "equipment_count", "value": "character_level"}));
        let back: Condition = serde_json::from_value(json).unwrap();
        assert_eq!(back, scaling);
    }

    #[test]
    fn time_based_always_passes() {
        let condition: Condition =
            serde_json::from_value(json!({"type": "time_based", "value": "night"})).unwrap();
        assert!(condition.evaluate(&CombatContext::default()));
    }
}
