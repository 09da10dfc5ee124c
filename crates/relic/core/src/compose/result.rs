//! Composition output types: the multiplier, its audit trail, and traces.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::effect::{DamageType, EffectId, EffectType, StackingRule};
use crate::relic::RelicId;

/// How a breakdown step changed the running total.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Operation {
    Base,
    Add,
    Multiply,
    Overwrite,
}

/// One ordered step of the composition audit trail.
///
/// Step indices are 1-based and strictly monotonic; their ordering is part
/// of the engine contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BreakdownStep {
    pub step: u32,
    pub description: String,
    pub operation: Operation,
    pub value: f64,
    pub running_total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relic_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_name: Option<String>,
}

/// Trace record for a single effect's participation in its stacking group.
///
/// `applied` is true only when the effect changed a numeric lane; recorded
/// effects (critical, elemental, annotation-only uniques) and effects whose
/// conditions failed keep `applied = false` with an explanatory note.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StackingBonus {
    pub stacking_rule: StackingRule,
    pub effect_type: EffectType,
    pub relic_id: RelicId,
    pub relic_name: String,
    pub effect_id: EffectId,
    pub effect_name: String,
    /// Effective value after level scaling, when the effect participated.
    pub value: f64,
    pub applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Annotation for a conditional effect surfaced alongside the number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConditionalEffectNote {
    pub relic_name: String,
    pub effect_name: String,
    pub effect_type: EffectType,
    pub value: f64,
    /// Display labels of the effect's conditions, in declaration order.
    pub conditions: Vec<String>,
    /// Whether every condition held under the supplied context.
    pub satisfied: bool,
}

/// Result of composing a validated relic selection against a context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositionResult {
    /// Final attack-power multiplier, rounded to 3 decimals.
    pub total_multiplier: f64,
    /// Always 1.0; kept explicit for client display.
    pub base_multiplier: f64,
    /// Base attack power the composition started from.
    pub base_attack: f64,
    /// `base × total_multiplier`, rounded to 2 decimals.
    pub final_attack_power: f64,
    pub stacking_bonuses: Vec<StackingBonus>,
    pub conditional_effects: Vec<ConditionalEffectNote>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breakdown: Vec<BreakdownStep>,
    /// All seven damage types; only `physical` receives the total today.
    pub damage_by_type: BTreeMap<DamageType, f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Engine version that produced this result.
    pub engine_version: String,
}

impl CompositionResult {
    /// Effects that numerically changed the multiplier, in processing order.
    pub fn applied_bonuses(&self) -> impl Iterator<Item = &StackingBonus> {
        self.stacking_bonuses.iter().filter(|b| b.applied)
    }
}
