//! Accumulator threaded through the composition pipeline.
//!
//! Formula invariant:
//!
//! ```text
//! final = (base_attack + flat) × (1 + percent/100) × mult
//! total_multiplier = round3(final / base_attack)
//! ```

use std::collections::BTreeMap;

use strum::IntoEnumIterator;

use crate::ENGINE_VERSION;
use crate::effect::DamageType;

use super::result::{
    BreakdownStep, CompositionResult, ConditionalEffectNote, Operation, StackingBonus,
};

/// Rounds to 3 decimal places (multiplier precision).
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Rounds to 2 decimal places (attack-power precision).
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mutable state carried through the stacking-group processors.
pub struct CompositionState {
    base_attack: f64,
    flat: f64,
    percent: f64,
    mult: f64,
    stacking_bonuses: Vec<StackingBonus>,
    conditional_effects: Vec<ConditionalEffectNote>,
    breakdown: Vec<BreakdownStep>,
    warnings: Vec<String>,
    include_breakdown: bool,
}

impl CompositionState {
    pub(crate) fn new(base_attack: f64, include_breakdown: bool) -> Self {
        let mut state = Self {
            base_attack,
            flat: 0.0,
            percent: 0.0,
            mult: 1.0,
            stacking_bonuses: Vec::new(),
            conditional_effects: Vec::new(),
            breakdown: Vec::new(),
            warnings: Vec::new(),
            include_breakdown,
        };
        state.push_step(
            Operation::Base,
            "base attack power".to_owned(),
            base_attack,
            None,
            None,
        );
        state
    }

    pub fn flat(&self) -> f64 {
        self.flat
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn mult(&self) -> f64 {
        self.mult
    }

    pub fn add_flat(&mut self, value: f64) {
        self.flat += value;
    }

    pub fn add_percent(&mut self, value: f64) {
        self.percent += value;
    }

    pub fn multiply(&mut self, factor: f64) {
        self.mult *= factor;
    }

    pub fn set_flat(&mut self, value: f64) {
        self.flat = value;
    }

    pub fn set_percent(&mut self, value: f64) {
        self.percent = value;
    }

    pub fn set_mult(&mut self, factor: f64) {
        self.mult = factor;
    }

    /// Current value of the final formula with the lanes as they stand.
    pub fn running_total(&self) -> f64 {
        (self.base_attack + self.flat) * (1.0 + self.percent / 100.0) * self.mult
    }

    /// Appends a breakdown step with the next 1-based index.
    pub fn push_step(
        &mut self,
        operation: Operation,
        description: String,
        value: f64,
        relic_name: Option<String>,
        effect_name: Option<String>,
    ) {
        if !self.include_breakdown {
            return;
        }
        let step = self.breakdown.len() as u32 + 1;
        let running_total = round2(self.running_total());
        self.breakdown.push(BreakdownStep {
            step,
            description,
            operation,
            value,
            running_total,
            relic_name,
            effect_name,
        });
    }

    pub fn record(&mut self, bonus: StackingBonus) {
        self.stacking_bonuses.push(bonus);
    }

    pub fn annotate(&mut self, note: ConditionalEffectNote) {
        self.conditional_effects.push(note);
    }

    pub fn warn(&mut self, message: String) {
        if !self.warnings.contains(&message) {
            self.warnings.push(message);
        }
    }

    /// Seals the accumulator into a result.
    pub(crate) fn finish(self) -> CompositionResult {
        let final_power = self.running_total();
        let total_multiplier = round3(final_power / self.base_attack);
        let final_attack_power = round2(final_power);

        let mut damage_by_type: BTreeMap<DamageType, f64> =
            DamageType::iter().map(|dt| (dt, 0.0)).collect();
        damage_by_type.insert(DamageType::Physical, final_attack_power);

        CompositionResult {
            total_multiplier,
            base_multiplier: 1.0,
            base_attack: self.base_attack,
            final_attack_power,
            stacking_bonuses: self.stacking_bonuses,
            conditional_effects: self.conditional_effects,
            breakdown: self.breakdown,
            damage_by_type,
            warnings: self.warnings,
            engine_version: ENGINE_VERSION.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_helpers() {
        assert_eq!(round3(1.4444449), 1.444);
        assert_eq!(round3(1.0006), 1.001);
        assert_eq!(round2(123.456), 123.46);
    }

    #[test]
    fn formula_combines_all_three_lanes() {
        let mut state = CompositionState::new(100.0, true);
        state.add_flat(20.0);
        state.add_percent(50.0);
        state.multiply(1.2);
        // (100 + 20) × 1.5 × 1.2 = 216
        assert_eq!(state.running_total(), 216.0);

        let result = state.finish();
        assert_eq!(result.total_multiplier, 2.16);
        assert_eq!(result.final_attack_power, 216.0);
        assert_eq!(result.damage_by_type[&DamageType::Physical], 216.0);
        assert_eq!(result.damage_by_type[&DamageType::Fire], 0.0);
        assert_eq!(result.damage_by_type.len(), 7);
    }

    #[test]
    fn empty_state_yields_identity_multiplier() {
        let result = CompositionState::new(100.0, true).finish();
        assert_eq!(result.total_multiplier, 1.0);
        assert_eq!(result.final_attack_power, 100.0);
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].operation, Operation::Base);
        assert_eq!(result.breakdown[0].step, 1);
    }

    #[test]
    fn breakdown_can_be_suppressed() {
        let mut state = CompositionState::new(100.0, false);
        state.add_flat(10.0);
        state.push_step(Operation::Add, "flat".to_owned(), 10.0, None, None);
        let result = state.finish();
        assert!(result.breakdown.is_empty());
        assert_eq!(result.total_multiplier, 1.1);
    }
}
