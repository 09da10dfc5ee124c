//! Stacking-group processors.
//!
//! The first level of the engine's two-level dispatch: each stacking rule
//! maps to a [`GroupProcessor`] registered at engine construction, and the
//! groups run in the fixed order additive → multiplicative → overwrite →
//! unique. New rules are added by registering a processor.

use std::cmp::Reverse;

use crate::condition::Condition;
use crate::context::CombatContext;
use crate::effect::{Effect, EffectType, StackingRule};
use crate::relic::Relic;

use super::result::{ConditionalEffectNote, Operation, StackingBonus};
use super::route::{EffectRouter, ValueRoute, conversion_factor};
use super::state::CompositionState;

/// An effect paired with its owning relic, for traces and tie-breaks.
#[derive(Clone, Copy)]
pub struct EffectRef<'a> {
    pub relic: &'a Relic,
    pub effect: &'a Effect,
}

impl<'a> EffectRef<'a> {
    /// All-must-hold condition check against the context.
    pub fn passes(&self, ctx: &CombatContext) -> bool {
        self.effect.conditions.iter().all(|c| c.evaluate(ctx))
    }

    /// Effect value after level scaling.
    ///
    /// The only value-modifying rule: an `attack_percentage` effect carrying
    /// the `equipment_count: "character_level"` marker uses
    /// `value × character_level`, applied before stacking accumulation.
    pub fn effective_value(&self, ctx: &CombatContext) -> f64 {
        if self.effect.effect_type == EffectType::AttackPercentage
            && self
                .effect
                .conditions
                .iter()
                .any(Condition::is_character_level_scaling)
        {
            self.effect.value * f64::from(ctx.character_level)
        } else {
            self.effect.value
        }
    }

    /// Deterministic ordering key used for overwrite tie-breaks.
    pub fn sort_key(&self) -> (&'a str, &'a str) {
        (self.relic.id.as_str(), self.effect.id.as_str())
    }

    fn trace(&self, value: f64, applied: bool, note: Option<String>) -> StackingBonus {
        StackingBonus {
            stacking_rule: self.effect.stacking_rule,
            effect_type: self.effect.effect_type,
            relic_id: self.relic.id.clone(),
            relic_name: self.relic.name.clone(),
            effect_id: self.effect.id.clone(),
            effect_name: self.effect.name.clone(),
            value,
            applied,
            note,
        }
    }

    fn conditional_note(&self, satisfied: bool) -> ConditionalEffectNote {
        ConditionalEffectNote {
            relic_name: self.relic.name.clone(),
            effect_name: self.effect.name.clone(),
            effect_type: self.effect.effect_type,
            value: self.effect.value,
            conditions: self
                .effect
                .conditions
                .iter()
                .map(Condition::display_label)
                .collect(),
            satisfied,
        }
    }
}

/// Processes one stacking group against the accumulator.
pub trait GroupProcessor: Send + Sync {
    /// The stacking rule this processor handles.
    fn rule(&self) -> StackingRule;

    /// Applies the group's effects (already filtered to this rule, in
    /// deterministic input order) to the state.
    fn process(
        &self,
        effects: &[EffectRef<'_>],
        ctx: &CombatContext,
        router: &EffectRouter,
        state: &mut CompositionState,
    );
}

/// Splits a group into effect-type sub-groups, preserving first-appearance
/// order of types and input order within each sub-group.
fn by_effect_type<'a>(effects: &[EffectRef<'a>]) -> Vec<(EffectType, Vec<EffectRef<'a>>)> {
    let mut groups: Vec<(EffectType, Vec<EffectRef<'a>>)> = Vec::new();
    for effect in effects {
        match groups
            .iter_mut()
            .find(|(ty, _)| *ty == effect.effect.effect_type)
        {
            Some((_, bucket)) => bucket.push(*effect),
            None => groups.push((effect.effect.effect_type, vec![*effect])),
        }
    }
    groups
}

const NOT_MET: &str = "conditions not met";
const RECORD_ONLY: &str = "recorded; no attack contribution";

/// Additive: sub-group by effect type, sum passing values, route the sum.
pub struct AdditiveProcessor;

impl GroupProcessor for AdditiveProcessor {
    fn rule(&self) -> StackingRule {
        StackingRule::Additive
    }

    fn process(
        &self,
        effects: &[EffectRef<'_>],
        ctx: &CombatContext,
        router: &EffectRouter,
        state: &mut CompositionState,
    ) {
        for (effect_type, bucket) in by_effect_type(effects) {
            let route = router.route(effect_type);
            let numeric = matches!(route, ValueRoute::Flat | ValueRoute::Percent);
            let mut sum = 0.0;

            for effect in &bucket {
                if effect.passes(ctx) {
                    let value = effect.effective_value(ctx);
                    sum += value;
                    let note = (!numeric).then(|| RECORD_ONLY.to_owned());
                    state.record(effect.trace(value, numeric, note));
                } else {
                    state.record(effect.trace(
                        effect.effect.value,
                        false,
                        Some(NOT_MET.to_owned()),
                    ));
                }
            }

            if sum == 0.0 {
                continue;
            }
            match route {
                ValueRoute::Flat => state.add_flat(sum),
                ValueRoute::Percent => state.add_percent(sum),
                _ => {}
            }
            let suffix = if numeric { "" } else { " (recorded)" };
            state.push_step(
                Operation::Add,
                format!("{effect_type} additive total{suffix}"),
                sum,
                None,
                None,
            );
        }
    }
}

/// Multiplicative: every passing effect multiplies the lane individually.
pub struct MultiplicativeProcessor;

impl GroupProcessor for MultiplicativeProcessor {
    fn rule(&self) -> StackingRule {
        StackingRule::Multiplicative
    }

    fn process(
        &self,
        effects: &[EffectRef<'_>],
        ctx: &CombatContext,
        _router: &EffectRouter,
        state: &mut CompositionState,
    ) {
        for effect in effects {
            if !effect.passes(ctx) {
                state.record(effect.trace(
                    effect.effect.value,
                    false,
                    Some(NOT_MET.to_owned()),
                ));
                continue;
            }
            let value = effect.effective_value(ctx);
            let factor = conversion_factor(effect.effect.effect_type, value);
            state.multiply(factor);
            state.record(effect.trace(value, true, None));
            state.push_step(
                Operation::Multiply,
                format!("{} ×{factor}", effect.effect.name),
                factor,
                Some(effect.relic.name.clone()),
                Some(effect.effect.name.clone()),
            );
        }
    }
}

/// Overwrite: highest priority per effect type wins; ties break on the
/// lexicographically smaller `(relic_id, effect_id)`.
pub struct OverwriteProcessor;

impl GroupProcessor for OverwriteProcessor {
    fn rule(&self) -> StackingRule {
        StackingRule::Overwrite
    }

    fn process(
        &self,
        effects: &[EffectRef<'_>],
        ctx: &CombatContext,
        router: &EffectRouter,
        state: &mut CompositionState,
    ) {
        for (effect_type, bucket) in by_effect_type(effects) {
            let mut winner: Option<usize> = None;
            for (index, effect) in bucket.iter().enumerate() {
                if !effect.passes(ctx) {
                    state.record(effect.trace(
                        effect.effect.value,
                        false,
                        Some(NOT_MET.to_owned()),
                    ));
                    continue;
                }
                winner = Some(match winner {
                    None => index,
                    Some(best) => {
                        let candidate =
                            (Reverse(effect.effect.priority), effect.sort_key());
                        let incumbent =
                            (Reverse(bucket[best].effect.priority), bucket[best].sort_key());
                        if candidate < incumbent { index } else { best }
                    }
                });
            }

            let Some(winner) = winner else { continue };

            for (index, effect) in bucket.iter().enumerate() {
                if index == winner || !effect.passes(ctx) {
                    continue;
                }
                state.record(effect.trace(
                    effect.effect.value,
                    false,
                    Some(format!("overwritten by {}", bucket[winner].effect.name)),
                ));
            }

            let winner = bucket[winner];
            let value = winner.effective_value(ctx);
            let applied = match router.route(effect_type) {
                ValueRoute::Flat => {
                    state.set_flat(value);
                    true
                }
                ValueRoute::Percent => {
                    state.set_percent(value);
                    true
                }
                ValueRoute::Multiplier => {
                    state.set_mult(conversion_factor(effect_type, value));
                    true
                }
                _ => false,
            };
            let note = (!applied).then(|| RECORD_ONLY.to_owned());
            state.record(winner.trace(value, applied, note));
            if applied {
                state.push_step(
                    Operation::Overwrite,
                    format!("{} overwrites {effect_type}", winner.effect.name),
                    value,
                    Some(winner.relic.name.clone()),
                    Some(winner.effect.name.clone()),
                );
            }
        }
    }
}

/// Unique: effects never stack with themselves but distinct uniques coexist.
pub struct UniqueProcessor;

impl GroupProcessor for UniqueProcessor {
    fn rule(&self) -> StackingRule {
        StackingRule::Unique
    }

    fn process(
        &self,
        effects: &[EffectRef<'_>],
        ctx: &CombatContext,
        router: &EffectRouter,
        state: &mut CompositionState,
    ) {
        for effect in effects {
            let passes = effect.passes(ctx);

            match router.route(effect.effect.effect_type) {
                ValueRoute::ConditionalNote => {
                    state.annotate(effect.conditional_note(passes));
                    state.record(effect.trace(
                        effect.effect.value,
                        false,
                        Some("recorded as conditional effect".to_owned()),
                    ));
                }
                ValueRoute::WeaponMultiplier | ValueRoute::Multiplier if passes => {
                    let value = effect.effective_value(ctx);
                    let factor = conversion_factor(effect.effect.effect_type, value);
                    state.multiply(factor);
                    state.record(effect.trace(value, true, None));
                    state.push_step(
                        Operation::Multiply,
                        format!("{} ×{factor}", effect.effect.name),
                        factor,
                        Some(effect.relic.name.clone()),
                        Some(effect.effect.name.clone()),
                    );
                }
                _ => {
                    let note = if passes { RECORD_ONLY } else { NOT_MET };
                    state.record(effect.trace(effect.effect.value, false, Some(note.to_owned())));
                }
            }
        }
    }
}

/// `StackingRule → GroupProcessor` registry.
pub struct ProcessorRegistry {
    processors: Vec<Box<dyn GroupProcessor>>,
}

impl ProcessorRegistry {
    /// Registry with the four standard processors.
    pub fn with_defaults() -> Self {
        Self {
            processors: vec![
                Box::new(AdditiveProcessor),
                Box::new(MultiplicativeProcessor),
                Box::new(OverwriteProcessor),
                Box::new(UniqueProcessor),
            ],
        }
    }

    /// Registers a processor, replacing any existing one for the same rule.
    pub fn register(&mut self, processor: Box<dyn GroupProcessor>) {
        self.processors.retain(|p| p.rule() != processor.rule());
        self.processors.push(processor);
    }

    pub fn get(&self, rule: StackingRule) -> Option<&dyn GroupProcessor> {
        self.processors
            .iter()
            .find(|p| p.rule() == rule)
            .map(Box::as_ref)
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
