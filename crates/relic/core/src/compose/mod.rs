//! The Effect Composition Engine.
//!
//! Turns a validated relic selection plus a combat context into an
//! attack-power multiplier with a complete audit trail. Processing order is
//! deterministic and part of the contract: relics in caller-provided order,
//! effects within a relic in insertion order, stacking groups in the fixed
//! additive → multiplicative → overwrite → unique order.

mod deadline;
mod groups;
mod result;
mod route;
mod state;

pub use deadline::Deadline;
pub use groups::{EffectRef, GroupProcessor, ProcessorRegistry};
pub use result::{
    BreakdownStep, CompositionResult, ConditionalEffectNote, Operation, StackingBonus,
};
pub use route::{EffectRouter, ValueRoute, conversion_factor};
pub use state::CompositionState;

use std::time::Instant;

use crate::condition::Condition;
use crate::context::CombatContext;
use crate::effect::StackingRule;
use crate::error::CalcError;
use crate::relic::Relic;

/// Per-call composition options.
#[derive(Clone, Copy, Debug)]
pub struct ComposeOptions {
    /// Emit the ordered breakdown trail (on by default).
    pub include_breakdown: bool,
    /// Cooperative deadline, checked at stacking-group boundaries.
    pub deadline: Deadline,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            include_breakdown: true,
            deadline: Deadline::none(),
        }
    }
}

/// The composition engine: a processor registry plus an effect router.
///
/// Construction builds both dispatch tables; composing borrows them
/// immutably, so one engine is shared freely across request handlers.
pub struct Composer {
    registry: ProcessorRegistry,
    router: EffectRouter,
}

impl Composer {
    pub fn new() -> Self {
        Self {
            registry: ProcessorRegistry::with_defaults(),
            router: EffectRouter::with_defaults(),
        }
    }

    /// Replaces the processor for a stacking rule.
    pub fn register_processor(&mut self, processor: Box<dyn GroupProcessor>) {
        self.registry.register(processor);
    }

    /// Replaces the value route for an effect type.
    pub fn register_route(&mut self, effect_type: crate::effect::EffectType, route: ValueRoute) {
        self.router.register(effect_type, route);
    }

    /// Composes a validated relic selection against a context.
    ///
    /// Callers are expected to have validated the selection (size, duplicates,
    /// conflicts, active flags); this function trusts the relic list and
    /// only revalidates the context, which it normalizes first.
    pub fn compose(
        &self,
        relics: &[Relic],
        context: &CombatContext,
        options: &ComposeOptions,
    ) -> Result<CompositionResult, CalcError> {
        let started = Instant::now();
        let ctx = context.normalized();
        ctx.validate()?;

        let mut state = CompositionState::new(ctx.base_attack, options.include_breakdown);

        // Gather active effects across all relics, preserving caller order.
        let all_effects: Vec<EffectRef<'_>> = relics
            .iter()
            .flat_map(|relic| {
                relic
                    .active_effects()
                    .map(move |effect| EffectRef { relic, effect })
            })
            .collect();

        self.collect_condition_warnings(&all_effects, &mut state);

        for rule in StackingRule::PROCESSING_ORDER {
            if options.deadline.expired() {
                return Err(CalcError::Timeout {
                    elapsed_ms: started.elapsed().as_millis() as u64,
                });
            }
            let group: Vec<EffectRef<'_>> = all_effects
                .iter()
                .copied()
                .filter(|e| e.effect.stacking_rule == rule)
                .collect();
            if group.is_empty() {
                continue;
            }
            if let Some(processor) = self.registry.get(rule) {
                processor.process(&group, &ctx, &self.router, &mut state);
            }
        }

        Ok(state.finish())
    }

    fn collect_condition_warnings(&self, effects: &[EffectRef<'_>], state: &mut CompositionState) {
        for effect in effects {
            for condition in &effect.effect.conditions {
                match condition {
                    Condition::TimeBased { .. } => state.warn(format!(
                        "effect '{}' has a time-based condition, which is treated as always active",
                        effect.effect.name
                    )),
                    Condition::Unknown { .. } => state.warn(format!(
                        "effect '{}' has an unrecognized condition and was disabled",
                        effect.effect.name
                    )),
                    _ => {}
                }
            }
        }
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}
