//! Effect-type dispatch: which numeric lane (if any) a value flows into.
//!
//! The router is the second level of the engine's two-level dispatch
//! (stacking rule selects a group processor, effect type selects a value
//! route). Both tables are built at engine construction; adding a new
//! effect type means registering a route, not extending a match deep in
//! the composition loop.

use std::collections::BTreeMap;

use crate::effect::EffectType;

/// Destination of an effect's value within the accumulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueRoute {
    /// Additive flat lane (`flat_bonuses`).
    Flat,
    /// Additive percentage lane (`percentage_bonuses`).
    Percent,
    /// Multiplicative lane (`multiplicative_bonuses`).
    Multiplier,
    /// Multiplicative lane, but only via the unique group's
    /// weapon-specific handling.
    WeaponMultiplier,
    /// Annotation-only: surfaced in `conditional_effects`, never numeric.
    ConditionalNote,
    /// Recorded in stacking traces without touching the number.
    RecordOnly,
}

/// `EffectType → ValueRoute` table.
#[derive(Clone, Debug)]
pub struct EffectRouter {
    routes: BTreeMap<EffectType, ValueRoute>,
}

impl EffectRouter {
    /// Builds the standard routing table.
    pub fn with_defaults() -> Self {
        let mut router = Self {
            routes: BTreeMap::new(),
        };
        router.register(EffectType::AttackFlat, ValueRoute::Flat);
        router.register(EffectType::AttackPercentage, ValueRoute::Percent);
        router.register(EffectType::AttackMultiplier, ValueRoute::Multiplier);
        router.register(EffectType::CriticalMultiplier, ValueRoute::RecordOnly);
        router.register(EffectType::CriticalChance, ValueRoute::RecordOnly);
        router.register(EffectType::ElementalDamage, ValueRoute::RecordOnly);
        router.register(EffectType::ConditionalDamage, ValueRoute::ConditionalNote);
        router.register(EffectType::WeaponSpecific, ValueRoute::WeaponMultiplier);
        router.register(EffectType::Unique, ValueRoute::RecordOnly);
        router
    }

    /// Registers (or replaces) the route for an effect type.
    pub fn register(&mut self, effect_type: EffectType, route: ValueRoute) {
        self.routes.insert(effect_type, route);
    }

    /// Route for an effect type; unregistered types are record-only.
    pub fn route(&self, effect_type: EffectType) -> ValueRoute {
        self.routes
            .get(&effect_type)
            .copied()
            .unwrap_or(ValueRoute::RecordOnly)
    }
}

impl Default for EffectRouter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Converts an effect value into a multiplier factor.
///
/// Multiplier-typed values are used as-is (`1.2` means ×1.2); everything
/// else is a percentage (`7` means ×1.07).
pub fn conversion_factor(effect_type: EffectType, value: f64) -> f64 {
    match effect_type {
        EffectType::AttackMultiplier | EffectType::CriticalMultiplier => value,
        _ => 1.0 + value / 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_routes_match_the_contract() {
        let router = EffectRouter::with_defaults();
        assert_eq!(router.route(EffectType::AttackFlat), ValueRoute::Flat);
        assert_eq!(router.route(EffectType::AttackPercentage), ValueRoute::Percent);
        assert_eq!(
            router.route(EffectType::AttackMultiplier),
            ValueRoute::Multiplier
        );
        assert_eq!(
            router.route(EffectType::WeaponSpecific),
            ValueRoute::WeaponMultiplier
        );
        assert_eq!(
            router.route(EffectType::ConditionalDamage),
            ValueRoute::ConditionalNote
        );
        assert_eq!(router.route(EffectType::CriticalChance), ValueRoute::RecordOnly);
    }

    #[test]
    fn conversion_uses_multipliers_as_is_and_percents_otherwise() {
        assert_eq!(conversion_factor(EffectType::AttackMultiplier, 1.2), 1.2);
        assert_eq!(conversion_factor(EffectType::CriticalMultiplier, 2.0), 2.0);
        assert_eq!(conversion_factor(EffectType::AttackPercentage, 50.0), 1.5);
        assert_eq!(conversion_factor(EffectType::WeaponSpecific, 7.0), 1.07);
    }

    #[test]
    fn routes_can_be_replaced() {
        let mut router = EffectRouter::with_defaults();
        router.register(EffectType::ElementalDamage, ValueRoute::Percent);
        assert_eq!(router.route(EffectType::ElementalDamage), ValueRoute::Percent);
    }
}
