//! Pure domain model and deterministic composition engine for relic builds.
//!
//! This crate owns the data model (relics, effects, conditions, combat
//! context, builds) and the Effect Composition Engine that turns a validated
//! relic selection plus a context into an attack-power multiplier with a
//! full audit trail.
//!
//! Everything here is synchronous and deterministic: given the same relic
//! list, context, and [`ENGINE_VERSION`], composition produces byte-identical
//! numeric fields and breakdown ordering. I/O concerns (repositories, the
//! result cache, request handling) live in the `relic-engine` crate.
//!
//! Modules are organized by responsibility:
//! - [`relic`], [`effect`], [`condition`] hold the catalog-facing data model
//! - [`context`] is the runtime situation effects are evaluated against
//! - [`build`] is the user-facing ordered relic selection
//! - [`compose`] hosts the composition engine and its result types

pub mod build;
pub mod compose;
pub mod condition;
pub mod context;
pub mod effect;
pub mod error;
pub mod relic;

/// Version stamped into every composition result and cache entry.
///
/// Bumping this invalidates all previously cached results: the version is
/// part of the cache key, so prior entries simply stop matching.
pub const ENGINE_VERSION: &str = "2.1.0";

/// Hard cap on the number of relics in any composition input or build.
pub const MAX_RELIC_SELECTION: usize = 9;

pub use build::{Build, BuildError, BuildSlot};
pub use compose::{
    BreakdownStep, ComposeOptions, CompositionResult, Composer, ConditionalEffectNote, Deadline,
    Operation, StackingBonus,
};
pub use condition::{Condition, ConditionValue, EquipmentRequirement};
pub use context::{CombatContext, CombatStyle, ContextError, parse_combat_style};
pub use effect::{DamageType, Effect, EffectId, EffectType, StackingRule, SynergyGroup};
pub use error::CalcError;
pub use relic::{Quality, Rarity, Relic, RelicCategory, RelicId};
