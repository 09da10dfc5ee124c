//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use std::sync::Arc;

use relic_core::{Effect, EffectType, Quality, Rarity, Relic, RelicCategory, RelicId, StackingRule};
use relic_engine::{InMemoryRelicRepo, RelicEngine};

/// Opt-in log output for debugging test runs: `RUST_LOG=engine=debug`.
fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Engine backed by an in-memory repository seeded with `relics`.
pub fn engine_with(relics: impl IntoIterator<Item = Relic>) -> RelicEngine {
    init_tracing();
    RelicEngine::builder()
        .with_repository(Arc::new(InMemoryRelicRepo::with_relics(relics)))
        .build()
}

/// Engine seeded with the built-in sample catalog.
#[allow(dead_code)]
pub fn engine_with_builtin_catalog() -> RelicEngine {
    engine_with(relic_content::builtin().relics)
}

pub fn ids(raw: &[&str]) -> Vec<RelicId> {
    raw.iter().map(|id| RelicId::from(*id)).collect()
}

pub fn attack_relic(id: &str, name: &str, difficulty: u8) -> Relic {
    Relic::new(id, name, RelicCategory::Attack, Rarity::Rare, Quality::Polished, difficulty)
}

/// Relic with one additive `attack_percentage` effect.
#[allow(dead_code)]
pub fn percentage_relic(id: &str, name: &str, value: f64) -> Relic {
    attack_relic(id, name, 3).with_effect(Effect::new(
        format!("{id}_pct"),
        format!("{name} Edge"),
        EffectType::AttackPercentage,
        value,
        StackingRule::Additive,
    ))
}

/// Relic with one multiplicative `attack_multiplier` effect.
#[allow(dead_code)]
pub fn multiplier_relic(id: &str, name: &str, value: f64) -> Relic {
    attack_relic(id, name, 4).with_effect(Effect::new(
        format!("{id}_mult"),
        format!("{name} Fury"),
        EffectType::AttackMultiplier,
        value,
        StackingRule::Multiplicative,
    ))
}
