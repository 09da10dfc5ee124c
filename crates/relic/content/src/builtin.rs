//! Built-in sample catalog.
//!
//! A compact set exercising every effect type, stacking rule, and condition
//! tag. Tests and demos seed repositories from this instead of shipping
//! fixture files.

use relic_core::{
    CombatStyle, Condition, Effect, EffectType, Quality, Rarity, Relic, RelicCategory,
    StackingRule,
};

use super::catalog::Catalog;

/// Returns the built-in sample catalog.
pub fn builtin() -> Catalog {
    Catalog::new(vec![
        Relic::new(
            "warrior_band",
            "Warrior Band",
            RelicCategory::Attack,
            Rarity::Common,
            Quality::Delicate,
            2,
        )
        .with_description("A plain band worn by foot soldiers.")
        .with_effect(Effect::new(
            "warrior_band_edge",
            "Soldier's Edge",
            EffectType::AttackPercentage,
            10.0,
            StackingRule::Additive,
        )),
        Relic::new(
            "berserker_idol",
            "Berserker Idol",
            RelicCategory::Attack,
            Rarity::Epic,
            Quality::Polished,
            6,
        )
        .with_description("Carved fury; it answers only to rage.")
        .with_effect(Effect::new(
            "berserker_idol_fury",
            "Reckless Fury",
            EffectType::AttackMultiplier,
            1.3,
            StackingRule::Multiplicative,
        ))
        .with_conflict("guardian_sigil"),
        Relic::new(
            "guardian_sigil",
            "Guardian Sigil",
            RelicCategory::Defense,
            Rarity::Rare,
            Quality::Polished,
            4,
        )
        .with_description("Steadies the hand that holds the line.")
        .with_effect(Effect::new(
            "guardian_sigil_bulwark",
            "Bulwark",
            EffectType::AttackFlat,
            15.0,
            StackingRule::Additive,
        )),
        Relic::new(
            "duelist_crest",
            "Duelist Crest",
            RelicCategory::Critical,
            Rarity::Rare,
            Quality::Grand,
            5,
        )
        .with_effect(
            Effect::new(
                "duelist_crest_focus",
                "Duelist's Focus",
                EffectType::CriticalChance,
                12.0,
                StackingRule::Additive,
            )
            .with_condition(Condition::combat_style(CombatStyle::Melee)),
        )
        .with_effect(Effect::new(
            "duelist_crest_strike",
            "Precise Strike",
            EffectType::CriticalMultiplier,
            1.5,
            StackingRule::Multiplicative,
        )),
        Relic::new(
            "sword_saint_relic",
            "Sword Saint's Relic",
            RelicCategory::Attack,
            Rarity::Legendary,
            Quality::Grand,
            9,
        )
        .with_description("Blessed steel remembers its master.")
        .with_effect(
            Effect::new(
                "sword_saint_mastery",
                "Sword Mastery",
                EffectType::WeaponSpecific,
                20.0,
                StackingRule::Unique,
            )
            .with_condition(
                Condition::weapon_type("straight_sword").described("straight swords only"),
            ),
        ),
        Relic::new(
            "executioner_seal",
            "Executioner's Seal",
            RelicCategory::Attack,
            Rarity::Epic,
            Quality::Polished,
            7,
        )
        .with_effect(
            Effect::new(
                "executioner_seal_finish",
                "Finishing Blow",
                EffectType::ConditionalDamage,
                30.0,
                StackingRule::Unique,
            )
            .with_condition(
                Condition::health_threshold(25.0).described("enemy below quarter health"),
            ),
        ),
        Relic::new(
            "scholar_prism",
            "Scholar's Prism",
            RelicCategory::Utility,
            Rarity::Rare,
            Quality::Delicate,
            3,
        )
        .with_description("Grows sharper as its bearer does.")
        .with_effect(
            Effect::new(
                "scholar_prism_growth",
                "Studied Growth",
                EffectType::AttackPercentage,
                0.5,
                StackingRule::Additive,
            )
            .with_condition(Condition::character_level_scaling().described("scales with level")),
        ),
        Relic::new(
            "storm_core",
            "Storm Core",
            RelicCategory::Elemental,
            Rarity::Epic,
            Quality::Grand,
            6,
        )
        .with_effect(
            Effect::new(
                "storm_core_surge",
                "Lightning Surge",
                EffectType::ElementalDamage,
                25.0,
                StackingRule::Additive,
            )
            .with_damage_type(relic_core::DamageType::Lightning),
        ),
        Relic::new(
            "chainmaster_loop",
            "Chainmaster's Loop",
            RelicCategory::Attack,
            Rarity::Rare,
            Quality::Polished,
            4,
        )
        .with_effect(
            Effect::new(
                "chainmaster_loop_opener",
                "Opening Gambit",
                EffectType::AttackPercentage,
                18.0,
                StackingRule::Additive,
            )
            .with_condition(Condition::chain_position(1).described("first hit of a chain")),
        ),
        Relic::new(
            "kings_brand",
            "King's Brand",
            RelicCategory::Attack,
            Rarity::Legendary,
            Quality::Grand,
            8,
        )
        .with_description("There can be only one royal decree.")
        .with_effect(
            Effect::new(
                "kings_brand_decree",
                "Royal Decree",
                EffectType::AttackFlat,
                40.0,
                StackingRule::Overwrite,
            )
            .with_priority(8),
        ),
        Relic::new(
            "pretender_brand",
            "Pretender's Brand",
            RelicCategory::Attack,
            Rarity::Epic,
            Quality::Polished,
            5,
        )
        .with_effect(
            Effect::new(
                "pretender_brand_claim",
                "False Claim",
                EffectType::AttackFlat,
                25.0,
                StackingRule::Overwrite,
            )
            .with_priority(4),
        ),
        Relic::new(
            "dragonsbane_fang",
            "Dragonsbane Fang",
            RelicCategory::Attack,
            Rarity::Epic,
            Quality::Grand,
            7,
        )
        .with_effect(
            Effect::new(
                "dragonsbane_fang_oath",
                "Slayer's Oath",
                EffectType::Unique,
                50.0,
                StackingRule::Unique,
            )
            .with_condition(Condition::enemy_type("dragon").described("dragons only")),
        ),
        Relic::new(
            "night_talisman",
            "Night Talisman",
            RelicCategory::Utility,
            Rarity::Common,
            Quality::Delicate,
            1,
        )
        .with_effect(
            Effect::new(
                "night_talisman_hour",
                "Midnight Hour",
                EffectType::AttackPercentage,
                8.0,
                StackingRule::Additive,
            )
            .with_condition(serde_json::from_value(serde_json::json!({
                "type": "time_based",
                "value": "night",
                "description": "between dusk and dawn"
            })).expect("valid condition")),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = builtin();
        assert!(catalog.issues().is_empty(), "{:?}", catalog.issues());
        assert!(catalog.len() >= 10);
    }

    #[test]
    fn builtin_catalog_round_trips_through_json() {
        let catalog = builtin();
        let json = serde_json::to_string(&catalog).unwrap();
        let back: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);
    }

    #[test]
    fn builtin_covers_every_stacking_rule() {
        let catalog = builtin();
        for rule in StackingRule::PROCESSING_ORDER {
            assert!(
                catalog
                    .relics
                    .iter()
                    .flat_map(|r| r.effects.iter())
                    .any(|e| e.stacking_rule == rule),
                "missing stacking rule {rule}"
            );
        }
    }
}
