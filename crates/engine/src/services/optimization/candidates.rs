//! Candidate combination generation.
//!
//! Four strategies feed one deduplicated set: per-slot replacement,
//! addition (plus pairwise adds for small builds), synergy pairing over
//! dominant effect-type buckets, and configured meta lists. Generation is
//! deterministic: the pool arrives sorted by id and every strategy iterates
//! in stable order.

use std::collections::{BTreeMap, BTreeSet};

use relic_core::{CombatStyle, MAX_RELIC_SELECTION, Relic, RelicId, SynergyGroup};

/// Deduplicating candidate collector with structural pruning.
///
/// Combinations are canonicalized to sorted id order (composition totals
/// are order-independent, so the sorted form is the natural identity).
/// Oversized or internally conflicting combinations are rejected here.
struct CandidateSet<'a> {
    relic_map: BTreeMap<&'a RelicId, &'a Relic>,
    seen: BTreeSet<Vec<RelicId>>,
    combos: Vec<Vec<RelicId>>,
}

impl<'a> CandidateSet<'a> {
    fn new(current: &'a [Relic], pool: &'a [Relic]) -> Self {
        let relic_map = current
            .iter()
            .chain(pool.iter())
            .map(|relic| (&relic.id, relic))
            .collect();
        Self {
            relic_map,
            seen: BTreeSet::new(),
            combos: Vec::new(),
        }
    }

    fn insert(&mut self, ids: Vec<RelicId>) {
        if ids.is_empty() || ids.len() > MAX_RELIC_SELECTION {
            return;
        }
        let mut canonical = ids;
        canonical.sort();
        canonical.dedup();
        if self.seen.contains(&canonical) || self.has_conflict(&canonical) {
            return;
        }
        self.seen.insert(canonical.clone());
        self.combos.push(canonical);
    }

    /// Undirected intra-set conflict check.
    fn has_conflict(&self, ids: &[RelicId]) -> bool {
        for (index, id) in ids.iter().enumerate() {
            let Some(relic) = self.relic_map.get(id) else {
                return true;
            };
            for other_id in &ids[index + 1..] {
                let Some(other) = self.relic_map.get(other_id) else {
                    return true;
                };
                if relic.conflicts_with(other_id) || other.conflicts_with(id) {
                    return true;
                }
            }
        }
        false
    }
}

/// Pairwise adds are only attempted for builds at or below this size.
const PAIRWISE_ADDITION_MAX_CURRENT: usize = 3;

/// Generates candidate combinations from all four strategies.
pub(crate) fn generate(
    current: &[Relic],
    pool: &[Relic],
    combat_style: CombatStyle,
    meta_builds: &BTreeMap<CombatStyle, Vec<Vec<RelicId>>>,
) -> Vec<Vec<RelicId>> {
    let mut set = CandidateSet::new(current, pool);
    let current_ids: Vec<RelicId> = current.iter().map(|r| r.id.clone()).collect();

    replacement(&current_ids, pool, &mut set);
    addition(&current_ids, pool, &mut set);
    synergy(current, pool, &mut set);
    meta(combat_style, pool, meta_builds, &mut set);

    set.combos
}

/// Substitute every pool relic not already present into each slot.
fn replacement(current_ids: &[RelicId], pool: &[Relic], set: &mut CandidateSet<'_>) {
    for slot in 0..current_ids.len() {
        for candidate in pool {
            if current_ids.contains(&candidate.id) {
                continue;
            }
            let mut ids = current_ids.to_vec();
            ids[slot] = candidate.id.clone();
            set.insert(ids);
        }
    }
}

/// Singleton adds while there is room; pairwise adds for small builds.
fn addition(current_ids: &[RelicId], pool: &[Relic], set: &mut CandidateSet<'_>) {
    if current_ids.len() >= MAX_RELIC_SELECTION {
        return;
    }
    let newcomers: Vec<&Relic> = pool
        .iter()
        .filter(|r| !current_ids.contains(&r.id))
        .collect();

    for candidate in &newcomers {
        let mut ids = current_ids.to_vec();
        ids.push(candidate.id.clone());
        set.insert(ids);
    }

    if current_ids.len() <= PAIRWISE_ADDITION_MAX_CURRENT {
        for (index, first) in newcomers.iter().enumerate() {
            for second in &newcomers[index + 1..] {
                let mut ids = current_ids.to_vec();
                ids.push(first.id.clone());
                ids.push(second.id.clone());
                set.insert(ids);
            }
        }
    }
}

/// Dominant synergy bucket of a relic: the group most of its active
/// effects contribute to. Ties resolve to the smaller enum variant.
pub(crate) fn dominant_group(relic: &Relic) -> Option<SynergyGroup> {
    let mut counts: BTreeMap<SynergyGroup, usize> = BTreeMap::new();
    for effect in relic.active_effects() {
        if let Some(group) = effect.effect_type.synergy_group() {
            *counts.entry(group).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(SynergyGroup, usize)>, (group, count)| {
            match best {
                Some((_, best_count)) if count <= best_count => best,
                _ => Some((group, count)),
            }
        })
        .map(|(group, _)| group)
}

/// Pair same-bucket candidates, padded with conflict-free current relics.
fn synergy(current: &[Relic], pool: &[Relic], set: &mut CandidateSet<'_>) {
    let mut buckets: BTreeMap<SynergyGroup, Vec<&Relic>> = BTreeMap::new();
    for relic in pool {
        if let Some(group) = dominant_group(relic) {
            buckets.entry(group).or_default().push(relic);
        }
    }

    for bucket in buckets.values().filter(|b| b.len() >= 2) {
        for (index, first) in bucket.iter().enumerate() {
            for second in &bucket[index + 1..] {
                let mut ids = vec![first.id.clone(), second.id.clone()];
                for keeper in current {
                    if ids.len() >= MAX_RELIC_SELECTION {
                        break;
                    }
                    if ids.contains(&keeper.id) {
                        continue;
                    }
                    let conflicted = [*first, *second].iter().any(|pick| {
                        pick.conflicts_with(&keeper.id) || keeper.conflicts_with(&pick.id)
                    });
                    if !conflicted {
                        ids.push(keeper.id.clone());
                    }
                }
                set.insert(ids);
            }
        }
    }
}

/// Configured per-style canonical lists, filtered by pool membership.
fn meta(
    combat_style: CombatStyle,
    pool: &[Relic],
    meta_builds: &BTreeMap<CombatStyle, Vec<Vec<RelicId>>>,
    set: &mut CandidateSet<'_>,
) {
    let Some(lists) = meta_builds.get(&combat_style) else {
        return;
    };
    let pool_ids: BTreeSet<&RelicId> = pool.iter().map(|r| &r.id).collect();
    for list in lists {
        let filtered: Vec<RelicId> = list
            .iter()
            .filter(|id| pool_ids.contains(id))
            .cloned()
            .collect();
        if !filtered.is_empty() {
            set.insert(filtered);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relic_core::{Effect, EffectType, Quality, Rarity, RelicCategory, StackingRule};

    fn relic(id: &str) -> Relic {
        Relic::new(
            id,
            format!("Relic {id}"),
            RelicCategory::Attack,
            Rarity::Common,
            Quality::Delicate,
            2,
        )
    }

    fn attack_relic(id: &str) -> Relic {
        relic(id).with_effect(Effect::new(
            format!("{id}_e").as_str(),
            "Edge",
            EffectType::AttackPercentage,
            10.0,
            StackingRule::Additive,
        ))
    }

    #[test]
    fn replacement_substitutes_each_slot() {
        let current = vec![relic("a"), relic("b")];
        let pool = vec![relic("c")];
        let combos = generate(&current, &pool, CombatStyle::Melee, &BTreeMap::new());
        // Replacements: {c,b} and {a,c}; additions: {a,b,c} (singleton) and
        // no pairwise partner available.
        assert!(combos.contains(&vec![RelicId::from("b"), RelicId::from("c")]));
        assert!(combos.contains(&vec![RelicId::from("a"), RelicId::from("c")]));
        assert!(combos.contains(&vec![
            RelicId::from("a"),
            RelicId::from("b"),
            RelicId::from("c")
        ]));
    }

    #[test]
    fn conflicting_combinations_are_pruned() {
        let current = vec![relic("a")];
        let pool = vec![relic("b").with_conflict("a")];
        let combos = generate(&current, &pool, CombatStyle::Melee, &BTreeMap::new());
        assert!(
            !combos
                .iter()
                .any(|c| c.contains(&RelicId::from("a")) && c.contains(&RelicId::from("b")))
        );
    }

    #[test]
    fn synergy_pairs_same_bucket_candidates() {
        let pool = vec![attack_relic("x"), attack_relic("y")];
        let combos = generate(&[], &pool, CombatStyle::Melee, &BTreeMap::new());
        assert!(combos.contains(&vec![RelicId::from("x"), RelicId::from("y")]));
    }

    #[test]
    fn meta_lists_are_filtered_by_pool_membership() {
        // A triple can only come from the meta strategy: addition and
        // synergy produce at most pairs when the current build is empty.
        let pool = vec![relic("a"), relic("b"), relic("c")];
        let meta = BTreeMap::from([(
            CombatStyle::Magic,
            vec![vec![
                RelicId::from("a"),
                RelicId::from("b"),
                RelicId::from("c"),
                RelicId::from("missing"),
            ]],
        )]);
        let triple = vec![RelicId::from("a"), RelicId::from("b"), RelicId::from("c")];

        let combos = generate(&[], &pool, CombatStyle::Magic, &meta);
        assert!(combos.contains(&triple));
        assert!(!combos.iter().any(|c| c.contains(&RelicId::from("missing"))));

        let other_style = generate(&[], &pool, CombatStyle::Ranged, &meta);
        assert!(!other_style.contains(&triple));
    }

    #[test]
    fn dominant_group_picks_majority() {
        let mixed = relic("m")
            .with_effect(Effect::new("e1", "Crit A", EffectType::CriticalChance, 5.0, StackingRule::Additive))
            .with_effect(Effect::new("e2", "Crit B", EffectType::CriticalMultiplier, 1.5, StackingRule::Multiplicative))
            .with_effect(Effect::new("e3", "Edge", EffectType::AttackFlat, 5.0, StackingRule::Additive));
        assert_eq!(dominant_group(&mixed), Some(SynergyGroup::CriticalFocus));
    }
}
