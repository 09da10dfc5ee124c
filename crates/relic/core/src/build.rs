//! User-saved builds: named, ordered relic selections.
//!
//! A build references relics by id; relics know nothing about builds.
//! Slot positions stay dense (0..n-1) across every insert and remove, and
//! a relic appears at most once per build.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::MAX_RELIC_SELECTION;
use crate::condition::ConditionValue;
use crate::context::CombatContext;
use crate::relic::RelicId;

/// Errors raised by build mutation and construction.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("build already holds the maximum of {max} relics")]
    SelectionLimitExceeded { max: usize },

    #[error("build size {size} is invalid (expected 0..={max})")]
    InvalidSize { size: usize, max: usize },

    #[error("relic {relic_id} already present in build")]
    DuplicateRelic { relic_id: RelicId },

    #[error("no slot at position {position}")]
    NoSuchPosition { position: usize },

    #[error("slot positions are not dense 0..{expected}")]
    NonDensePositions { expected: usize },
}

impl BuildError {
    /// Stable identifier for transport-layer mapping.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::SelectionLimitExceeded { .. } => "SELECTION_LIMIT_EXCEEDED",
            Self::InvalidSize { .. } | Self::NonDensePositions { .. } => "INVALID_BUILD_SIZE",
            Self::DuplicateRelic { .. } => "DUPLICATE_RELICS",
            Self::NoSuchPosition { .. } => "INVALID_BUILD_SIZE",
        }
    }
}

/// One slot of a build: a relic plus optional per-slot context overrides.
///
/// Overrides feed the symbolic conditions map when the build is composed,
/// letting a saved build pin e.g. a chain position for one relic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildSlot {
    pub relic_id: RelicId,
    pub position: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub condition_overrides: BTreeMap<String, ConditionValue>,
}

/// A named, ordered list of at most [`MAX_RELIC_SELECTION`] relic ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub name: String,
    #[serde(default)]
    slots: Vec<BuildSlot>,
}

impl Build {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: Vec::new(),
        }
    }

    /// Reconstructs a build from stored slots, enforcing all invariants.
    pub fn from_slots(name: impl Into<String>, mut slots: Vec<BuildSlot>) -> Result<Self, BuildError> {
        if slots.len() > MAX_RELIC_SELECTION {
            return Err(BuildError::InvalidSize {
                size: slots.len(),
                max: MAX_RELIC_SELECTION,
            });
        }
        slots.sort_by_key(|slot| slot.position);
        for (index, slot) in slots.iter().enumerate() {
            if slot.position != index {
                return Err(BuildError::NonDensePositions {
                    expected: slots.len(),
                });
            }
        }
        for (index, slot) in slots.iter().enumerate() {
            if slots[..index].iter().any(|s| s.relic_id == slot.relic_id) {
                return Err(BuildError::DuplicateRelic {
                    relic_id: slot.relic_id.clone(),
                });
            }
        }
        Ok(Self {
            name: name.into(),
            slots,
        })
    }

    pub fn slots(&self) -> &[BuildSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Relic ids in slot order.
    pub fn relic_ids(&self) -> Vec<RelicId> {
        self.slots.iter().map(|slot| slot.relic_id.clone()).collect()
    }

    pub fn contains(&self, relic_id: &RelicId) -> bool {
        self.slots.iter().any(|slot| slot.relic_id == *relic_id)
    }

    /// Appends a relic at the next position.
    pub fn insert(
        &mut self,
        relic_id: RelicId,
        condition_overrides: BTreeMap<String, ConditionValue>,
    ) -> Result<(), BuildError> {
        self.insert_at(self.slots.len(), relic_id, condition_overrides)
    }

    /// Inserts a relic at `position`, shifting later slots right.
    pub fn insert_at(
        &mut self,
        position: usize,
        relic_id: RelicId,
        condition_overrides: BTreeMap<String, ConditionValue>,
    ) -> Result<(), BuildError> {
        if self.slots.len() >= MAX_RELIC_SELECTION {
            return Err(BuildError::SelectionLimitExceeded {
                max: MAX_RELIC_SELECTION,
            });
        }
        if self.contains(&relic_id) {
            return Err(BuildError::DuplicateRelic { relic_id });
        }
        if position > self.slots.len() {
            return Err(BuildError::NoSuchPosition { position });
        }
        self.slots.insert(
            position,
            BuildSlot {
                relic_id,
                position,
                condition_overrides,
            },
        );
        self.renumber();
        Ok(())
    }

    /// Removes the slot at `position`, shifting later slots left.
    pub fn remove_at(&mut self, position: usize) -> Result<BuildSlot, BuildError> {
        if position >= self.slots.len() {
            return Err(BuildError::NoSuchPosition { position });
        }
        let removed = self.slots.remove(position);
        self.renumber();
        Ok(removed)
    }

    /// Removes a relic by id.
    pub fn remove(&mut self, relic_id: &RelicId) -> Result<BuildSlot, BuildError> {
        let position = self
            .slots
            .iter()
            .position(|slot| slot.relic_id == *relic_id)
            .ok_or(BuildError::NoSuchPosition {
                position: self.slots.len(),
            })?;
        self.remove_at(position)
    }

    /// Moves the slot at `from` to `to`, preserving relative order of others.
    pub fn move_slot(&mut self, from: usize, to: usize) -> Result<(), BuildError> {
        if from >= self.slots.len() {
            return Err(BuildError::NoSuchPosition { position: from });
        }
        if to >= self.slots.len() {
            return Err(BuildError::NoSuchPosition { position: to });
        }
        let slot = self.slots.remove(from);
        self.slots.insert(to, slot);
        self.renumber();
        Ok(())
    }

    /// Folds every slot's condition overrides into `base`, in slot order.
    ///
    /// Later slots win on key collisions, matching the slot ordering the
    /// player sees.
    pub fn merged_context(&self, base: &CombatContext) -> CombatContext {
        let mut ctx = base.clone();
        for slot in &self.slots {
            for (key, value) in &slot.condition_overrides {
                ctx.conditions.insert(key.clone(), value.clone());
            }
        }
        ctx
    }

    fn renumber(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            slot.position = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(key: &str, value: f64) -> BTreeMap<String, ConditionValue> {
        let mut map = BTreeMap::new();
        map.insert(key.to_owned(), ConditionValue::Number(value));
        map
    }

    #[test]
    fn insert_keeps_positions_dense() {
        let mut build = Build::new("opener");
        build.insert(RelicId::from("a"), BTreeMap::new()).unwrap();
        build.insert(RelicId::from("b"), BTreeMap::new()).unwrap();
        build
            .insert_at(1, RelicId::from("c"), BTreeMap::new())
            .unwrap();

        let positions: Vec<usize> = build.slots().iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(
            build.relic_ids(),
            vec![RelicId::from("a"), RelicId::from("c"), RelicId::from("b")]
        );
    }

    #[test]
    fn remove_renumbers_remaining_slots() {
        let mut build = Build::new("opener");
        for id in ["a", "b", "c"] {
            build.insert(RelicId::from(id), BTreeMap::new()).unwrap();
        }
        build.remove(&RelicId::from("b")).unwrap();

        let positions: Vec<usize> = build.slots().iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 1]);
        assert!(!build.contains(&RelicId::from("b")));
    }

    #[test]
    fn duplicate_relic_is_rejected() {
        let mut build = Build::new("opener");
        build.insert(RelicId::from("a"), BTreeMap::new()).unwrap();
        let err = build.insert(RelicId::from("a"), BTreeMap::new()).unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_RELICS");
    }

    #[test]
    fn tenth_relic_is_rejected() {
        let mut build = Build::new("full");
        for i in 0..9 {
            build
                .insert(RelicId::from(format!("r{i}").as_str()), BTreeMap::new())
                .unwrap();
        }
        let err = build
            .insert(RelicId::from("r9"), BTreeMap::new())
            .unwrap_err();
        assert_eq!(err.error_code(), "SELECTION_LIMIT_EXCEEDED");
    }

    #[test]
    fn from_slots_rejects_gapped_positions() {
        let slots = vec![
            BuildSlot {
                relic_id: RelicId::from("a"),
                position: 0,
                condition_overrides: BTreeMap::new(),
            },
            BuildSlot {
                relic_id: RelicId::from("b"),
                position: 2,
                condition_overrides: BTreeMap::new(),
            },
        ];
        let err = Build::from_slots("gapped", slots).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_BUILD_SIZE");
    }

    #[test]
    fn merged_context_applies_overrides_in_slot_order() {
        let mut build = Build::new("override");
        build
            .insert(RelicId::from("a"), overrides("chain_position", 1.0))
            .unwrap();
        build
            .insert(RelicId::from("b"), overrides("chain_position", 3.0))
            .unwrap();

        let ctx = build.merged_context(&CombatContext::default());
        assert_eq!(ctx.condition_number("chain_position"), Some(3.0));
    }
}
