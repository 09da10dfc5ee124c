//! Selection validation and preprocessing.
//!
//! Validates a relic-id selection against the repository and the supplied
//! context, producing the canonical engine input (loaded relics in caller
//! order plus a normalized context) together with a preprocessing summary
//! and advisory warnings.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use relic_core::{
    CombatContext, Condition, MAX_RELIC_SELECTION, Quality, Rarity, Relic, RelicCategory, RelicId,
};

use crate::deps::EngineDeps;
use crate::error::{ConflictPair, ContextIncompatibility, EngineError, ValidationError};

/// Total-difficulty threshold for the `high_difficulty` warning.
pub const HIGH_DIFFICULTY_THRESHOLD: u32 = 40;
/// Legendary-count threshold for the `many_legendaries` warning.
pub const MANY_LEGENDARIES_THRESHOLD: usize = 3;
/// Number of condition-heavy effects that triggers `complex_conditions`.
pub const COMPLEX_CONDITIONS_THRESHOLD: usize = 5;
/// An effect counts as condition-heavy above this many conditions.
pub const COMPLEX_CONDITION_MIN: usize = 2;

/// Aggregate counts over the validated selection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SelectionSummary {
    pub category_counts: BTreeMap<RelicCategory, usize>,
    pub rarity_counts: BTreeMap<Rarity, usize>,
    pub quality_counts: BTreeMap<Quality, usize>,
    pub total_difficulty: u32,
    pub average_difficulty: f64,
    pub total_effects: usize,
    /// Whether any selected relic declares conflicts with anything.
    pub has_conflicts: bool,
}

/// Advisory findings that do not fail validation (outside strict mode).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionWarning {
    HighDifficulty { total: u32 },
    ManyLegendaries { count: usize },
    ComplexConditions { count: usize },
    CombatStyleMismatch(ContextIncompatibility),
    WeaponTypeMismatch(ContextIncompatibility),
}

impl std::fmt::Display for SelectionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HighDifficulty { total } => {
                write!(f, "selection is very hard to assemble (total difficulty {total})")
            }
            Self::ManyLegendaries { count } => {
                write!(f, "selection carries {count} legendary relics")
            }
            Self::ComplexConditions { count } => {
                write!(f, "{count} effects depend on more than {COMPLEX_CONDITION_MIN} conditions")
            }
            Self::CombatStyleMismatch(inc) => write!(
                f,
                "effect '{}' on {} expects combat style {} (context is {})",
                inc.effect_name, inc.relic_name, inc.expected, inc.actual
            ),
            Self::WeaponTypeMismatch(inc) => write!(
                f,
                "effect '{}' on {} expects weapon {} (context is {})",
                inc.effect_name, inc.relic_name, inc.expected, inc.actual
            ),
        }
    }
}

/// Canonical engine input produced by successful validation.
#[derive(Clone, Debug)]
pub struct PreprocessBundle {
    /// Loaded relics, in caller-provided order.
    pub relics: Vec<Relic>,
    /// Normalized, validated context.
    pub context: CombatContext,
    pub summary: SelectionSummary,
    pub warnings: Vec<SelectionWarning>,
}

/// Validation service over the repository capability.
#[derive(Clone)]
pub struct ValidationService {
    deps: EngineDeps,
}

impl ValidationService {
    pub fn new(deps: EngineDeps) -> Self {
        Self { deps }
    }

    /// Runs the full validation pipeline.
    ///
    /// Cheap structural checks (empty, oversize, duplicates, context) run
    /// before any repository access. In strict mode, context-compatibility
    /// findings and relic-level structural defects fail the request instead
    /// of becoming warnings.
    pub async fn validate(
        &self,
        relic_ids: &[RelicId],
        context: &CombatContext,
        strict: bool,
    ) -> Result<PreprocessBundle, EngineError> {
        if relic_ids.is_empty() {
            return Err(ValidationError::EmptyRelicList.into());
        }
        if relic_ids.len() > MAX_RELIC_SELECTION {
            return Err(ValidationError::RelicLimitExceeded {
                provided: relic_ids.len(),
                max: MAX_RELIC_SELECTION,
            }
            .into());
        }

        let duplicates = find_duplicates(relic_ids);
        if !duplicates.is_empty() {
            return Err(ValidationError::DuplicateRelics { duplicates }.into());
        }

        let context = context.normalized();
        context.validate().map_err(ValidationError::from)?;

        let relics = self.deps.repo.get_relics_by_ids(relic_ids).await?;
        if relics.len() != relic_ids.len() {
            let missing: Vec<RelicId> = relic_ids
                .iter()
                .filter(|id| !relics.iter().any(|r| r.id == **id))
                .cloned()
                .collect();
            return Err(ValidationError::RelicNotFound { missing }.into());
        }

        let inactive: Vec<RelicId> = relics
            .iter()
            .filter(|r| !r.active)
            .map(|r| r.id.clone())
            .collect();
        if !inactive.is_empty() {
            return Err(ValidationError::InactiveRelics { inactive }.into());
        }

        if strict {
            for relic in &relics {
                let issues = relic.structural_issues();
                if !issues.is_empty() {
                    return Err(ValidationError::InvalidRelicStructure {
                        relic_id: relic.id.clone(),
                        issues,
                    }
                    .into());
                }
            }
        }

        let conflicts = detect_conflicts(&relics);
        if !conflicts.is_empty() {
            return Err(ValidationError::ConflictingRelics { conflicts }.into());
        }

        for relic in &relics {
            for effect in &relic.effects {
                let issues = effect.structural_issues();
                if !issues.is_empty() {
                    return Err(ValidationError::InvalidEffectStructure {
                        relic_id: relic.id.clone(),
                        effect_id: effect.id.clone(),
                        issues,
                    }
                    .into());
                }
            }
        }

        let (style_mismatches, weapon_mismatches) = context_incompatibilities(&relics, &context);
        if strict {
            if !style_mismatches.is_empty() {
                return Err(ValidationError::CombatStyleIncompatible {
                    incompatibilities: style_mismatches,
                }
                .into());
            }
            if !weapon_mismatches.is_empty() {
                return Err(ValidationError::WeaponTypeIncompatible {
                    incompatibilities: weapon_mismatches,
                }
                .into());
            }
        }

        let summary = summarize(&relics);
        let mut warnings = threshold_warnings(&relics, &summary);
        warnings.extend(style_mismatches.into_iter().map(SelectionWarning::CombatStyleMismatch));
        warnings.extend(weapon_mismatches.into_iter().map(SelectionWarning::WeaponTypeMismatch));

        debug!(
            target: "engine::validation",
            relics = relics.len(),
            warnings = warnings.len(),
            strict,
            "selection validated"
        );

        Ok(PreprocessBundle {
            relics,
            context,
            summary,
            warnings,
        })
    }
}

fn find_duplicates(relic_ids: &[RelicId]) -> Vec<RelicId> {
    let mut duplicates = Vec::new();
    for (index, id) in relic_ids.iter().enumerate() {
        if relic_ids[..index].contains(id) && !duplicates.contains(id) {
            duplicates.push(id.clone());
        }
    }
    duplicates
}

/// Undirected conflict detection over the selection.
///
/// Catalog data stores conflicts one-sided; the engine unions both
/// directions. Each offending pair is reported once, keyed on the relic
/// that appears earlier in the input.
fn detect_conflicts(relics: &[Relic]) -> Vec<ConflictPair> {
    let mut pairs: Vec<ConflictPair> = Vec::new();
    for (index, relic) in relics.iter().enumerate() {
        let conflicting_ids: Vec<RelicId> = relics[index + 1..]
            .iter()
            .filter(|other| {
                relic.conflicts_with(&other.id) || other.conflicts_with(&relic.id)
            })
            .map(|other| other.id.clone())
            .collect();
        if !conflicting_ids.is_empty() {
            pairs.push(ConflictPair {
                relic_id: relic.id.clone(),
                conflicting_ids,
            });
        }
    }
    pairs
}

fn context_incompatibilities(
    relics: &[Relic],
    context: &CombatContext,
) -> (Vec<ContextIncompatibility>, Vec<ContextIncompatibility>) {
    let mut style = Vec::new();
    let mut weapon = Vec::new();
    for relic in relics {
        for effect in relic.active_effects() {
            for condition in &effect.conditions {
                match condition {
                    Condition::CombatStyle { value, .. } if *value != context.combat_style => {
                        style.push(ContextIncompatibility {
                            relic_id: relic.id.clone(),
                            relic_name: relic.name.clone(),
                            effect_name: effect.name.clone(),
                            expected: value.to_string(),
                            actual: context.combat_style.to_string(),
                        });
                    }
                    Condition::WeaponType { value, .. } => {
                        if let Some(weapon_type) = &context.weapon_type {
                            if weapon_type != value {
                                weapon.push(ContextIncompatibility {
                                    relic_id: relic.id.clone(),
                                    relic_name: relic.name.clone(),
                                    effect_name: effect.name.clone(),
                                    expected: value.clone(),
                                    actual: weapon_type.clone(),
                                });
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }
    (style, weapon)
}

fn summarize(relics: &[Relic]) -> SelectionSummary {
    let mut category_counts = BTreeMap::new();
    let mut rarity_counts = BTreeMap::new();
    let mut quality_counts = BTreeMap::new();
    let mut total_difficulty = 0u32;
    let mut total_effects = 0usize;
    let mut has_conflicts = false;

    for relic in relics {
        *category_counts.entry(relic.category).or_insert(0) += 1;
        *rarity_counts.entry(relic.rarity).or_insert(0) += 1;
        *quality_counts.entry(relic.quality).or_insert(0) += 1;
        total_difficulty += u32::from(relic.obtainment_difficulty);
        total_effects += relic.active_effects().count();
        has_conflicts |= !relic.conflicts.is_empty();
    }

    let average_difficulty = if relics.is_empty() {
        0.0
    } else {
        f64::from(total_difficulty) / relics.len() as f64
    };

    SelectionSummary {
        category_counts,
        rarity_counts,
        quality_counts,
        total_difficulty,
        average_difficulty,
        total_effects,
        has_conflicts,
    }
}

fn threshold_warnings(relics: &[Relic], summary: &SelectionSummary) -> Vec<SelectionWarning> {
    let mut warnings = Vec::new();
    if summary.total_difficulty > HIGH_DIFFICULTY_THRESHOLD {
        warnings.push(SelectionWarning::HighDifficulty {
            total: summary.total_difficulty,
        });
    }
    let legendary_count = summary.rarity_counts.get(&Rarity::Legendary).copied().unwrap_or(0);
    if legendary_count > MANY_LEGENDARIES_THRESHOLD {
        warnings.push(SelectionWarning::ManyLegendaries {
            count: legendary_count,
        });
    }
    let complex = relics
        .iter()
        .flat_map(Relic::active_effects)
        .filter(|e| e.conditions.len() > COMPLEX_CONDITION_MIN)
        .count();
    if complex > COMPLEX_CONDITIONS_THRESHOLD {
        warnings.push(SelectionWarning::ComplexConditions { count: complex });
    }
    warnings
}
