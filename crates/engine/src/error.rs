//! Service-layer errors with stable transport codes.
//!
//! Every error exposes `error_code()` (a stable SCREAMING_SNAKE identifier
//! the transport layer maps to HTTP) and `details()` (structured context a
//! caller can use to fix the request). Repository and cache failures
//! surface as `INTERNAL` and never partially populate a result.

use serde::Serialize;
use serde_json::{Value, json};

use relic_core::{CalcError, ContextError, EffectId, RelicId};

use crate::cache::CacheError;
use crate::repository::RepositoryError;

/// One side of a detected conflict: a relic and the input relics it
/// cannot coexist with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConflictPair {
    pub relic_id: RelicId,
    pub conflicting_ids: Vec<RelicId>,
}

/// A context-compatibility finding: an effect conditioned on a combat style
/// or weapon type that differs from the supplied context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContextIncompatibility {
    pub relic_id: RelicId,
    pub relic_name: String,
    pub effect_name: String,
    pub expected: String,
    pub actual: String,
}

/// Input and business-logic errors raised while validating a selection.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("relic selection is empty")]
    EmptyRelicList,

    #[error("selection of {provided} relics exceeds the limit of {max}")]
    RelicLimitExceeded { provided: usize, max: usize },

    #[error("selection contains duplicate relic ids")]
    DuplicateRelics { duplicates: Vec<RelicId> },

    #[error("{} relic(s) not found", .missing.len())]
    RelicNotFound { missing: Vec<RelicId> },

    #[error("{} relic(s) are inactive", .inactive.len())]
    InactiveRelics { inactive: Vec<RelicId> },

    #[error("relic {relic_id} failed structural validation")]
    InvalidRelicStructure {
        relic_id: RelicId,
        issues: Vec<String>,
    },

    #[error("effect {effect_id} on relic {relic_id} failed structural validation")]
    InvalidEffectStructure {
        relic_id: RelicId,
        effect_id: EffectId,
        issues: Vec<String>,
    },

    #[error("selection contains conflicting relics")]
    ConflictingRelics { conflicts: Vec<ConflictPair> },

    #[error("selection is incompatible with the requested combat style")]
    CombatStyleIncompatible {
        incompatibilities: Vec<ContextIncompatibility>,
    },

    #[error("selection is incompatible with the requested weapon type")]
    WeaponTypeIncompatible {
        incompatibilities: Vec<ContextIncompatibility>,
    },

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl ValidationError {
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyRelicList => "EMPTY_RELIC_LIST",
            Self::RelicLimitExceeded { .. } => "RELIC_LIMIT_EXCEEDED",
            Self::DuplicateRelics { .. } => "DUPLICATE_RELICS",
            Self::RelicNotFound { .. } => "RELIC_NOT_FOUND",
            Self::InactiveRelics { .. } => "INACTIVE_RELICS",
            Self::InvalidRelicStructure { .. } => "INVALID_RELIC_STRUCTURE",
            Self::InvalidEffectStructure { .. } => "INVALID_EFFECT_STRUCTURE",
            Self::ConflictingRelics { .. } => "CONFLICTING_RELICS",
            Self::CombatStyleIncompatible { .. } => "COMBAT_STYLE_INCOMPATIBLE",
            Self::WeaponTypeIncompatible { .. } => "WEAPON_TYPE_INCOMPATIBLE",
            Self::Context(inner) => inner.error_code(),
        }
    }

    /// Structured payload for the transport layer's `details` field.
    pub fn details(&self) -> Value {
        match self {
            Self::EmptyRelicList => Value::Null,
            Self::RelicLimitExceeded { provided, max } => {
                json!({ "provided": provided, "max": max })
            }
            Self::DuplicateRelics { duplicates } => json!({ "duplicates": duplicates }),
            Self::RelicNotFound { missing } => json!({ "missing": missing }),
            Self::InactiveRelics { inactive } => json!({ "inactive": inactive }),
            Self::InvalidRelicStructure { relic_id, issues } => {
                json!({ "relic_id": relic_id, "issues": issues })
            }
            Self::InvalidEffectStructure {
                relic_id,
                effect_id,
                issues,
            } => json!({ "relic_id": relic_id, "effect_id": effect_id, "issues": issues }),
            Self::ConflictingRelics { conflicts } => json!({ "conflicts": conflicts }),
            Self::CombatStyleIncompatible { incompatibilities }
            | Self::WeaponTypeIncompatible { incompatibilities } => {
                json!({ "incompatibilities": incompatibilities })
            }
            Self::Context(inner) => json!({ "reason": inner.to_string() }),
        }
    }
}

/// Errors raised by build optimization.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum OptError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("optimization exceeded its deadline after {elapsed_ms} ms ({evaluated} candidates evaluated)")]
    Timeout { elapsed_ms: u64, evaluated: usize },
}

impl OptError {
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(inner) => inner.error_code(),
            Self::Timeout { .. } => "OPTIMIZATION_TIMEOUT",
        }
    }
}

/// Errors raised by multi-build comparison.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ComparisonError {
    #[error("comparison requires {min}..={max} combinations, got {provided}")]
    CombinationCount {
        provided: usize,
        min: usize,
        max: usize,
    },

    #[error("only {evaluable} combination(s) could be evaluated; at least 2 required")]
    TooFewEvaluable { evaluable: usize },
}

impl ComparisonError {
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::CombinationCount { .. } | Self::TooFewEvaluable { .. } => {
                "SELECTION_LIMIT_EXCEEDED"
            }
        }
    }
}

/// Top-level engine error: everything a facade entry point can return.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error(transparent)]
    Optimization(#[from] OptError),

    #[error(transparent)]
    Comparison(#[from] ComparisonError),

    #[error("repository failure: {0}")]
    Repository(#[from] RepositoryError),

    #[error("cache failure: {0}")]
    Cache(#[from] CacheError),
}

impl EngineError {
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(inner) => inner.error_code(),
            Self::Calc(inner) => inner.error_code(),
            Self::Optimization(inner) => inner.error_code(),
            Self::Comparison(inner) => inner.error_code(),
            Self::Repository(_) | Self::Cache(_) => "INTERNAL",
        }
    }

    pub fn details(&self) -> Value {
        match self {
            Self::Validation(inner) => inner.details(),
            Self::Optimization(OptError::Validation(inner)) => inner.details(),
            _ => Value::Null,
        }
    }
}

/// Wire shape for error responses: `{code, message, details}`.
#[derive(Clone, Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

impl From<&EngineError> for ErrorBody {
    fn from(error: &EngineError) -> Self {
        Self {
            code: error.error_code(),
            message: error.to_string(),
            details: error.details(),
        }
    }
}
