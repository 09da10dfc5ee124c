//! Service layer around the relic composition engine.
//!
//! This crate wires the pure `relic-core` engine to its consumed
//! capabilities (relic repository, result cache, clock) and exposes the
//! engine surface HTTP handlers call into: validation, cached composition,
//! build optimization, analysis, and comparison.
//!
//! Modules are organized by responsibility:
//! - [`engine`] hosts the facade and builder consumers embed
//! - [`services`] implements the five engine operations
//! - [`repository`] and [`cache`] define the consumed capabilities with
//!   in-memory implementations
//! - [`deps`] threads repository/cache/clock explicitly (no globals)
//! - [`error`] carries the stable transport error codes

pub mod cache;
pub mod config;
pub mod deps;
pub mod engine;
pub mod error;
pub mod repository;
pub mod services;

pub use cache::{
    CacheEntry, CacheError, CacheKey, CacheStatistics, CompositionCache, InMemoryCompositionCache,
    TopEntry,
};
pub use config::{EngineConfig, OptimizerConfig};
pub use deps::{Clock, EngineDeps, ManualClock, SystemClock};
pub use engine::{RelicEngine, RelicEngineBuilder};
pub use error::{
    ComparisonError, ConflictPair, ContextIncompatibility, EngineError, ErrorBody, OptError,
    ValidationError,
};
pub use repository::{InMemoryRelicRepo, RelicFilter, RelicRepository, RepositoryError};
pub use services::{
    AnalysisReport, AnalysisService, ComparedCombination, ComparisonReport, ComparisonService,
    ComposeRequestOptions, CompositionOutcome, CompositionService, DifficultyTier,
    OptimizationConstraints, OptimizationMetadata, OptimizationPreferences, OptimizationRequest,
    OptimizationResult, OptimizationService, PerformanceTier, PreprocessBundle, Recommendation,
    RecommendationKind, SelectionSummary, SelectionWarning, SuggestedRelic, Suggestion,
    SynergyGroupReport, ValidationService,
};
