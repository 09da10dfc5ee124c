//! Engine services: validation, cached composition, optimization,
//! analysis, and comparison.

pub mod analysis;
pub mod comparison;
pub mod composition;
pub mod optimization;
pub mod validation;

pub use analysis::{
    AnalysisReport, AnalysisService, DifficultyTier, PerformanceTier, Recommendation,
    RecommendationKind, SynergyGroupReport,
};
pub use comparison::{
    ComparedCombination, ComparisonRankings, ComparisonReport, ComparisonService,
    ComparisonSummary, ComparisonWinners,
};
pub use composition::{ComposeRequestOptions, CompositionOutcome, CompositionService};
pub use optimization::{
    OptimizationConstraints, OptimizationMetadata, OptimizationPreferences, OptimizationRequest,
    OptimizationResult, OptimizationService, SuggestedRelic, Suggestion,
};
pub use validation::{PreprocessBundle, SelectionSummary, SelectionWarning, ValidationService};
