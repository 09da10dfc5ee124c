//! The engine facade and its builder.
//!
//! [`RelicEngine`] bundles every service behind one handle. Construction
//! goes through [`RelicEngineBuilder`] so callers swap the repository,
//! cache, clock, composer, or configuration independently; everything
//! defaults to the in-memory stack.

use std::sync::Arc;

use relic_core::{Build, CombatContext, Composer, RelicId};

use crate::cache::{CacheStatistics, InMemoryCompositionCache};
use crate::config::EngineConfig;
use crate::deps::{Clock, EngineDeps, SystemClock};
use crate::error::EngineError;
use crate::repository::{InMemoryRelicRepo, RelicRepository};
use crate::services::{
    AnalysisReport, AnalysisService, ComparisonReport, ComparisonService, ComposeRequestOptions,
    CompositionOutcome, CompositionService, OptimizationRequest, OptimizationResult,
    OptimizationService, PreprocessBundle, ValidationService,
};

/// The provided engine surface: compose, validate, optimize, analyze,
/// compare, plus cache administration.
pub struct RelicEngine {
    deps: EngineDeps,
    config: EngineConfig,
    validation: ValidationService,
    composition: CompositionService,
    optimization: OptimizationService,
    analysis: AnalysisService,
    comparison: ComparisonService,
}

impl RelicEngine {
    pub fn builder() -> RelicEngineBuilder {
        RelicEngineBuilder::default()
    }

    /// Fully in-memory engine with default configuration.
    pub fn in_memory() -> Self {
        Self::builder().build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn deps(&self) -> &EngineDeps {
        &self.deps
    }

    /// Composes a relic selection, consulting the result cache.
    pub async fn compose(
        &self,
        relic_ids: &[RelicId],
        context: &CombatContext,
        options: ComposeRequestOptions,
    ) -> Result<CompositionOutcome, EngineError> {
        self.composition.compose(relic_ids, context, options).await
    }

    /// Composes a saved build: slot ordering becomes the relic order and
    /// per-slot condition overrides are folded into the context first.
    pub async fn compose_build(
        &self,
        build: &Build,
        context: &CombatContext,
        options: ComposeRequestOptions,
    ) -> Result<CompositionOutcome, EngineError> {
        let merged = build.merged_context(context);
        self.composition
            .compose(&build.relic_ids(), &merged, options)
            .await
    }

    /// Validates a selection without composing it.
    pub async fn validate(
        &self,
        relic_ids: &[RelicId],
        context: &CombatContext,
        strict: bool,
    ) -> Result<PreprocessBundle, EngineError> {
        self.validation.validate(relic_ids, context, strict).await
    }

    /// Suggests improved builds under the configured budget.
    pub async fn optimize(
        &self,
        request: OptimizationRequest,
    ) -> Result<OptimizationResult, EngineError> {
        self.optimization.optimize(request).await
    }

    /// Composes and derives synergies, ratings, and recommendations.
    pub async fn analyze(
        &self,
        relic_ids: &[RelicId],
        context: &CombatContext,
    ) -> Result<AnalysisReport, EngineError> {
        self.analysis.analyze(relic_ids, context).await
    }

    /// Ranks 2..=10 combinations against each other.
    pub async fn compare(
        &self,
        combinations: &[Vec<RelicId>],
        context: &CombatContext,
    ) -> Result<ComparisonReport, EngineError> {
        self.comparison.compare(combinations, context).await
    }

    pub async fn cache_statistics(&self) -> Result<CacheStatistics, EngineError> {
        Ok(self.deps.cache.statistics(self.config.cache_top_n).await?)
    }

    pub async fn clear_cache(&self) -> Result<usize, EngineError> {
        Ok(self.deps.cache.delete_all().await?)
    }

    pub async fn cleanup_expired_cache(&self) -> Result<usize, EngineError> {
        Ok(self.deps.cache.cleanup_expired().await?)
    }

    /// Trims the cache to the configured entry cap.
    pub async fn trim_cache(&self) -> Result<usize, EngineError> {
        Ok(self
            .deps
            .cache
            .trim_to_size(self.config.cache_max_entries)
            .await?)
    }
}

/// Builder wiring dependencies into a [`RelicEngine`].
#[derive(Default)]
pub struct RelicEngineBuilder {
    repo: Option<Arc<dyn RelicRepository>>,
    cache: Option<Arc<dyn crate::cache::CompositionCache>>,
    clock: Option<Arc<dyn Clock>>,
    composer: Option<Composer>,
    config: Option<EngineConfig>,
}

impl RelicEngineBuilder {
    pub fn with_repository(mut self, repo: Arc<dyn RelicRepository>) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn crate::cache::CompositionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Installs a composer with custom processors or routes.
    pub fn with_composer(mut self, composer: Composer) -> Self {
        self.composer = Some(composer);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> RelicEngine {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let repo = self
            .repo
            .unwrap_or_else(|| Arc::new(InMemoryRelicRepo::new()));
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(InMemoryCompositionCache::new(Arc::clone(&clock))));
        let config = self.config.unwrap_or_default();
        let composer = Arc::new(self.composer.unwrap_or_default());

        let deps = EngineDeps::new(repo, cache, clock);
        let composition =
            CompositionService::new(deps.clone(), Arc::clone(&composer), config.clone());

        RelicEngine {
            validation: ValidationService::new(deps.clone()),
            optimization: OptimizationService::new(
                deps.clone(),
                composition.clone(),
                config.clone(),
            ),
            analysis: AnalysisService::new(composition.clone()),
            comparison: ComparisonService::new(composition.clone()),
            composition,
            deps,
            config,
        }
    }
}
