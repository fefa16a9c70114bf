use std::sync::Arc;

use chrono::{DateTime, Utc};
use heatrank_classify::{
    AnthropicBackend, ClassificationChain, HeuristicScorer, KnownTitleRegistry, LlmBackend,
    OpenAiBackend, WeightedScorer,
};
use heatrank_core::{
    AppConfig, ClassificationSource, HeatSnapshot, HeuristicProvider, Platform, TitleProfile,
};
use heatrank_db::TrendStore;
use heatrank_discovery::{filter, CandidateSource, SourceConfig, SourceTier, SteamClient};
use heatrank_scoring::{
    composite_score, compute_heat_score, derive_region_scores, rank_descending, HeatStatus,
    MetricEstimator,
};
use serde::Serialize;

use crate::collector::{MetricCollector, PlayerCountSource};
use crate::config::CycleConfig;
use crate::error::PipelineError;
use crate::feed::CandidateFeed;

/// Everything one cycle needs. Built once per process and reused by every
/// scheduled run.
pub struct CycleContext {
    pub config: CycleConfig,
    pub feed: Arc<dyn CandidateFeed>,
    pub chain: ClassificationChain,
    pub collector: MetricCollector,
    pub store: Arc<dyn TrendStore>,
}

impl CycleContext {
    /// Wire the production adapters from `app`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if an HTTP client cannot be built.
    pub fn build(
        app: &AppConfig,
        registry: KnownTitleRegistry,
        store: Arc<dyn TrendStore>,
        estimator: Arc<dyn MetricEstimator>,
    ) -> Result<Self, PipelineError> {
        let config = CycleConfig::from_app_config(app);
        let feed = CandidateSource::new(&SourceConfig::from_app_config(app))?;
        let steam = SteamClient::new(
            app.request_timeout_secs,
            &app.user_agent,
            app.max_retries,
            app.retry_backoff_base_ms,
        )?;
        let chain = build_chain(app, &config, registry)?;
        Ok(Self {
            config,
            feed: Arc::new(feed),
            chain,
            collector: MetricCollector::new(
                Some(Arc::new(steam) as Arc<dyn PlayerCountSource>),
                estimator,
            ),
            store,
        })
    }
}

/// The classification chain selected by the stage toggles.
///
/// The weighted stage needs an OpenAI key and is skipped without one. The
/// heuristic stage stays in the chain even without a key so its absence
/// shows up in the attempt log.
///
/// # Errors
///
/// Returns [`heatrank_classify::LlmError`] if a backend client cannot be built.
pub fn build_chain(
    app: &AppConfig,
    config: &CycleConfig,
    registry: KnownTitleRegistry,
) -> Result<ClassificationChain, heatrank_classify::LlmError> {
    let mut chain = ClassificationChain::new(registry);

    if config.use_weighted {
        if let Some(key) = app.openai_api_key.as_deref() {
            let backend = OpenAiBackend::new(
                key,
                &app.weighted_model,
                app.weighted_timeout_secs,
                &app.user_agent,
            )?;
            chain = chain.with_stage(
                Arc::new(WeightedScorer::new(Arc::new(backend))),
                config.weighted_timeout,
            );
        } else {
            tracing::warn!("weighted classifier enabled but OPENAI_API_KEY is not set; skipping");
        }
    }

    if config.use_heuristic {
        let backend: Option<Arc<dyn LlmBackend>> = match app.heuristic_provider {
            HeuristicProvider::OpenAi => match app.openai_api_key.as_deref() {
                Some(key) => Some(Arc::new(OpenAiBackend::new(
                    key,
                    &app.heuristic_model,
                    app.heuristic_timeout_secs,
                    &app.user_agent,
                )?) as Arc<dyn LlmBackend>),
                None => None,
            },
            HeuristicProvider::Anthropic => match app.anthropic_api_key.as_deref() {
                Some(key) => Some(Arc::new(AnthropicBackend::new(
                    key,
                    &app.heuristic_model,
                    app.heuristic_timeout_secs,
                    &app.user_agent,
                )?) as Arc<dyn LlmBackend>),
                None => None,
            },
        };
        if backend.is_none() {
            tracing::warn!(
                provider = %app.heuristic_provider,
                "heuristic classifier enabled without an API key"
            );
        }
        chain = chain.with_stage(
            Arc::new(HeuristicScorer::new(backend)),
            config.heuristic_timeout,
        );
    }

    Ok(chain)
}

/// One line of the cycle's leaderboard.
#[derive(Debug, Clone, Serialize)]
pub struct RankedTitle {
    pub rank: usize,
    pub title: String,
    pub global_score: u8,
    pub local_market_score: u8,
    pub status: HeatStatus,
    pub estimated_players: u64,
    pub canonical_players: u64,
    pub spectators: u64,
    pub primary_platform: Platform,
    pub source: ClassificationSource,
    pub confidence: u8,
    pub composite_score: f64,
    pub persisted: bool,
}

/// A candidate the classifiers turned down.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub title: String,
    pub source: ClassificationSource,
    pub confidence: u8,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tier: SourceTier,
    pub discovered: usize,
    pub excluded: usize,
    pub classified: usize,
    pub qualified: usize,
    pub persisted: usize,
    pub persist_failures: usize,
    pub used_static_fallback: bool,
    pub rejections: Vec<Rejection>,
    pub ranking: Vec<RankedTitle>,
}

/// Curated profiles used when a cycle finds no qualifying title.
fn static_fallback_profiles(registry: &KnownTitleRegistry) -> Vec<TitleProfile> {
    registry
        .entries()
        .map(|entry| {
            let mut profile = entry.to_profile(0);
            profile.source = ClassificationSource::StaticFallback;
            profile
        })
        .collect()
}

/// Run one full collection cycle. Never fails: every degraded step falls
/// back and the report records what happened.
pub async fn run_collection_cycle(ctx: &CycleContext) -> CycleReport {
    let started_at = Utc::now();
    let config = &ctx.config;

    let batch = ctx.feed.fetch(config.discovery_count).await;
    let discovered = batch.candidates.len();
    let eligible = filter(batch.candidates);
    let excluded = discovered - eligible.len();
    tracing::info!(
        tier = batch.tier.as_str(),
        discovered,
        excluded,
        "candidates discovered"
    );

    let outcomes = ctx.chain.classify_batch(&eligible, config.classify_delay).await;
    let classified = outcomes.len();
    let mut rejections = Vec::new();
    let mut profiles = Vec::new();
    for outcome in outcomes {
        match outcome.profile {
            Some(profile) => profiles.push(profile),
            None => rejections.push(Rejection {
                title: outcome.name,
                source: outcome.verdict.source,
                confidence: outcome.verdict.confidence,
                reason: outcome.verdict.reason,
            }),
        }
    }
    let qualified = profiles.len();

    let used_static_fallback = profiles.is_empty();
    if used_static_fallback {
        tracing::warn!("no qualifying titles this cycle, using curated fallback list");
        profiles = static_fallback_profiles(ctx.chain.registry());
    }

    let mut ranking = Vec::with_capacity(profiles.len());
    let mut persisted = 0;
    let mut persist_failures = 0;

    for (i, profile) in profiles.iter().enumerate() {
        if i > 0 && !config.collect_delay.is_zero() {
            tokio::time::sleep(config.collect_delay).await;
        }

        let metrics = ctx.collector.collect(profile).await;
        let heat = compute_heat_score(profile, &metrics);
        let regions = derive_region_scores(
            &profile.name,
            metrics.spectators,
            &config.local_region,
            ctx.collector.estimator(),
        );

        let snapshot = HeatSnapshot {
            title: profile.name.clone(),
            captured_at: Utc::now(),
            global_score: heat.score,
            region_scores: regions.scores,
            top_regions: regions.top_regions,
            local_market_score: regions.local_market_score,
            reliability: heat.reliability,
            metrics,
            primary_platform: profile.primary_platform,
            source: profile.source,
            confidence: profile.confidence,
        };

        let stored = match ctx.store.append(&snapshot).await {
            Ok(()) => {
                persisted += 1;
                true
            }
            Err(e) => {
                tracing::warn!(
                    title = %profile.name,
                    error = %e,
                    "failed to persist heat snapshot"
                );
                persist_failures += 1;
                false
            }
        };

        tracing::info!(
            title = %profile.name,
            score = heat.score,
            local = snapshot.local_market_score,
            players = metrics.estimated_players,
            source = %profile.source,
            "title scored"
        );

        ranking.push(RankedTitle {
            rank: 0,
            title: profile.name.clone(),
            global_score: heat.score,
            local_market_score: snapshot.local_market_score,
            status: HeatStatus::from_score(f64::from(heat.score)),
            estimated_players: metrics.estimated_players,
            canonical_players: metrics.canonical_players,
            spectators: metrics.spectators,
            primary_platform: profile.primary_platform,
            source: profile.source,
            confidence: profile.confidence,
            composite_score: composite_score(
                metrics.estimated_players,
                profile.confidence,
                profile.pc_available,
            ),
            persisted: stored,
        });
    }

    rank_descending(&mut ranking, |r| r.composite_score);
    for (i, entry) in ranking.iter_mut().enumerate() {
        entry.rank = i + 1;
    }

    let report = CycleReport {
        started_at,
        finished_at: Utc::now(),
        tier: batch.tier,
        discovered,
        excluded,
        classified,
        qualified,
        persisted,
        persist_failures,
        used_static_fallback,
        rejections,
        ranking,
    };
    tracing::info!(
        qualified = report.qualified,
        persisted = report.persisted,
        persist_failures = report.persist_failures,
        fallback = report.used_static_fallback,
        "collection cycle finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_profiles_are_tagged() {
        let profiles = static_fallback_profiles(&KnownTitleRegistry::builtin());
        assert!(!profiles.is_empty());
        assert!(profiles
            .iter()
            .all(|p| p.source == ClassificationSource::StaticFallback && p.viewer_count == 0));
    }
}
