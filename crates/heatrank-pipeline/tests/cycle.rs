//! End-to-end collection cycles against wiremock feeds and the in-memory store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use heatrank_classify::{
    ClassificationChain, CompletionRequest, HeuristicScorer, KnownTitleRegistry, LlmBackend,
    LlmError, WeightedScorer,
};
use heatrank_core::{Candidate, ClassificationSource, HeatSnapshot};
use heatrank_db::{DbError, MemoryTrendStore, TitleAggregate, TrendRow, TrendStore};
use heatrank_discovery::{CandidateSource, SourceConfig, SourceTier, SteamClient};
use heatrank_pipeline::{
    run_collection_cycle, CandidateFeed, CycleConfig, CycleContext, FixedFeed, MetricCollector,
    PlayerCountSource,
};
use heatrank_scoring::{FixedEstimator, MetricEstimator};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Backend that counts calls and always answers "not a shooter".
#[derive(Default)]
struct CountingBackend {
    calls: AtomicUsize,
}

impl CountingBackend {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmBackend for CountingBackend {
    fn provider(&self) -> &'static str {
        "counting"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(r#"{"isQualifying": false, "confidence": 95, "reason": "not a shooter"}"#.to_owned())
    }
}

/// Store whose every call fails.
struct BrokenStore;

#[async_trait]
impl TrendStore for BrokenStore {
    async fn append(&self, _snapshot: &HeatSnapshot) -> Result<(), DbError> {
        Err(DbError::MissingDatabaseUrl)
    }

    async fn latest(&self, _title: &str) -> Result<Option<HeatSnapshot>, DbError> {
        Err(DbError::MissingDatabaseUrl)
    }

    async fn windowed(
        &self,
        _title: &str,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> Result<Vec<HeatSnapshot>, DbError> {
        Err(DbError::MissingDatabaseUrl)
    }

    async fn top_by_score(
        &self,
        _since: DateTime<Utc>,
        _limit: usize,
    ) -> Result<Vec<TitleAggregate>, DbError> {
        Err(DbError::MissingDatabaseUrl)
    }

    async fn local_ranking(
        &self,
        _since: DateTime<Utc>,
        _limit: usize,
    ) -> Result<Vec<TitleAggregate>, DbError> {
        Err(DbError::MissingDatabaseUrl)
    }

    async fn history(&self, _title: &str, _limit: usize) -> Result<Vec<HeatSnapshot>, DbError> {
        Err(DbError::MissingDatabaseUrl)
    }

    async fn trending(&self, _now: DateTime<Utc>, _limit: usize) -> Result<Vec<TrendRow>, DbError> {
        Err(DbError::MissingDatabaseUrl)
    }
}

fn chain_with(backend: &Arc<CountingBackend>) -> ClassificationChain {
    let dyn_backend = backend.clone() as Arc<dyn LlmBackend>;
    ClassificationChain::new(KnownTitleRegistry::builtin())
        .with_stage(
            Arc::new(WeightedScorer::new(dyn_backend.clone())),
            std::time::Duration::from_secs(5),
        )
        .with_stage(
            Arc::new(HeuristicScorer::new(Some(dyn_backend))),
            std::time::Duration::from_secs(5),
        )
}

fn context(
    feed: Arc<dyn CandidateFeed>,
    chain: ClassificationChain,
    steam: Option<Arc<dyn PlayerCountSource>>,
    store: Arc<dyn TrendStore>,
) -> CycleContext {
    CycleContext {
        config: CycleConfig::default().without_delays(),
        feed,
        chain,
        collector: MetricCollector::new(
            steam,
            Arc::new(FixedEstimator::midpoint()) as Arc<dyn MetricEstimator>,
        ),
        store,
    }
}

fn fixed_feed(names: &[(&str, u64)]) -> Arc<dyn CandidateFeed> {
    Arc::new(FixedFeed {
        tier: SourceTier::Primary,
        candidates: names
            .iter()
            .map(|(name, viewers)| Candidate::new(*name, *viewers))
            .collect(),
    })
}

#[tokio::test]
async fn known_title_from_secondary_feed_is_scored_without_classifiers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/helix/games/top"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/directory/game"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div data-a-target="browse-game-card"><h3>Counter-Strike 2</h3><p>45.2K viewers</p></div>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ISteamUserStats/GetNumberOfCurrentPlayers/v1/"))
        .and(query_param("appid", "730"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": { "player_count": 1_234_567, "result": 1 }
        })))
        .mount(&server)
        .await;

    let source = CandidateSource::new(&SourceConfig {
        helix_base_url: format!("{}/helix", server.uri()),
        directory_url: format!("{}/directory/game", server.uri()),
        twitch_client_id: Some("client-123".to_owned()),
        twitch_access_token: Some("token-abc".to_owned()),
        timeout_secs: 5,
        user_agent: "heatrank-test/0.1".to_owned(),
        max_retries: 0,
        backoff_base_ms: 0,
    })
    .expect("source builds");
    let steam = SteamClient::with_base_url(&server.uri(), 5, "heatrank-test/0.1", 0, 0)
        .expect("steam client builds");

    let backend = Arc::new(CountingBackend::default());
    let store = Arc::new(MemoryTrendStore::new());
    let ctx = context(
        Arc::new(source),
        chain_with(&backend),
        Some(Arc::new(steam) as Arc<dyn PlayerCountSource>),
        store.clone(),
    );

    let report = run_collection_cycle(&ctx).await;

    assert_eq!(report.tier, SourceTier::Secondary);
    assert_eq!(report.qualified, 1);
    assert!(!report.used_static_fallback);
    assert_eq!(backend.calls(), 0);

    let top = &report.ranking[0];
    assert_eq!(top.title, "Counter-Strike 2");
    assert_eq!(top.source, ClassificationSource::Registry);
    assert_eq!(top.confidence, 100);
    assert_eq!(top.canonical_players, 1_234_567);
    assert_eq!(top.estimated_players, 1_234_567);
    assert_eq!(top.spectators, 45_200);
    assert!(top.global_score <= 100);

    let stored = store
        .latest("Counter-Strike 2")
        .await
        .expect("memory store")
        .expect("snapshot persisted");
    assert_eq!(stored.global_score, top.global_score);
    assert_eq!(stored.source, ClassificationSource::Registry);
    assert!(stored.reliability > 0.8);
}

#[tokio::test]
async fn console_exclusive_never_reaches_classifiers() {
    let backend = Arc::new(CountingBackend::default());
    let store = Arc::new(MemoryTrendStore::new());
    let ctx = context(
        fixed_feed(&[("Splatoon 3", 20_000), ("Counter-Strike 2", 80_000)]),
        chain_with(&backend),
        None,
        store.clone(),
    );

    let report = run_collection_cycle(&ctx).await;

    assert_eq!(report.discovered, 2);
    assert_eq!(report.excluded, 1);
    assert_eq!(report.classified, 1);
    assert_eq!(backend.calls(), 0);
    assert!(report.ranking.iter().all(|r| r.title != "Splatoon 3"));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn empty_qualifying_set_uses_curated_fallback() {
    let store = Arc::new(MemoryTrendStore::new());
    let ctx = context(
        fixed_feed(&[("Just Chatting", 300_000)]),
        ClassificationChain::new(KnownTitleRegistry::builtin()),
        None,
        store.clone(),
    );

    let report = run_collection_cycle(&ctx).await;

    assert_eq!(report.qualified, 0);
    assert!(report.used_static_fallback);
    assert_eq!(report.rejections.len(), 1);
    assert_eq!(report.rejections[0].title, "Just Chatting");
    assert_eq!(report.rejections[0].source, ClassificationSource::Keyword);

    let registry_size = KnownTitleRegistry::builtin().len();
    assert_eq!(report.ranking.len(), registry_size);
    assert_eq!(report.persisted, registry_size);
    assert!(report
        .ranking
        .iter()
        .all(|r| r.source == ClassificationSource::StaticFallback));
}

#[tokio::test]
async fn ranking_is_ordered_by_composite_score() {
    let ctx = context(
        fixed_feed(&[]),
        ClassificationChain::new(KnownTitleRegistry::builtin()),
        None,
        Arc::new(MemoryTrendStore::new()),
    );

    let report = run_collection_cycle(&ctx).await;

    for (i, pair) in report.ranking.windows(2).enumerate() {
        assert!(pair[0].composite_score >= pair[1].composite_score);
        assert_eq!(pair[0].rank, i + 1);
    }
}

#[tokio::test]
async fn persistence_failures_are_counted_not_fatal() {
    let ctx = context(
        fixed_feed(&[("Counter-Strike 2", 80_000), ("VALORANT", 70_000)]),
        ClassificationChain::new(KnownTitleRegistry::builtin()),
        None,
        Arc::new(BrokenStore),
    );

    let report = run_collection_cycle(&ctx).await;

    assert_eq!(report.qualified, 2);
    assert_eq!(report.persisted, 0);
    assert_eq!(report.persist_failures, 2);
    assert_eq!(report.ranking.len(), 2);
    assert!(report.ranking.iter().all(|r| !r.persisted));
}

#[tokio::test]
async fn steam_outage_measures_zero_players() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let steam = SteamClient::with_base_url(&server.uri(), 5, "heatrank-test/0.1", 0, 0)
        .expect("steam client builds");
    let collector = MetricCollector::new(
        Some(Arc::new(steam) as Arc<dyn PlayerCountSource>),
        Arc::new(FixedEstimator::midpoint()) as Arc<dyn MetricEstimator>,
    );

    let profile = KnownTitleRegistry::builtin()
        .lookup("Counter-Strike 2", 10_000)
        .expect("registry entry");
    let metrics = collector.collect(&profile).await;

    assert_eq!(metrics.canonical_players, 0);
    assert_eq!(metrics.estimated_players, 0);
    assert_eq!(metrics.spectators, 10_000);
}
