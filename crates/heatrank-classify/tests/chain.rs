use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use heatrank_classify::{
    ClassificationChain, ClassifierStage, ClassifyRequest, CompletionRequest, HeuristicScorer,
    KnownTitleRegistry, LlmBackend, LlmError, StageFailure, Verdict, WeightedScorer,
};
use heatrank_core::{Candidate, ClassificationSource, Platform};

/// Backend that answers with a fixed string after an optional delay.
struct ScriptedBackend {
    reply: String,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new(reply: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_owned(),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    fn provider(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.reply.clone())
    }
}

struct FailingStage;

#[async_trait]
impl ClassifierStage for FailingStage {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn classify(&self, _request: &ClassifyRequest) -> Result<Verdict, StageFailure> {
        Err(StageFailure::Malformed("garbage".to_owned()))
    }
}

#[tokio::test]
async fn registry_hit_never_calls_a_backend() {
    let backend = ScriptedBackend::new("{}", Duration::ZERO);
    let chain = ClassificationChain::new(KnownTitleRegistry::builtin())
        .with_stage(
            Arc::new(WeightedScorer::new(backend.clone())),
            Duration::from_secs(1),
        )
        .with_stage(
            Arc::new(HeuristicScorer::new(Some(backend.clone() as Arc<dyn LlmBackend>))),
            Duration::from_secs(1),
        );

    let outcome = chain
        .classify(&Candidate::new("Counter-Strike 2", 85_000))
        .await;

    assert_eq!(backend.calls(), 0);
    assert!(outcome.attempts.is_empty());
    let profile = outcome.profile.expect("registry profile");
    assert_eq!(profile.source, ClassificationSource::Registry);
    assert_eq!(profile.confidence, 100);
    assert_eq!(profile.steam_app_id(), Some("730"));
}

#[tokio::test]
async fn weighted_timeout_falls_through_to_heuristic() {
    let slow = ScriptedBackend::new("{}", Duration::from_secs(10));
    let quick = ScriptedBackend::new(
        r#"{"isQualifying": true, "confidence": 70, "reason": "arena shooter"}"#,
        Duration::ZERO,
    );
    let chain = ClassificationChain::new(KnownTitleRegistry::builtin())
        .with_stage(
            Arc::new(WeightedScorer::new(slow.clone())),
            Duration::from_millis(20),
        )
        .with_stage(
            Arc::new(HeuristicScorer::new(Some(quick.clone() as Arc<dyn LlmBackend>))),
            Duration::from_secs(1),
        );

    let outcome = chain.classify(&Candidate::new("XDefiant", 25_000)).await;

    assert_eq!(slow.calls(), 1);
    assert_eq!(quick.calls(), 1);
    assert_eq!(outcome.attempts.len(), 2);
    assert_eq!(outcome.attempts[0].stage, "weighted");
    assert!(outcome.attempts[0]
        .failure
        .as_deref()
        .unwrap()
        .contains("timed out"));
    assert_eq!(outcome.attempts[1].failure, None);

    let profile = outcome.profile.expect("qualifying profile");
    assert_eq!(profile.source, ClassificationSource::Heuristic);
    assert_eq!(profile.confidence, 70);
    assert_eq!(profile.primary_platform, Platform::Steam);
    assert_eq!(profile.viewer_count, 25_000);
    assert!(profile.pc_available);
}

#[tokio::test]
async fn failures_fall_through_to_keyword_matcher() {
    let chain = ClassificationChain::new(KnownTitleRegistry::builtin())
        .with_stage(Arc::new(FailingStage), Duration::from_secs(1))
        .with_stage(Arc::new(HeuristicScorer::new(None)), Duration::from_secs(1));

    let outcome = chain.classify(&Candidate::new("Quake Champions", 9_000)).await;

    let stages: Vec<_> = outcome.attempts.iter().map(|a| a.stage).collect();
    assert_eq!(stages, vec!["failing", "heuristic", "keyword"]);
    assert_eq!(outcome.verdict.source, ClassificationSource::Keyword);
    assert_eq!(outcome.verdict.confidence, 60);
    assert!(outcome.qualifies());
}

#[tokio::test]
async fn weighted_rejection_is_final() {
    let reply = serde_json::json!({
        "dimensions": {
            "shooting": {"score": 10, "reason": "no guns", "isShooterLike": false},
            "combat": {"score": 10, "reason": "", "isShooterLike": false},
            "multiplayer": {"score": 90, "reason": "", "isShooterLike": true},
            "objectives": {"score": 10, "reason": "", "isShooterLike": false},
            "weapons": {"score": 10, "reason": "", "isShooterLike": false},
            "competition": {"score": 50, "reason": "", "isShooterLike": false},
            "platforms": {"score": 90, "reason": "", "isShooterLike": true},
            "community": {"score": 40, "reason": "", "isShooterLike": false}
        },
        "overallAnalysis": {"primaryReason": "farming sim", "pcAvailability": "available"}
    })
    .to_string();
    let weighted = ScriptedBackend::new(&reply, Duration::ZERO);
    let heuristic = ScriptedBackend::new(r#"{"isQualifying": true}"#, Duration::ZERO);
    let chain = ClassificationChain::new(KnownTitleRegistry::builtin())
        .with_stage(
            Arc::new(WeightedScorer::new(weighted.clone())),
            Duration::from_secs(1),
        )
        .with_stage(
            Arc::new(HeuristicScorer::new(Some(heuristic.clone() as Arc<dyn LlmBackend>))),
            Duration::from_secs(1),
        );

    let outcome = chain
        .classify(&Candidate::new("Counter Farm Simulator", 3_000))
        .await;

    assert!(!outcome.qualifies());
    assert!(outcome.profile.is_none());
    assert_eq!(outcome.verdict.source, ClassificationSource::WeightedAi);
    assert_eq!(heuristic.calls(), 0);
}

#[tokio::test]
async fn batch_preserves_order() {
    let chain = ClassificationChain::new(KnownTitleRegistry::builtin());
    let candidates = vec![
        Candidate::new("VALORANT", 75_000),
        Candidate::new("Stardew Valley", 4_000),
        Candidate::new("The Finals", 35_000),
    ];
    let outcomes = chain
        .classify_batch(&candidates, Duration::from_millis(1))
        .await;
    let names: Vec<_> = outcomes.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["VALORANT", "Stardew Valley", "The Finals"]);
    assert!(outcomes[0].qualifies());
    assert!(!outcomes[1].qualifies());
    assert!(outcomes[2].qualifies());
}
