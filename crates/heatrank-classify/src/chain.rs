//! Ordered classification: registry, then each configured stage under its
//! own timeout, then the local keyword matcher.

use std::sync::Arc;
use std::time::{Duration, Instant};

use heatrank_core::{Candidate, ClassificationSource, Platform, TitleProfile};

use crate::keyword::KeywordMatcher;
use crate::platform::{guess_platforms, guess_primary};
use crate::registry::KnownTitleRegistry;
use crate::stage::{ClassifierStage, ClassifyRequest, StageFailure, Verdict};

/// What happened when one stage was tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageAttempt {
    pub stage: &'static str,
    pub elapsed_ms: u64,
    /// `None` when the stage produced the final verdict.
    pub failure: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub name: String,
    pub verdict: Verdict,
    /// Present only for qualifying titles.
    pub profile: Option<TitleProfile>,
    pub attempts: Vec<StageAttempt>,
}

impl ClassificationOutcome {
    #[must_use]
    pub fn qualifies(&self) -> bool {
        self.verdict.qualifies
    }
}

struct TimedStage {
    stage: Arc<dyn ClassifierStage>,
    timeout: Duration,
}

pub struct ClassificationChain {
    registry: KnownTitleRegistry,
    stages: Vec<TimedStage>,
    fallback: KeywordMatcher,
}

impl ClassificationChain {
    /// A chain with only the registry and the keyword fallback.
    #[must_use]
    pub fn new(registry: KnownTitleRegistry) -> Self {
        Self {
            registry,
            stages: Vec::new(),
            fallback: KeywordMatcher::new(),
        }
    }

    /// Append a stage, tried after every stage added before it.
    #[must_use]
    pub fn with_stage(mut self, stage: Arc<dyn ClassifierStage>, timeout: Duration) -> Self {
        self.stages.push(TimedStage { stage, timeout });
        self
    }

    #[must_use]
    pub fn registry(&self) -> &KnownTitleRegistry {
        &self.registry
    }

    /// Names of the configured stages, in order, excluding the fallback.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.stage.name()).collect()
    }

    /// Classify one candidate. Always yields a verdict: the keyword matcher
    /// cannot fail.
    pub async fn classify(&self, candidate: &Candidate) -> ClassificationOutcome {
        if let Some(profile) = self.registry.lookup(&candidate.name, candidate.viewer_count) {
            tracing::debug!(title = %candidate.name, "registry hit");
            let mut verdict = Verdict::new(
                ClassificationSource::Registry,
                true,
                profile.confidence,
                "curated registry entry",
            )
            .with_sub_genre(Some(profile.genre.clone()));
            verdict.viewpoint = profile.viewpoint;
            return ClassificationOutcome {
                name: candidate.name.clone(),
                verdict,
                profile: Some(profile),
                attempts: Vec::new(),
            };
        }

        let request = ClassifyRequest::from_candidate(candidate);
        let mut attempts = Vec::with_capacity(self.stages.len() + 1);

        for timed in &self.stages {
            let name = timed.stage.name();
            let started = Instant::now();
            let result = match tokio::time::timeout(timed.timeout, timed.stage.classify(&request))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(StageFailure::Timeout {
                    stage: name,
                    after_ms: duration_ms(timed.timeout),
                }),
            };
            let elapsed_ms = duration_ms(started.elapsed());
            match result {
                Ok(verdict) => {
                    attempts.push(StageAttempt {
                        stage: name,
                        elapsed_ms,
                        failure: None,
                    });
                    return finish(candidate, verdict, attempts);
                }
                Err(e) => {
                    tracing::warn!(
                        title = %candidate.name,
                        stage = name,
                        error = %e,
                        "classifier stage failed, trying next"
                    );
                    attempts.push(StageAttempt {
                        stage: name,
                        elapsed_ms,
                        failure: Some(e.to_string()),
                    });
                }
            }
        }

        let verdict = self.fallback.judge(&request);
        attempts.push(StageAttempt {
            stage: "keyword",
            elapsed_ms: 0,
            failure: None,
        });
        finish(candidate, verdict, attempts)
    }

    /// Classify candidates one at a time, sleeping `delay` between titles
    /// that needed the stages. Registry hits are never delayed.
    pub async fn classify_batch(
        &self,
        candidates: &[Candidate],
        delay: Duration,
    ) -> Vec<ClassificationOutcome> {
        let mut outcomes = Vec::with_capacity(candidates.len());
        let mut classified_unknown = false;
        for candidate in candidates {
            let known = self.registry.contains(&candidate.name);
            if !known && classified_unknown && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            outcomes.push(self.classify(candidate).await);
            classified_unknown |= !known;
        }
        outcomes
    }
}

fn finish(
    candidate: &Candidate,
    verdict: Verdict,
    attempts: Vec<StageAttempt>,
) -> ClassificationOutcome {
    tracing::info!(
        title = %candidate.name,
        source = %verdict.source,
        qualifies = verdict.qualifies,
        confidence = verdict.confidence,
        "title classified"
    );
    let profile = verdict.qualifies.then(|| profile_for(candidate, &verdict));
    ClassificationOutcome {
        name: candidate.name.clone(),
        verdict,
        profile,
        attempts,
    }
}

/// Profile for a classified (non-registry) title that qualified.
fn profile_for(candidate: &Candidate, verdict: &Verdict) -> TitleProfile {
    let mut platforms = guess_platforms(&candidate.name);
    // an accepted title is playable on PC; drop the console guess
    if platforms.remove(&Platform::Console).is_some() {
        platforms.insert(Platform::Steam, "unknown".to_owned());
    }
    let primary_platform = guess_primary(&platforms);
    TitleProfile {
        name: candidate.name.clone(),
        platforms,
        primary_platform,
        genre: verdict
            .sub_genre
            .clone()
            .unwrap_or_else(|| "pc-shooter".to_owned()),
        viewpoint: verdict.viewpoint,
        pc_available: true,
        confidence: verdict.confidence,
        source: verdict.source,
        viewer_count: candidate.viewer_count,
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
