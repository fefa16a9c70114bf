use async_trait::async_trait;
use heatrank_core::Candidate;
use heatrank_discovery::{CandidateBatch, CandidateSource, SourceTier};

/// Anything that can hand a cycle its candidates.
#[async_trait]
pub trait CandidateFeed: Send + Sync {
    async fn fetch(&self, count: usize) -> CandidateBatch;
}

#[async_trait]
impl CandidateFeed for CandidateSource {
    async fn fetch(&self, count: usize) -> CandidateBatch {
        self.fetch_candidates(count).await
    }
}

/// A pre-built candidate list, served as-is under the given tier.
#[derive(Debug, Clone)]
pub struct FixedFeed {
    pub tier: SourceTier,
    pub candidates: Vec<Candidate>,
}

#[async_trait]
impl CandidateFeed for FixedFeed {
    async fn fetch(&self, count: usize) -> CandidateBatch {
        CandidateBatch {
            tier: self.tier,
            candidates: self.candidates.iter().take(count).cloned().collect(),
        }
    }
}
