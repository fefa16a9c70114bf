//! The contract every classifier stage implements.

use std::collections::BTreeMap;

use async_trait::async_trait;
use heatrank_core::{
    Candidate, ClassificationSource, DimensionScore, PcAvailability, Platform, Viewpoint,
};
use thiserror::Error;

use crate::hints::{description_for, tags_for};
use crate::llm::LlmError;
use crate::platform::guess_platforms;

/// Everything a stage may look at when judging one title.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyRequest {
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub viewer_count: u64,
    pub declared_genre: Option<String>,
    pub platform_hints: BTreeMap<Platform, String>,
}

impl ClassifyRequest {
    /// Build a request from a raw candidate, filling gaps from the curated
    /// hints table and a name-based platform guess.
    #[must_use]
    pub fn from_candidate(candidate: &Candidate) -> Self {
        let description = candidate
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .or_else(|| description_for(&candidate.name).map(str::to_owned));
        let tags = if candidate.tags.is_empty() {
            tags_for(&candidate.name)
                .iter()
                .map(|t| (*t).to_owned())
                .collect()
        } else {
            candidate.tags.clone()
        };
        Self {
            name: candidate.name.clone(),
            description,
            tags,
            viewer_count: candidate.viewer_count,
            declared_genre: candidate.genre.clone(),
            platform_hints: guess_platforms(&candidate.name),
        }
    }

    /// Name, description and tags joined and lowercased, for local matching.
    #[must_use]
    pub fn searchable_text(&self) -> String {
        let mut text = self.name.to_lowercase();
        if let Some(d) = &self.description {
            text.push(' ');
            text.push_str(&d.to_lowercase());
        }
        for tag in &self.tags {
            text.push(' ');
            text.push_str(&tag.to_lowercase());
        }
        text
    }
}

/// A stage's definitive answer. A rejection is a verdict, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub qualifies: bool,
    pub confidence: u8,
    pub source: ClassificationSource,
    pub sub_genre: Option<String>,
    pub viewpoint: Viewpoint,
    pub pc_availability: Option<PcAvailability>,
    pub reason: String,
    /// Populated by the weighted scorer only.
    pub dimensions: Vec<DimensionScore>,
    pub weighted_avg: Option<u8>,
    pub qualifying_count: Option<usize>,
}

impl Verdict {
    #[must_use]
    pub fn new(
        source: ClassificationSource,
        qualifies: bool,
        confidence: u8,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            qualifies,
            confidence: confidence.min(100),
            source,
            sub_genre: None,
            viewpoint: Viewpoint::Unknown,
            pc_availability: None,
            reason: reason.into(),
            dimensions: Vec::new(),
            weighted_avg: None,
            qualifying_count: None,
        }
    }

    #[must_use]
    pub fn with_sub_genre(mut self, sub_genre: Option<String>) -> Self {
        self.sub_genre = sub_genre.filter(|s| !s.trim().is_empty());
        self
    }
}

/// Why a stage could not produce a verdict. Always triggers the next stage.
#[derive(Debug, Error)]
pub enum StageFailure {
    #[error("no backend configured for {0}")]
    NotConfigured(&'static str),

    #[error("{stage} timed out after {after_ms} ms")]
    Timeout { stage: &'static str, after_ms: u64 },

    #[error("backend error: {0}")]
    Backend(#[from] LlmError),

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait ClassifierStage: Send + Sync {
    /// Short stage label for logs.
    fn name(&self) -> &'static str;

    /// Judge one title.
    ///
    /// # Errors
    ///
    /// A [`StageFailure`] when no verdict could be reached; the chain moves on.
    async fn classify(&self, request: &ClassifyRequest) -> Result<Verdict, StageFailure>;
}
