//! Stage 1: weighted multi-dimensional scoring.
//!
//! The backend scores eight dimensions; the decision itself is local and
//! deterministic ([`integrate_decision`]), so it is tested without a backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use heatrank_core::{ClassificationSource, DimensionId, DimensionScore, PcAvailability, Viewpoint};
use serde::Deserialize;

use crate::llm::{CompletionRequest, LlmBackend};
use crate::prompt::{weighted_prompt, WEIGHTED_SYSTEM};
use crate::stage::{ClassifierStage, ClassifyRequest, StageFailure, Verdict};

/// Confidence of a rejection caused by a failing core dimension.
const PLATFORM_FAILURE_CONFIDENCE: u8 = 90;
const MULTIPLAYER_FAILURE_CONFIDENCE: u8 = 85;
const SHOOTING_FAILURE_CONFIDENCE: u8 = 80;
const VETO_CONFIDENCE: u8 = 95;

/// Weight of each dimension in the weighted average.
#[must_use]
pub fn weight(dimension: DimensionId) -> f64 {
    match dimension {
        DimensionId::Shooting | DimensionId::Multiplayer | DimensionId::Platforms => 0.25,
        DimensionId::Combat | DimensionId::Weapons => 0.10,
        DimensionId::Competition => 0.05,
        DimensionId::Objectives | DimensionId::Community => 0.0,
    }
}

/// Parsed backend output: exactly one score per dimension plus the overall block.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedAnalysis {
    pub dimensions: Vec<DimensionScore>,
    pub primary_reason: Option<String>,
    pub suggested_sub_genre: Option<String>,
    pub viewpoint: Viewpoint,
    pub pc_availability: Option<PcAvailability>,
}

impl WeightedAnalysis {
    fn get(&self, dimension: DimensionId) -> Option<&DimensionScore> {
        self.dimensions.iter().find(|d| d.dimension == dimension)
    }

    fn score(&self, dimension: DimensionId) -> u8 {
        self.get(dimension).map_or(0, |d| d.score)
    }

    fn qualifies(&self, dimension: DimensionId) -> bool {
        self.get(dimension).is_some_and(|d| d.qualifies)
    }

    fn rationale_mentions(&self, dimension: DimensionId, needle: &str) -> bool {
        self.get(dimension)
            .is_some_and(|d| d.rationale.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    dimensions: HashMap<String, RawDimension>,
    #[serde(rename = "overallAnalysis", alias = "overall", default)]
    overall: Option<RawOverall>,
}

#[derive(Debug, Deserialize)]
struct RawDimension {
    score: f64,
    #[serde(alias = "rationale", default)]
    reason: String,
    #[serde(rename = "isShooterLike", alias = "qualifies")]
    qualifies: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOverall {
    #[serde(default)]
    primary_reason: Option<String>,
    #[serde(default)]
    sub_genre: Option<String>,
    #[serde(default)]
    perspective: Option<String>,
    #[serde(default)]
    pc_availability: Option<String>,
}

/// Parse the backend's JSON into a [`WeightedAnalysis`].
///
/// # Errors
///
/// [`StageFailure::Malformed`] for non-JSON, wrong shapes, or any of the eight
/// dimensions missing. Out-of-range scores are clamped, not rejected.
pub fn parse_analysis(content: &str) -> Result<WeightedAnalysis, StageFailure> {
    let raw: RawAnalysis = serde_json::from_str(content.trim())
        .map_err(|e| StageFailure::Malformed(format!("weighted analysis: {e}")))?;

    let mut dimensions = Vec::with_capacity(DimensionId::ALL.len());
    for id in DimensionId::ALL {
        let Some(d) = raw.dimensions.get(id.as_str()) else {
            return Err(StageFailure::Malformed(format!(
                "weighted analysis is missing dimension '{}'",
                id.as_str()
            )));
        };
        if !d.score.is_finite() {
            return Err(StageFailure::Malformed(format!(
                "dimension '{}' has a non-finite score",
                id.as_str()
            )));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let score = d.score.round().clamp(0.0, 100.0) as u8;
        dimensions.push(DimensionScore {
            dimension: id,
            score,
            qualifies: d.qualifies,
            rationale: d.reason.clone(),
        });
    }

    let overall = raw.overall.unwrap_or_default();
    let pc_availability = overall
        .pc_availability
        .as_deref()
        .and_then(|s| match s.trim().to_lowercase().as_str() {
            "available" => Some(PcAvailability::Available),
            "exclusive" => Some(PcAvailability::Exclusive),
            "unavailable" => Some(PcAvailability::Unavailable),
            _ => None,
        });

    Ok(WeightedAnalysis {
        dimensions,
        primary_reason: overall.primary_reason,
        suggested_sub_genre: overall
            .sub_genre
            .filter(|s| !s.trim().is_empty() && s.trim() != "null"),
        viewpoint: overall
            .perspective
            .as_deref()
            .map_or(Viewpoint::Unknown, Viewpoint::from_label),
        pc_availability,
    })
}

/// Turn a parsed analysis into a verdict.
///
/// All three core dimensions must qualify. Then the weighted average and
/// qualifying count select a confidence tier. A PC-availability verdict of
/// `exclusive` or `unavailable` vetoes at 95 regardless of the arithmetic.
#[must_use]
pub fn integrate_decision(analysis: &WeightedAnalysis) -> Verdict {
    let (weighted_sum, total_weight) = analysis
        .dimensions
        .iter()
        .fold((0.0, 0.0), |(sum, total), d| {
            let w = weight(d.dimension);
            (sum + f64::from(d.score) * w, total + w)
        });
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let weighted_avg = if total_weight > 0.0 {
        (weighted_sum / total_weight).round().clamp(0.0, 100.0) as u8
    } else {
        0
    };
    let qualifying_count = analysis.dimensions.iter().filter(|d| d.qualifies).count();

    let shooting = analysis.qualifies(DimensionId::Shooting);
    let multiplayer = analysis.qualifies(DimensionId::Multiplayer);
    let platforms = analysis.qualifies(DimensionId::Platforms);

    let (mut qualifies, mut confidence, mut reason) = if !platforms {
        (false, PLATFORM_FAILURE_CONFIDENCE, "not available on PC".to_owned())
    } else if !multiplayer {
        (
            false,
            MULTIPLAYER_FAILURE_CONFIDENCE,
            "not a multiplayer competitive game".to_owned(),
        )
    } else if !shooting {
        (
            false,
            SHOOTING_FAILURE_CONFIDENCE,
            "shooting is not the primary combat".to_owned(),
        )
    } else if weighted_avg >= 80 && qualifying_count >= 6 {
        (true, 95, String::new())
    } else if weighted_avg >= 70 && qualifying_count >= 5 {
        (true, 85, String::new())
    } else if weighted_avg >= 60 && qualifying_count >= 4 {
        (true, 75, String::new())
    } else if [DimensionId::Shooting, DimensionId::Multiplayer, DimensionId::Platforms]
        .iter()
        .all(|d| analysis.score(*d) >= 70)
    {
        (true, 65, String::new())
    } else {
        (
            false,
            60,
            format!(
                "weighted average {weighted_avg} with {qualifying_count} qualifying dimensions"
            ),
        )
    };

    if qualifies {
        reason = analysis
            .primary_reason
            .clone()
            .unwrap_or_else(|| format!("weighted average {weighted_avg}"));
    }

    if analysis.pc_availability.is_some_and(PcAvailability::is_veto) {
        qualifies = false;
        confidence = VETO_CONFIDENCE;
        reason = "PC availability veto".to_owned();
    }

    let sub_genre = qualifies.then(|| determine_sub_genre(analysis));

    let mut verdict = Verdict::new(ClassificationSource::WeightedAi, qualifies, confidence, reason)
        .with_sub_genre(sub_genre);
    verdict.viewpoint = analysis.viewpoint;
    verdict.pc_availability = analysis.pc_availability;
    verdict.dimensions.clone_from(&analysis.dimensions);
    verdict.weighted_avg = Some(weighted_avg);
    verdict.qualifying_count = Some(qualifying_count);
    verdict
}

/// Suggested sub-genre if present, else derived from viewpoint and rationales.
#[must_use]
pub fn determine_sub_genre(analysis: &WeightedAnalysis) -> String {
    if let Some(suggested) = &analysis.suggested_sub_genre {
        return suggested.clone();
    }
    let battle_royale = analysis.rationale_mentions(DimensionId::Objectives, "battle royale");
    match analysis.viewpoint {
        Viewpoint::FirstPerson => {
            if analysis.score(DimensionId::Competition) >= 80 {
                if analysis.rationale_mentions(DimensionId::Objectives, "tactical") {
                    "tactical-fps".to_owned()
                } else {
                    "competitive-fps".to_owned()
                }
            } else {
                "fps".to_owned()
            }
        }
        Viewpoint::ThirdPerson if battle_royale => "battle-royale-tps".to_owned(),
        Viewpoint::ThirdPerson => "tps".to_owned(),
        _ if battle_royale => "battle-royale".to_owned(),
        _ if analysis.rationale_mentions(DimensionId::Combat, "hero") => "hero-shooter".to_owned(),
        _ => "pc-shooter".to_owned(),
    }
}

pub struct WeightedScorer {
    backend: Arc<dyn LlmBackend>,
}

impl WeightedScorer {
    #[must_use]
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ClassifierStage for WeightedScorer {
    fn name(&self) -> &'static str {
        "weighted"
    }

    async fn classify(&self, request: &ClassifyRequest) -> Result<Verdict, StageFailure> {
        let completion = self
            .backend
            .complete(&CompletionRequest {
                system: Some(WEIGHTED_SYSTEM.to_owned()),
                prompt: weighted_prompt(request),
                max_tokens: 800,
                json_mode: true,
            })
            .await?;
        let analysis = parse_analysis(&completion)?;
        let verdict = integrate_decision(&analysis);
        tracing::debug!(
            title = %request.name,
            qualifies = verdict.qualifies,
            confidence = verdict.confidence,
            weighted_avg = ?verdict.weighted_avg,
            qualifying_count = ?verdict.qualifying_count,
            "weighted analysis integrated"
        );
        Ok(verdict)
    }
}

#[cfg(test)]
#[path = "weighted_test.rs"]
mod tests;
