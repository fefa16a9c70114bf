//! Stage 2: one flat judgment from a simpler backend.

use std::sync::Arc;

use async_trait::async_trait;
use heatrank_core::{ClassificationSource, PcAvailability};
use regex::Regex;
use serde::Deserialize;

use crate::llm::{CompletionRequest, LlmBackend};
use crate::platform::check_pc_availability;
use crate::prompt::{heuristic_prompt, HEURISTIC_SYSTEM};
use crate::stage::{ClassifierStage, ClassifyRequest, StageFailure, Verdict};

const DEFAULT_JSON_CONFIDENCE: u8 = 85;
const TEXT_SCAN_CONFIDENCE: u8 = 70;
/// Rejection confidence when the backend accepts a title the local check rules off PC.
const PLATFORM_GATE_CONFIDENCE: u8 = 90;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawJudgment {
    #[serde(alias = "isFPS", alias = "isShooter")]
    is_qualifying: bool,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    sub_genre: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// A backend judgment before the platform gate.
#[derive(Debug, Clone, PartialEq)]
pub struct Judgment {
    pub qualifies: bool,
    pub confidence: u8,
    pub sub_genre: Option<String>,
    pub reason: String,
}

/// Extract a judgment from completion text.
///
/// The first `{...}` span is parsed as JSON (confidence defaults to 85).
/// Without a usable span, a text scan for affirmative or negative language
/// yields a judgment at 70. Negative language must name the genre, so an
/// aside such as "not a MOBA" does not flip an accept.
///
/// # Errors
///
/// [`StageFailure::Malformed`] when neither the JSON span nor the text scan
/// produces a verdict.
pub fn parse_judgment(content: &str) -> Result<Judgment, StageFailure> {
    let json_span = Regex::new(r"(?s)\{.*\}").expect("valid json span regex");
    let json_error = match json_span.find(content) {
        Some(span) => match serde_json::from_str::<RawJudgment>(span.as_str()) {
            Ok(raw) => return Ok(from_raw(raw)),
            Err(e) => Some(e),
        },
        None => None,
    };

    match scan_verdict(content) {
        Some(qualifies) => Ok(Judgment {
            qualifies,
            confidence: TEXT_SCAN_CONFIDENCE,
            sub_genre: None,
            reason: "text scan".to_owned(),
        }),
        None => Err(StageFailure::Malformed(match json_error {
            Some(e) => format!("heuristic judgment: {e}"),
            None => "heuristic response has neither JSON nor a recognisable verdict".to_owned(),
        })),
    }
}

fn from_raw(raw: RawJudgment) -> Judgment {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let confidence = raw
        .confidence
        .filter(|c| c.is_finite() && *c > 0.0)
        .map_or(DEFAULT_JSON_CONFIDENCE, |c| c.round().clamp(0.0, 100.0) as u8);
    Judgment {
        qualifies: raw.is_qualifying,
        confidence,
        sub_genre: raw.sub_genre.filter(|s| !s.trim().is_empty()),
        reason: raw.reason.unwrap_or_else(|| "no reason given".to_owned()),
    }
}

/// `Some(false)` for a negative verdict, `Some(true)` for an affirmative one.
fn scan_verdict(content: &str) -> Option<bool> {
    let negative = Regex::new(
        r"(?i)^\s*no\b|\b(is not|isn't|not) (an? )?([\w-]+ )?(fps|shooter|first[- ]person shooter)\b|\b(does not|doesn't) qualify\b|不是|非fps|不屬於",
    )
    .expect("valid negative regex");
    let affirmative = Regex::new(
        r"(?i)\b(yes|qualifies|is an? ([\w-]+ )?(fps|shooter|first[- ]person shooter))\b|第一人稱射擊",
    )
    .expect("valid affirmative regex");

    if negative.is_match(content) {
        Some(false)
    } else if affirmative.is_match(content) {
        Some(true)
    } else {
        None
    }
}

/// Apply the local platform gate: a backend accept only stands if the title
/// passes [`check_pc_availability`].
#[must_use]
pub fn gate(name: &str, judgment: Judgment) -> Verdict {
    if judgment.qualifies && !check_pc_availability(name) {
        let mut verdict = Verdict::new(
            ClassificationSource::Heuristic,
            false,
            PLATFORM_GATE_CONFIDENCE,
            "accepted by backend but not available on PC",
        );
        verdict.pc_availability = Some(PcAvailability::Unavailable);
        return verdict;
    }
    let mut verdict = Verdict::new(
        ClassificationSource::Heuristic,
        judgment.qualifies,
        judgment.confidence,
        judgment.reason,
    );
    if judgment.qualifies {
        verdict.sub_genre = judgment.sub_genre;
        verdict.pc_availability = Some(PcAvailability::Available);
    }
    verdict
}

pub struct HeuristicScorer {
    backend: Option<Arc<dyn LlmBackend>>,
}

impl HeuristicScorer {
    /// `None` builds a stage that always reports [`StageFailure::NotConfigured`].
    #[must_use]
    pub fn new(backend: Option<Arc<dyn LlmBackend>>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ClassifierStage for HeuristicScorer {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn classify(&self, request: &ClassifyRequest) -> Result<Verdict, StageFailure> {
        let Some(backend) = &self.backend else {
            return Err(StageFailure::NotConfigured("heuristic scorer"));
        };
        let completion = backend
            .complete(&CompletionRequest {
                system: Some(HEURISTIC_SYSTEM.to_owned()),
                prompt: heuristic_prompt(request),
                max_tokens: 300,
                json_mode: false,
            })
            .await?;
        let judgment = parse_judgment(&completion)?;
        tracing::debug!(
            title = %request.name,
            provider = backend.provider(),
            qualifies = judgment.qualifies,
            confidence = judgment.confidence,
            "heuristic judgment received"
        );
        Ok(gate(&request.name, judgment))
    }
}
