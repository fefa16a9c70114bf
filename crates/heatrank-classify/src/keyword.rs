//! Stage 3: local keyword matching. Needs no network and never fails.

use async_trait::async_trait;
use heatrank_core::{ClassificationSource, PcAvailability};
use regex::Regex;

use crate::platform::check_pc_availability;
use crate::stage::{ClassifierStage, ClassifyRequest, StageFailure, Verdict};

const KEYWORD_CONFIDENCE: u8 = 60;

const SHOOTER_KEYWORDS: &[&str] = &[
    "shooter",
    "fps",
    "tps",
    "first person",
    "third person",
    "battle royale",
    "tactical",
    "counter",
    "call of duty",
    "valorant",
    "apex",
    "overwatch",
    "battlefield",
    "fortnite",
    "pubg",
    "rainbow six",
    "cs",
    "counter-strike",
    "destiny",
    "titanfall",
    "doom",
    "halo",
    "quake",
    "the finals",
    "xdefiant",
    "gears of war",
];

const SHOOTER_PATTERNS: [&str; 3] = [
    r"(?i)\b(fps|tps|shooter|tactical|battle\s*royale)\b",
    r"(?i)\b(counter|strike|warfare|battlefield|siege)\b",
    r"(?i)\b(apex|valorant|overwatch|destiny|fortnite|pubg)\b",
];

pub struct KeywordMatcher {
    keywords: Vec<Regex>,
    patterns: Vec<Regex>,
}

impl KeywordMatcher {
    #[must_use]
    pub fn new() -> Self {
        let keywords = SHOOTER_KEYWORDS
            .iter()
            .map(|k| {
                let escaped = regex::escape(k);
                // short tokens like "cs" must not match inside words
                let pattern = if k.len() <= 3 {
                    format!(r"(?i)\b{escaped}\b")
                } else {
                    format!("(?i){escaped}")
                };
                Regex::new(&pattern).expect("valid keyword regex")
            })
            .collect();
        let patterns = SHOOTER_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("valid shooter pattern"))
            .collect();
        Self { keywords, patterns }
    }

    /// The first keyword or pattern matching `text`, if any.
    #[must_use]
    pub fn matched(&self, text: &str) -> Option<String> {
        self.keywords
            .iter()
            .chain(&self.patterns)
            .find_map(|re| re.find(text).map(|m| m.as_str().to_lowercase()))
    }

    /// Local verdict for a title, matching over its name, description and tags.
    #[must_use]
    pub fn judge(&self, request: &ClassifyRequest) -> Verdict {
        let name = request.name.as_str();
        if !check_pc_availability(name) {
            let mut verdict = Verdict::new(
                ClassificationSource::Keyword,
                false,
                KEYWORD_CONFIDENCE,
                "not available on PC",
            );
            verdict.pc_availability = Some(PcAvailability::Unavailable);
            return verdict;
        }
        let text = request.searchable_text();
        match self.matched(&text) {
            Some(keyword) => {
                let mut verdict = Verdict::new(
                    ClassificationSource::Keyword,
                    true,
                    KEYWORD_CONFIDENCE,
                    format!("matches shooter keyword '{keyword}'"),
                )
                .with_sub_genre(Some(sub_genre_for(&text).to_owned()));
                verdict.pc_availability = Some(PcAvailability::Available);
                verdict
            }
            None => Verdict::new(
                ClassificationSource::Keyword,
                false,
                KEYWORD_CONFIDENCE,
                "no shooter keyword in name, description or tags",
            ),
        }
    }
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn sub_genre_for(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    if lower.contains("battle royale") {
        "battle-royale"
    } else if lower.contains("tactical") {
        "tactical-fps"
    } else if lower.contains("hero") {
        "hero-shooter"
    } else {
        "pc-shooter"
    }
}

#[async_trait]
impl ClassifierStage for KeywordMatcher {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn classify(&self, request: &ClassifyRequest) -> Result<Verdict, StageFailure> {
        Ok(self.judge(request))
    }
}
