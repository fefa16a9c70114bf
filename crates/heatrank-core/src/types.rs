//! Domain types shared by every heatrank crate.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An unclassified title surfaced by the discovery feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub viewer_count: u64,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub genre: Option<String>,
}

impl Candidate {
    #[must_use]
    pub fn new(name: impl Into<String>, viewer_count: u64) -> Self {
        Self {
            name: name.into(),
            viewer_count,
            description: None,
            tags: Vec::new(),
            genre: None,
        }
    }
}

/// Storefront or launcher a title is distributed through.
///
/// `Multi` is only meaningful as a primary platform: it marks titles whose
/// player base is split across several storefronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Steam,
    Riot,
    Battlenet,
    Epic,
    Origin,
    Uplay,
    Xbox,
    Console,
    Multi,
}

impl Platform {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Steam => "steam",
            Platform::Riot => "riot",
            Platform::Battlenet => "battlenet",
            Platform::Epic => "epic",
            Platform::Origin => "origin",
            Platform::Uplay => "uplay",
            Platform::Xbox => "xbox",
            Platform::Console => "console",
            Platform::Multi => "multi",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Viewpoint {
    FirstPerson,
    ThirdPerson,
    Mixed,
    #[default]
    Unknown,
}

impl Viewpoint {
    /// Parse the loose perspective labels classifiers return.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "first-person" | "first person" | "fps" => Viewpoint::FirstPerson,
            "third-person" | "third person" | "tps" => Viewpoint::ThirdPerson,
            "mixed" | "both" => Viewpoint::Mixed,
            _ => Viewpoint::Unknown,
        }
    }
}

impl std::fmt::Display for Viewpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Viewpoint::FirstPerson => write!(f, "first-person"),
            Viewpoint::ThirdPerson => write!(f, "third-person"),
            Viewpoint::Mixed => write!(f, "mixed"),
            Viewpoint::Unknown => write!(f, "unknown"),
        }
    }
}

/// Which classification path produced a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationSource {
    Registry,
    WeightedAi,
    Heuristic,
    Keyword,
    StaticFallback,
}

impl ClassificationSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ClassificationSource::Registry => "registry",
            ClassificationSource::WeightedAi => "weighted-ai",
            ClassificationSource::Heuristic => "heuristic",
            ClassificationSource::Keyword => "keyword",
            ClassificationSource::StaticFallback => "static-fallback",
        }
    }

    /// Inverse of [`ClassificationSource::as_str`].
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "registry" => Some(ClassificationSource::Registry),
            "weighted-ai" => Some(ClassificationSource::WeightedAi),
            "heuristic" => Some(ClassificationSource::Heuristic),
            "keyword" => Some(ClassificationSource::Keyword),
            "static-fallback" => Some(ClassificationSource::StaticFallback),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClassificationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PC availability verdict reported by the weighted classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PcAvailability {
    Available,
    Exclusive,
    Unavailable,
}

impl PcAvailability {
    /// `true` for verdicts that rule a title out regardless of its scores.
    #[must_use]
    pub fn is_veto(self) -> bool {
        matches!(self, PcAvailability::Exclusive | PcAvailability::Unavailable)
    }
}

/// Curated (or classified) attributes of a qualifying title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleProfile {
    pub name: String,
    pub platforms: BTreeMap<Platform, String>,
    pub primary_platform: Platform,
    pub genre: String,
    pub viewpoint: Viewpoint,
    pub pc_available: bool,
    /// Classification confidence, 0–100.
    pub confidence: u8,
    pub source: ClassificationSource,
    /// Spectator count the candidate was discovered with.
    pub viewer_count: u64,
}

impl TitleProfile {
    /// External id on Steam, when the title is listed there.
    #[must_use]
    pub fn steam_app_id(&self) -> Option<&str> {
        self.platforms
            .get(&Platform::Steam)
            .map(String::as_str)
            .filter(|id| id.chars().all(|c| c.is_ascii_digit()) && !id.is_empty())
    }
}

/// The eight analysis dimensions of the weighted classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionId {
    Shooting,
    Combat,
    Multiplayer,
    Objectives,
    Weapons,
    Competition,
    Platforms,
    Community,
}

impl DimensionId {
    pub const ALL: [DimensionId; 8] = [
        DimensionId::Shooting,
        DimensionId::Combat,
        DimensionId::Multiplayer,
        DimensionId::Objectives,
        DimensionId::Weapons,
        DimensionId::Competition,
        DimensionId::Platforms,
        DimensionId::Community,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DimensionId::Shooting => "shooting",
            DimensionId::Combat => "combat",
            DimensionId::Multiplayer => "multiplayer",
            DimensionId::Objectives => "objectives",
            DimensionId::Weapons => "weapons",
            DimensionId::Competition => "competition",
            DimensionId::Platforms => "platforms",
            DimensionId::Community => "community",
        }
    }

    /// Shooting, multiplayer and PC availability must all qualify.
    #[must_use]
    pub fn is_core(self) -> bool {
        matches!(
            self,
            DimensionId::Shooting | DimensionId::Multiplayer | DimensionId::Platforms
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: DimensionId,
    /// Clamped to 0–100.
    pub score: u8,
    pub qualifies: bool,
    pub rationale: String,
}

/// Raw inputs to the heat score for one title in one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    /// Concurrent players measured on Steam; 0 when not measurable.
    pub canonical_players: u64,
    /// Capacity metric: measured or estimated total concurrent players.
    pub estimated_players: u64,
    pub spectators: u64,
    pub content_views: u64,
    pub discussion_volume: u64,
}

/// One persisted heat record for a title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatSnapshot {
    pub title: String,
    pub captured_at: DateTime<Utc>,
    pub global_score: u8,
    pub region_scores: BTreeMap<String, u8>,
    pub top_regions: Vec<String>,
    pub local_market_score: u8,
    /// Trust in the capacity metric, 0.0–1.0.
    pub reliability: f64,
    pub metrics: RawMetrics,
    pub primary_platform: Platform,
    pub source: ClassificationSource,
    pub confidence: u8,
}
