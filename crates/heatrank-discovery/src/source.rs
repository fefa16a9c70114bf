//! Candidate Source Adapter: Helix, then the directory scrape, then a fixed
//! list. Always yields a batch; the tier that served it is reported.

use std::time::Duration;

use heatrank_core::{AppConfig, Candidate};
use reqwest::Client;
use serde::Serialize;

use crate::directory::{DirectoryFeed, DEFAULT_DIRECTORY_URL};
use crate::error::DiscoveryError;
use crate::helix::{HelixFeed, DEFAULT_HELIX_BASE_URL};

/// Which feed produced a candidate batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTier {
    Primary,
    Secondary,
    Static,
}

impl SourceTier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceTier::Primary => "primary",
            SourceTier::Secondary => "secondary",
            SourceTier::Static => "static",
        }
    }
}

impl std::fmt::Display for SourceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct CandidateBatch {
    pub tier: SourceTier,
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub helix_base_url: String,
    pub directory_url: String,
    pub twitch_client_id: Option<String>,
    pub twitch_access_token: Option<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl SourceConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            helix_base_url: DEFAULT_HELIX_BASE_URL.to_owned(),
            directory_url: DEFAULT_DIRECTORY_URL.to_owned(),
            twitch_client_id: config.twitch_client_id.clone(),
            twitch_access_token: config.twitch_access_token.clone(),
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

pub struct CandidateSource {
    helix: HelixFeed,
    directory: DirectoryFeed,
}

impl CandidateSource {
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`DiscoveryError::InvalidBaseUrl`] if a feed URL does not parse.
    pub fn new(config: &SourceConfig) -> Result<Self, DiscoveryError> {
        for url in [&config.helix_base_url, &config.directory_url] {
            reqwest::Url::parse(url).map_err(|e| DiscoveryError::InvalidBaseUrl {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            helix: HelixFeed::new(
                client.clone(),
                &config.helix_base_url,
                config.twitch_client_id.clone(),
                config.twitch_access_token.clone(),
                config.max_retries,
                config.backoff_base_ms,
            ),
            directory: DirectoryFeed::new(
                client,
                &config.directory_url,
                config.max_retries,
                config.backoff_base_ms,
            ),
        })
    }

    /// Fetch up to `count` candidates from the highest tier that answers.
    ///
    /// Never fails: feed errors are logged and the next tier is tried, ending
    /// with the built-in list.
    pub async fn fetch_candidates(&self, count: usize) -> CandidateBatch {
        if self.helix.is_configured() {
            match self.helix.top_games(count).await {
                Ok(candidates) => return served(SourceTier::Primary, candidates, count),
                Err(e) => {
                    tracing::warn!(error = %e, "primary feed failed; trying directory scrape");
                }
            }
        } else {
            tracing::info!("twitch credentials not configured; skipping primary feed");
        }

        match self.directory.top_games(count).await {
            Ok(candidates) => return served(SourceTier::Secondary, candidates, count),
            Err(e) => tracing::warn!(error = %e, "directory scrape failed; using static list"),
        }

        served(SourceTier::Static, static_candidates(), count)
    }
}

fn served(tier: SourceTier, mut candidates: Vec<Candidate>, count: usize) -> CandidateBatch {
    candidates.truncate(count);
    tracing::info!(tier = %tier, candidates = candidates.len(), "candidate batch served");
    CandidateBatch { tier, candidates }
}

/// The fixed last-resort list: curated shooters, unclassified shooters,
/// non-shooters, one console exclusive and one mobile title.
#[must_use]
pub fn static_candidates() -> Vec<Candidate> {
    [
        ("Counter-Strike 2", 85_000),
        ("VALORANT", 75_000),
        ("Fortnite", 95_000),
        ("Apex Legends", 45_000),
        ("Call of Duty: Modern Warfare III", 35_000),
        ("Overwatch 2", 28_000),
        ("PUBG: BATTLEGROUNDS", 32_000),
        ("Tom Clancy's Rainbow Six Siege", 20_000),
        ("Battlefield 2042", 12_000),
        ("Destiny 2", 15_000),
        ("League of Legends", 120_000),
        ("World of Warcraft", 40_000),
        ("Minecraft", 60_000),
        ("Grand Theft Auto V", 50_000),
        ("Among Us", 30_000),
        ("Titanfall 3", 22_000),
        ("The Finals", 35_000),
        ("XDefiant", 25_000),
        ("Gears 5", 8_000),
        ("Splatoon 3", 18_000),
        ("PUBG Mobile", 15_000),
    ]
    .into_iter()
    .map(|(name, viewers)| Candidate::new(name, viewers))
    .collect()
}

/// Parse abbreviated viewer text such as `"45.2K viewers"` or `"1.2M"`.
///
/// Everything except digits, `.`, `k` and `m` is discarded first; unparseable
/// text yields 0.
#[must_use]
pub fn parse_viewer_count(text: &str) -> u64 {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | 'k' | 'm'))
        .collect();
    let multiplier = if cleaned.contains('k') {
        1_000.0
    } else if cleaned.contains('m') {
        1_000_000.0
    } else {
        1.0
    };
    let numeric: String = cleaned
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let Ok(value) = numeric.parse::<f64>() else {
        return 0;
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let viewers = (value * multiplier).round() as u64;
    viewers
}
