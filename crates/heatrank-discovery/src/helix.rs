//! Twitch Helix `games/top`: the primary popularity feed.

use heatrank_core::Candidate;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{check_status, DiscoveryError};
use crate::retry::retry_with_backoff;

pub const DEFAULT_HELIX_BASE_URL: &str = "https://api.twitch.tv/helix";

/// Helix caps `first` at 100.
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct TopGamesResponse {
    data: Vec<TopGame>,
}

#[derive(Debug, Deserialize)]
struct TopGame {
    name: String,
    #[serde(default)]
    viewer_count: Option<ViewerCount>,
}

/// Viewer counts arrive as numbers or numeric strings depending on the proxy.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ViewerCount {
    Number(u64),
    Text(String),
}

impl ViewerCount {
    fn value(&self) -> u64 {
        match self {
            ViewerCount::Number(n) => *n,
            ViewerCount::Text(s) => s.trim().parse().unwrap_or(0),
        }
    }
}

#[derive(Clone)]
pub struct HelixFeed {
    client: Client,
    base_url: String,
    client_id: Option<String>,
    access_token: Option<String>,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HelixFeed {
    #[must_use]
    pub fn new(
        client: Client,
        base_url: &str,
        client_id: Option<String>,
        access_token: Option<String>,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            client_id,
            access_token,
            max_retries,
            backoff_base_ms,
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.access_token.is_some()
    }

    /// Fetch the `count` most-watched titles, in feed order.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::NotConfigured`] when the client id or token is missing.
    /// - [`DiscoveryError::Http`] / [`DiscoveryError::UnexpectedStatus`] after retries.
    /// - [`DiscoveryError::Deserialize`] when the payload is not the expected shape.
    /// - [`DiscoveryError::Empty`] when the feed returns no titles.
    pub async fn top_games(&self, count: usize) -> Result<Vec<Candidate>, DiscoveryError> {
        let (Some(client_id), Some(token)) = (&self.client_id, &self.access_token) else {
            return Err(DiscoveryError::NotConfigured("TWITCH_CLIENT_ID/TWITCH_ACCESS_TOKEN"));
        };
        let url = format!(
            "{}/games/top?first={}",
            self.base_url,
            count.clamp(1, MAX_PAGE_SIZE)
        );

        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header("Client-ID", client_id)
                    .bearer_auth(token)
                    .send()
                    .await?;
                let response = check_status(response, &url)?;
                Ok(response.text().await?)
            }
        })
        .await?;

        let parsed: TopGamesResponse =
            serde_json::from_str(&body).map_err(|source| DiscoveryError::Deserialize {
                context: "helix games/top".to_owned(),
                source,
            })?;

        let candidates: Vec<Candidate> = parsed
            .data
            .into_iter()
            .filter(|g| !g.name.trim().is_empty())
            .take(count)
            .map(|g| {
                let viewers = g.viewer_count.as_ref().map_or(0, ViewerCount::value);
                Candidate::new(g.name.trim(), viewers)
            })
            .collect();

        if candidates.is_empty() {
            return Err(DiscoveryError::Empty("helix games/top".to_owned()));
        }
        Ok(candidates)
    }
}
