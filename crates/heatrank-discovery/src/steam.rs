//! Steam Web API client for concurrent player counts.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::{check_status, DiscoveryError};
use crate::retry::retry_with_backoff;

pub const DEFAULT_STEAM_BASE_URL: &str = "https://api.steampowered.com";

#[derive(Debug, Deserialize)]
struct CurrentPlayersEnvelope {
    response: CurrentPlayers,
}

#[derive(Debug, Deserialize)]
struct CurrentPlayers {
    #[serde(default)]
    player_count: Option<u64>,
    result: i32,
}

pub struct SteamClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl SteamClient {
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, DiscoveryError> {
        Self::with_base_url(
            DEFAULT_STEAM_BASE_URL,
            timeout_secs,
            user_agent,
            max_retries,
            backoff_base_ms,
        )
    }

    /// Same as [`SteamClient::new`] against a custom base URL (wiremock in tests).
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Http`] if the `reqwest::Client` cannot be built.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, DiscoveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            max_retries,
            backoff_base_ms,
        })
    }

    /// Current concurrent players for `app_id`. `Ok(None)` when Steam reports
    /// the app as unknown (`result != 1`).
    ///
    /// # Errors
    ///
    /// HTTP failures after retries, or a payload that does not deserialize.
    pub async fn current_players(&self, app_id: &str) -> Result<Option<u64>, DiscoveryError> {
        let url = format!(
            "{}/ISteamUserStats/GetNumberOfCurrentPlayers/v1/?appid={app_id}",
            self.base_url
        );

        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.client.get(&url).send().await?;
                let response = check_status(response, &url)?;
                Ok(response.text().await?)
            }
        })
        .await?;

        let envelope: CurrentPlayersEnvelope =
            serde_json::from_str(&body).map_err(|source| DiscoveryError::Deserialize {
                context: format!("steam current players for app {app_id}"),
                source,
            })?;

        if envelope.response.result != 1 {
            tracing::debug!(app_id, result = envelope.response.result, "steam app not found");
            return Ok(None);
        }
        Ok(envelope.response.player_count)
    }
}
