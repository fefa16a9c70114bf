//! Twitch game directory page: the secondary popularity feed.

use heatrank_core::Candidate;
use regex::Regex;
use reqwest::Client;

use crate::error::{check_status, DiscoveryError};
use crate::retry::retry_with_backoff;
use crate::source::parse_viewer_count;

pub const DEFAULT_DIRECTORY_URL: &str = "https://www.twitch.tv/directory/game";

const BROWSER_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Card markers tried in order; the first that appears in the page wins.
const CARD_MARKERS: [&str; 3] = [
    r#"data-a-target="browse-game-card""#,
    r#"class="tw-tower""#,
    r#"data-target="directory-game""#,
];

#[derive(Clone)]
pub struct DirectoryFeed {
    client: Client,
    url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl DirectoryFeed {
    #[must_use]
    pub fn new(client: Client, url: &str, max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            client,
            url: url.to_owned(),
            max_retries,
            backoff_base_ms,
        }
    }

    /// Scrape the directory page for up to `count` titles.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Empty`] when no game card could be parsed, or
    /// an HTTP error after retries are exhausted.
    pub async fn top_games(&self, count: usize) -> Result<Vec<Candidate>, DiscoveryError> {
        let html = retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self
                .client
                .get(&self.url)
                .header(reqwest::header::USER_AGENT, BROWSER_UA)
                .header(reqwest::header::ACCEPT, "text/html,*/*;q=0.8")
                .send()
                .await?;
            let response = check_status(response, &self.url)?;
            Ok(response.text().await?)
        })
        .await?;

        let candidates = parse_directory(&html, count);
        if candidates.is_empty() {
            return Err(DiscoveryError::Empty(self.url.clone()));
        }
        Ok(candidates)
    }
}

/// Extract `(name, viewers)` pairs from directory HTML, in page order.
///
/// Each card is the text between one marker and the next; the name comes from
/// the card's first heading and the viewer count from its first "viewers" stat.
#[must_use]
pub fn parse_directory(html: &str, count: usize) -> Vec<Candidate> {
    let Some(marker) = CARD_MARKERS.iter().find(|m| html.contains(**m)) else {
        return Vec::new();
    };

    let heading = Regex::new(
        r#"(?is)<(?:h3|[a-z0-9]+[^>]*data-a-target="tw-core-text-title")[^>]*>(.*?)</"#,
    )
    .expect("valid heading regex");
    let viewers = Regex::new(r"(?i)([\d.,]+\s*[km]?)\s*(?:viewers|觀眾)")
        .expect("valid viewers regex");
    let tags = Regex::new(r"(?is)<[^>]+>").expect("valid tags regex");

    html.split(marker)
        .skip(1)
        .filter_map(|card| {
            let raw_name = heading.captures(card)?.get(1)?.as_str();
            let name = decode_entities(&tags.replace_all(raw_name, " "))
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            if name.is_empty() {
                return None;
            }
            let viewer_count = viewers
                .captures(card)
                .and_then(|c| c.get(1))
                .map_or(0, |m| parse_viewer_count(m.as_str()));
            Some(Candidate::new(name, viewer_count))
        })
        .take(count)
        .collect()
}

fn decode_entities(s: &str) -> String {
    s.replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
