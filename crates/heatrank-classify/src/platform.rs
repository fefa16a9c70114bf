//! Name-based platform heuristics for titles that have not been curated.

use std::collections::BTreeMap;

use heatrank_core::Platform;
use heatrank_discovery::exclusion::exclusion_reason;

/// Fragments typical of mobile titles; checked on top of the exclusion lists.
const MOBILE_FRAGMENTS: [&str; 4] = ["mobile", "legends", "clash", "candy"];

/// Local PC-availability check used to gate stages that do not assess
/// platform themselves. Stricter than the exclusion filter: it also rejects
/// generic mobile-sounding names.
#[must_use]
pub fn check_pc_availability(name: &str) -> bool {
    if exclusion_reason(name).is_some() {
        return false;
    }
    let lower = name.to_lowercase();
    !MOBILE_FRAGMENTS.iter().any(|f| lower.contains(f))
}

/// Best guess at where a title is distributed, from its name alone.
///
/// Always returns exactly one entry.
#[must_use]
pub fn guess_platforms(name: &str) -> BTreeMap<Platform, String> {
    let lower = name.to_lowercase();
    let mut platforms = BTreeMap::new();
    if lower.contains("valorant") || lower.contains("riot") {
        platforms.insert(Platform::Riot, "valorant".to_owned());
    } else if lower.contains("call of duty") || lower.contains("overwatch") {
        let id: String = lower
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        platforms.insert(Platform::Battlenet, id);
    } else if lower.contains("fortnite") {
        platforms.insert(Platform::Epic, "fortnite".to_owned());
    } else if !check_pc_availability(name) {
        platforms.insert(Platform::Console, "exclusive".to_owned());
    } else {
        platforms.insert(Platform::Steam, "unknown".to_owned());
    }
    platforms
}

/// Primary platform for a guessed platform map, by fixed precedence.
#[must_use]
pub fn guess_primary(platforms: &BTreeMap<Platform, String>) -> Platform {
    [
        Platform::Riot,
        Platform::Battlenet,
        Platform::Epic,
        Platform::Console,
        Platform::Steam,
    ]
    .into_iter()
    .find(|p| platforms.contains_key(p))
    .unwrap_or(Platform::Multi)
}
