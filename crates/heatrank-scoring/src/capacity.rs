//! Capacity metric and reliability factor.
//!
//! Only Steam publishes concurrent player counts, so every other storefront
//! gets an estimate: a fixed range per launcher, or the Steam count scaled
//! by a per-title multiplier for titles split across storefronts.

use heatrank_core::{Platform, RawMetrics, TitleProfile};

use crate::estimator::MetricEstimator;

const RIOT_RANGE: (u64, u64) = (1_200_000, 2_000_000);
const CALL_OF_DUTY_RANGE: (u64, u64) = (800_000, 1_400_000);
const BATTLENET_RANGE: (u64, u64) = (600_000, 1_000_000);
const EPIC_RANGE: (u64, u64) = (3_000_000, 5_000_000);

const SPECTATOR_RANGE: (u64, u64) = (1_000, 15_000);
const CONTENT_VIEWS_RANGE: (u64, u64) = (100_000, 1_100_000);
const DISCUSSION_RANGE: (u64, u64) = (100, 1_100);

/// Ratio of total players to Steam players for multi-storefront titles.
#[must_use]
pub fn platform_multiplier(name: &str) -> f64 {
    let lower = name.to_lowercase();
    if lower.contains("apex") {
        3.5
    } else if lower.contains("rainbow six") || lower.contains("siege") {
        2.2
    } else if lower.contains("battlefield") {
        2.8
    } else {
        2.5
    }
}

/// Fallback range for multi-storefront titles when Steam reports nothing.
fn multi_estimate_range(name: &str) -> (u64, u64) {
    let lower = name.to_lowercase();
    if lower.contains("apex") {
        (600_000, 1_000_000)
    } else if lower.contains("rainbow six") || lower.contains("siege") {
        (300_000, 500_000)
    } else if lower.contains("battlefield") {
        (150_000, 250_000)
    } else {
        (100_000, 300_000)
    }
}

fn sample(estimator: &dyn MetricEstimator, range: (u64, u64)) -> u64 {
    estimator.sample_range(range.0, range.1)
}

/// Estimated total concurrent players for `profile`, given the measured
/// Steam count (0 when unavailable).
#[must_use]
pub fn estimate_capacity(
    profile: &TitleProfile,
    measured_steam: u64,
    estimator: &dyn MetricEstimator,
) -> u64 {
    match profile.primary_platform {
        Platform::Riot => sample(estimator, RIOT_RANGE),
        Platform::Battlenet => {
            if profile.name.to_lowercase().contains("call of duty") {
                sample(estimator, CALL_OF_DUTY_RANGE)
            } else {
                sample(estimator, BATTLENET_RANGE)
            }
        }
        Platform::Epic => sample(estimator, EPIC_RANGE),
        Platform::Multi if measured_steam > 0 => {
            #[allow(
                clippy::cast_precision_loss,
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss
            )]
            let scaled =
                (measured_steam as f64 * platform_multiplier(&profile.name)).floor() as u64;
            scaled
        }
        Platform::Multi => sample(estimator, multi_estimate_range(&profile.name)),
        _ => measured_steam,
    }
}

/// Trust in the capacity metric, 0.0–1.0.
#[must_use]
pub fn reliability(profile: &TitleProfile) -> f64 {
    let mut r: f64 = if profile.primary_platform == Platform::Steam {
        0.9
    } else if profile.platforms.contains_key(&Platform::Steam) {
        0.6
    } else {
        0.3
    };
    if profile.primary_platform == Platform::Multi {
        r -= 0.2;
    }
    r.clamp(0.0, 1.0)
}

/// All raw inputs for one title's heat score.
///
/// The discovery viewer count is the spectator metric; the two engagement
/// metrics have no live feed and always come from the estimator.
#[must_use]
pub fn assemble_metrics(
    profile: &TitleProfile,
    measured_steam: u64,
    estimator: &dyn MetricEstimator,
) -> RawMetrics {
    let spectators = if profile.viewer_count > 0 {
        profile.viewer_count
    } else {
        sample(estimator, SPECTATOR_RANGE)
    };
    RawMetrics {
        canonical_players: measured_steam,
        estimated_players: estimate_capacity(profile, measured_steam, estimator),
        spectators,
        content_views: sample(estimator, CONTENT_VIEWS_RANGE),
        discussion_volume: sample(estimator, DISCUSSION_RANGE),
    }
}

#[cfg(test)]
#[path = "capacity_test.rs"]
mod tests;
