//! Heat Score Aggregator.

use heatrank_core::{RawMetrics, TitleProfile};

use crate::capacity::reliability;

const SATURATION_PLAYERS: f64 = 500_000.0;
const SATURATION_SPECTATORS: f64 = 50_000.0;
const SATURATION_CONTENT_VIEWS: f64 = 500_000.0;
const SATURATION_DISCUSSION: f64 = 500.0;

/// Below this reliability the capacity metric is trusted less.
const LOW_RELIABILITY: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Weights {
    players: f64,
    spectators: f64,
    content_views: f64,
    discussion: f64,
}

const BASE_WEIGHTS: Weights = Weights {
    players: 0.3,
    spectators: 0.4,
    content_views: 0.2,
    discussion: 0.1,
};

const SHIFTED_WEIGHTS: Weights = Weights {
    players: 0.2,
    spectators: 0.5,
    content_views: 0.25,
    discussion: 0.05,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatScore {
    pub score: u8,
    pub reliability: f64,
}

#[allow(clippy::cast_precision_loss)]
fn normalize(value: u64, saturation: f64) -> f64 {
    (value as f64 / saturation).min(1.0)
}

/// Weighted, reliability-damped heat score in `[0, 100]`.
#[must_use]
pub fn score_metrics(metrics: &RawMetrics, reliability: f64) -> u8 {
    let reliability = if reliability.is_finite() {
        reliability.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let w = if reliability < LOW_RELIABILITY {
        SHIFTED_WEIGHTS
    } else {
        BASE_WEIGHTS
    };
    let raw = (normalize(metrics.estimated_players, SATURATION_PLAYERS) * w.players
        + normalize(metrics.spectators, SATURATION_SPECTATORS) * w.spectators
        + normalize(metrics.content_views, SATURATION_CONTENT_VIEWS) * w.content_views
        + normalize(metrics.discussion_volume, SATURATION_DISCUSSION) * w.discussion)
        * 100.0;
    let damped = raw * (0.7 + 0.3 * reliability);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = damped.round().clamp(0.0, 100.0) as u8;
    score
}

/// Heat score for one title, with the reliability it was computed at.
#[must_use]
pub fn compute_heat_score(profile: &TitleProfile, metrics: &RawMetrics) -> HeatScore {
    let reliability = reliability(profile);
    HeatScore {
        score: score_metrics(metrics, reliability),
        reliability,
    }
}
