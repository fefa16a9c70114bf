//! Status labels, trend direction and per-title summaries for the API.

use heatrank_core::HeatSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeatStatus {
    VeryHot,
    Hot,
    Steady,
    Cool,
    Cold,
}

impl HeatStatus {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            HeatStatus::VeryHot
        } else if score >= 60.0 {
            HeatStatus::Hot
        } else if score >= 40.0 {
            HeatStatus::Steady
        } else if score >= 20.0 {
            HeatStatus::Cool
        } else {
            HeatStatus::Cold
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            HeatStatus::VeryHot => "very hot",
            HeatStatus::Hot => "hot",
            HeatStatus::Steady => "steady",
            HeatStatus::Cool => "cool",
            HeatStatus::Cold => "cold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendDirection {
    Surging,
    Rising,
    Flat,
    Falling,
    Plunging,
}

impl TrendDirection {
    /// Direction for a change in heat points.
    #[must_use]
    pub fn from_change(change: f64) -> Self {
        if change > 10.0 {
            TrendDirection::Surging
        } else if change > 5.0 {
            TrendDirection::Rising
        } else if change > -5.0 {
            TrendDirection::Flat
        } else if change > -10.0 {
            TrendDirection::Falling
        } else {
            TrendDirection::Plunging
        }
    }
}

/// Relative change in percent, rounded. 0 when there is no previous value.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn trend_percentage(current: f64, previous: f64) -> i64 {
    if previous == 0.0 || !previous.is_finite() {
        return 0;
    }
    (((current - previous) / previous) * 100.0).round() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSummary {
    pub average_heat: u8,
    pub peak_heat: u8,
    pub peak_players: u64,
    pub peak_spectators: u64,
    pub data_points: usize,
}

/// Aggregate a title's snapshot history. All zeros for an empty history.
#[must_use]
pub fn summarize(snapshots: &[HeatSnapshot]) -> StatsSummary {
    if snapshots.is_empty() {
        return StatsSummary::default();
    }
    let total: u64 = snapshots.iter().map(|s| u64::from(s.global_score)).sum();
    let count = snapshots.len() as u64;
    StatsSummary {
        average_heat: u8::try_from((total + count / 2) / count).unwrap_or(100),
        peak_heat: snapshots.iter().map(|s| s.global_score).max().unwrap_or(0),
        peak_players: snapshots
            .iter()
            .map(|s| s.metrics.estimated_players)
            .max()
            .unwrap_or(0),
        peak_spectators: snapshots
            .iter()
            .map(|s| s.metrics.spectators)
            .max()
            .unwrap_or(0),
        data_points: snapshots.len(),
    }
}
