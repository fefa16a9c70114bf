//! Region Score Deriver.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::estimator::MetricEstimator;

const REGION_JITTER: f64 = 5.0;
const DEFAULT_LOCAL_BASE: f64 = 60.0;
const SOCIAL_CAP: f64 = 1.3;

struct RegionProfile {
    top_regions: [&'static str; 3],
    scores: &'static [(&'static str, u8)],
}

const DEFAULT_PROFILE: RegionProfile = RegionProfile {
    top_regions: ["United States", "China", "Germany"],
    scores: &[
        ("United States", 80),
        ("China", 75),
        ("Germany", 70),
        ("Taiwan", 65),
    ],
};

const PROFILES: &[(&str, RegionProfile)] = &[
    (
        "Counter-Strike 2",
        RegionProfile {
            top_regions: ["Russia", "Brazil", "United States"],
            scores: &[("Russia", 95), ("Brazil", 88), ("United States", 82), ("Taiwan", 76)],
        },
    ),
    (
        "VALORANT",
        RegionProfile {
            top_regions: ["South Korea", "Japan", "United States"],
            scores: &[("South Korea", 94), ("Japan", 89), ("United States", 85), ("Taiwan", 82)],
        },
    ),
    (
        "Apex Legends",
        RegionProfile {
            top_regions: ["United States", "Japan", "Germany"],
            scores: &[("United States", 91), ("Japan", 86), ("Germany", 78), ("Taiwan", 72)],
        },
    ),
    (
        "Call of Duty: Modern Warfare III",
        RegionProfile {
            top_regions: ["United States", "United Kingdom", "Germany"],
            scores: &[
                ("United States", 93),
                ("United Kingdom", 81),
                ("Germany", 76),
                ("Taiwan", 68),
            ],
        },
    ),
    (
        "Overwatch 2",
        RegionProfile {
            top_regions: ["South Korea", "United States", "China"],
            scores: &[("South Korea", 96), ("United States", 84), ("China", 79), ("Taiwan", 87)],
        },
    ),
    (
        "Tom Clancy's Rainbow Six Siege",
        RegionProfile {
            top_regions: ["Brazil", "France", "United States"],
            scores: &[("Brazil", 89), ("France", 83), ("United States", 78), ("Taiwan", 71)],
        },
    ),
    (
        "Battlefield 2042",
        RegionProfile {
            top_regions: ["Germany", "United States", "United Kingdom"],
            scores: &[
                ("Germany", 75),
                ("United States", 72),
                ("United Kingdom", 68),
                ("Taiwan", 58),
            ],
        },
    ),
    (
        "Fortnite",
        RegionProfile {
            top_regions: ["United States", "United Kingdom", "Brazil"],
            scores: &[
                ("United States", 92),
                ("United Kingdom", 84),
                ("Brazil", 81),
                ("Taiwan", 75),
            ],
        },
    ),
    (
        "PUBG: BATTLEGROUNDS",
        RegionProfile {
            top_regions: ["China", "South Korea", "India"],
            scores: &[("China", 97), ("South Korea", 89), ("India", 85), ("Taiwan", 79)],
        },
    ),
    (
        "Destiny 2",
        RegionProfile {
            top_regions: ["United States", "United Kingdom", "Germany"],
            scores: &[
                ("United States", 84),
                ("United Kingdom", 76),
                ("Germany", 71),
                ("Taiwan", 63),
            ],
        },
    ),
];

fn profile_for(name: &str) -> &'static RegionProfile {
    PROFILES
        .iter()
        .find(|(title, _)| title.eq_ignore_ascii_case(name))
        .map_or(&DEFAULT_PROFILE, |(_, profile)| profile)
}

/// Regional breakdown for one title in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionScores {
    pub scores: BTreeMap<String, u8>,
    pub top_regions: Vec<String>,
    pub local_region: String,
    pub local_market_score: u8,
}

/// How well a title's genre suits the local market, judged from its name.
fn genre_affinity(name: &str) -> f64 {
    let lower = name.to_lowercase();
    if lower.contains("valorant") || lower.contains("overwatch") {
        1.2
    } else if lower.contains("pubg") || lower.contains("apex") {
        1.1
    } else if lower.contains("battlefield") {
        0.8
    } else {
        1.0
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Local-market score from a base regional score.
///
/// The social multiplier grows with spectators and is capped at 1.3.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn local_market_score(base: f64, name: &str, spectators: u64) -> u8 {
    let social = (1.0 + (spectators as f64 / 100_000.0) * 0.1).min(SOCIAL_CAP);
    clamp_score(base * genre_affinity(name) * social)
}

/// Per-region scores plus the local-market score for `name`.
///
/// Every stored base score is perturbed by the estimator's jitter (±5) and
/// clamped. The local market starts from the stored, unperturbed base for
/// `local_region`, or 60 when the profile has no entry for it.
#[must_use]
pub fn derive_region_scores(
    name: &str,
    spectators: u64,
    local_region: &str,
    estimator: &dyn MetricEstimator,
) -> RegionScores {
    let profile = profile_for(name);
    let scores: BTreeMap<String, u8> = profile
        .scores
        .iter()
        .map(|(region, base)| {
            let varied = f64::from(*base) + estimator.jitter(REGION_JITTER);
            ((*region).to_owned(), clamp_score(varied))
        })
        .collect();

    let local_base = profile
        .scores
        .iter()
        .find(|(region, _)| region.eq_ignore_ascii_case(local_region))
        .map_or(DEFAULT_LOCAL_BASE, |(_, base)| f64::from(*base));

    RegionScores {
        top_regions: profile.top_regions.iter().map(|r| (*r).to_owned()).collect(),
        local_market_score: local_market_score(local_base, name, spectators),
        local_region: local_region.to_owned(),
        scores,
    }
}
