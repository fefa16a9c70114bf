//! Exclusion Filter: drops titles that cannot be played on PC before any
//! classification cost is spent on them.

use heatrank_core::Candidate;

/// Console and handheld exclusives.
pub const CONSOLE_EXCLUSIVES: &[&str] = &[
    "splatoon 3",
    "splatoon 2",
    "mario kart 8",
    "super smash bros",
    "the last of us",
    "god of war",
    "halo infinite",
    "gears of war 4",
];

pub const MOBILE_TITLES: &[&str] = &[
    "pubg mobile",
    "call of duty mobile",
    "free fire",
    "mobile legends",
    "honor of kings",
    "clash royale",
    "clash of clans",
];

/// Platform-holder franchises that never ship on PC.
pub const EXCLUSIVE_FRANCHISES: &[&str] = &[
    "mario",
    "zelda",
    "pokemon",
    "splatoon",
    "smash bros",
    "last of us",
    "god of war",
    "spider-man",
    "horizon",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    ConsoleExclusive(&'static str),
    Mobile(&'static str),
    Franchise(&'static str),
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusionReason::ConsoleExclusive(m) => write!(f, "console exclusive ({m})"),
            ExclusionReason::Mobile(m) => write!(f, "mobile title ({m})"),
            ExclusionReason::Franchise(m) => write!(f, "platform-holder franchise ({m})"),
        }
    }
}

/// Why `name` is excluded, if it is. Case-insensitive substring match.
#[must_use]
pub fn exclusion_reason(name: &str) -> Option<ExclusionReason> {
    let lower = name.to_lowercase();
    let hit = |list: &'static [&'static str]| list.iter().copied().find(|m| lower.contains(m));

    hit(CONSOLE_EXCLUSIVES)
        .map(ExclusionReason::ConsoleExclusive)
        .or_else(|| hit(MOBILE_TITLES).map(ExclusionReason::Mobile))
        .or_else(|| hit(EXCLUSIVE_FRANCHISES).map(ExclusionReason::Franchise))
}

/// Remove every candidate with an [`ExclusionReason`], preserving order.
///
/// A franchise fragment can catch a PC title that merely shares a word; that
/// cost is accepted. Idempotent.
#[must_use]
pub fn filter(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let before = candidates.len();
    let kept: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| match exclusion_reason(&c.name) {
            Some(reason) => {
                tracing::info!(title = %c.name, reason = %reason, "candidate excluded");
                false
            }
            None => true,
        })
        .collect();
    tracing::debug!(before, after = kept.len(), "exclusion filter applied");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::static_candidates;

    fn names(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn splatoon_is_a_console_exclusive() {
        assert_eq!(
            exclusion_reason("Splatoon 3"),
            Some(ExclusionReason::ConsoleExclusive("splatoon 3"))
        );
    }

    #[test]
    fn mobile_titles_are_excluded_case_insensitively() {
        assert_eq!(
            exclusion_reason("PUBG MOBILE"),
            Some(ExclusionReason::Mobile("pubg mobile"))
        );
    }

    #[test]
    fn franchise_fragment_matches_substrings() {
        assert_eq!(
            exclusion_reason("Horizon Forbidden West"),
            Some(ExclusionReason::Franchise("horizon"))
        );
    }

    #[test]
    fn pc_shooters_pass() {
        for name in ["Counter-Strike 2", "Apex Legends", "PUBG: BATTLEGROUNDS", "Gears 5"] {
            assert_eq!(exclusion_reason(name), None, "{name} should pass");
        }
    }

    #[test]
    fn filter_preserves_order_and_drops_exclusions() {
        let out = filter(static_candidates());
        let kept = names(&out);
        assert!(!kept.contains(&"Splatoon 3"));
        assert!(!kept.contains(&"PUBG Mobile"));
        assert_eq!(kept.len(), 19);
        assert_eq!(kept[0], "Counter-Strike 2");
        assert_eq!(kept[1], "VALORANT");
    }

    #[test]
    fn filter_is_idempotent() {
        let once = filter(static_candidates());
        let twice = filter(once.clone());
        assert_eq!(once, twice);
    }
}
