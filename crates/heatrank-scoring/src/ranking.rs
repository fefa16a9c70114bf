//! Presentation ordering. Never affects what is persisted.

/// `ln(capacity + 1) * 10 + confidence / 100 * 50`, plus 10 for titles
/// available on PC and minus 20 otherwise.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn composite_score(capacity: u64, confidence: u8, pc_available: bool) -> f64 {
    let magnitude = ((capacity as f64) + 1.0).ln() * 10.0;
    let certainty = f64::from(confidence.min(100)) / 100.0 * 50.0;
    let bonus = if pc_available { 10.0 } else { -20.0 };
    magnitude + certainty + bonus
}

/// Stable sort, highest key first.
pub fn rank_descending<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| key(b).total_cmp(&key(a)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_keeps_confidence_and_bonus() {
        let score = composite_score(0, 100, true);
        assert!((score - 60.0).abs() < 1e-9);
        let score = composite_score(0, 0, false);
        assert!((score + 20.0).abs() < 1e-9);
    }

    #[test]
    fn larger_capacity_ranks_higher() {
        assert!(composite_score(1_000_000, 60, true) > composite_score(10_000, 60, true));
    }

    #[test]
    fn pc_penalty_outweighs_confidence() {
        assert!(composite_score(100_000, 60, true) > composite_score(100_000, 100, false));
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let mut titles = vec![("a", 1.0), ("b", 3.0), ("c", 1.0), ("d", 2.0)];
        rank_descending(&mut titles, |t| t.1);
        let names: Vec<_> = titles.iter().map(|t| t.0).collect();
        assert_eq!(names, vec!["b", "d", "a", "c"]);
    }
}
