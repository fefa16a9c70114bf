//! Source of placeholder values for metrics that cannot be measured.

use rand::Rng;

pub trait MetricEstimator: Send + Sync {
    /// A value in `[min, max]`.
    fn sample_range(&self, min: u64, max: u64) -> u64;

    /// A symmetric variation in `[-amplitude, amplitude]`.
    fn jitter(&self, amplitude: f64) -> f64;
}

/// Production estimator backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomEstimator;

impl MetricEstimator for RandomEstimator {
    fn sample_range(&self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        rand::rng().random_range(min..=max)
    }

    fn jitter(&self, amplitude: f64) -> f64 {
        if amplitude <= 0.0 {
            return 0.0;
        }
        (rand::random::<f64>() - 0.5) * 2.0 * amplitude
    }
}

/// Deterministic estimator for tests and dry runs.
///
/// `fraction` picks the point inside every range (0.0 = min, 1.0 = max);
/// `jitter` is returned as-is, clamped to the requested amplitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedEstimator {
    pub fraction: f64,
    pub jitter: f64,
}

impl FixedEstimator {
    /// Midpoint of every range, no jitter.
    #[must_use]
    pub fn midpoint() -> Self {
        Self {
            fraction: 0.5,
            jitter: 0.0,
        }
    }
}

impl MetricEstimator for FixedEstimator {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn sample_range(&self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        let span = (max - min) as f64;
        min + (span * self.fraction.clamp(0.0, 1.0)).round() as u64
    }

    fn jitter(&self, amplitude: f64) -> f64 {
        let amplitude = amplitude.abs();
        self.jitter.clamp(-amplitude, amplitude)
    }
}
