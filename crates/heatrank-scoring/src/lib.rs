//! Heat scoring: capacity estimation, the reliability-weighted heat score,
//! regional breakdowns and the presentation helpers built on top of them.

pub mod capacity;
pub mod estimator;
pub mod heat;
pub mod ranking;
pub mod region;
pub mod trend;

pub use capacity::{assemble_metrics, estimate_capacity, platform_multiplier, reliability};
pub use estimator::{FixedEstimator, MetricEstimator, RandomEstimator};
pub use heat::{compute_heat_score, score_metrics, HeatScore};
pub use ranking::{composite_score, rank_descending};
pub use region::{derive_region_scores, local_market_score, RegionScores};
pub use trend::{summarize, trend_percentage, HeatStatus, StatsSummary, TrendDirection};
