//! One collection cycle end to end: discover, filter, classify, measure,
//! score and persist.

pub mod collector;
pub mod config;
pub mod cycle;
pub mod error;
pub mod feed;

pub use collector::{MetricCollector, PlayerCountSource};
pub use config::{load_registry, CycleConfig};
pub use cycle::{
    build_chain, run_collection_cycle, CycleContext, CycleReport, RankedTitle, Rejection,
};
pub use error::PipelineError;
pub use feed::{CandidateFeed, FixedFeed};
