mod app_config;
mod config;
pub mod titles;
pub mod types;

pub use app_config::{AppConfig, Environment, HeuristicProvider};
pub use config::{load_app_config, load_app_config_from_env};
pub use titles::{load_titles, slugify, TitleEntry, TitlesFile};
pub use types::{
    Candidate, ClassificationSource, DimensionId, DimensionScore, HeatSnapshot, PcAvailability,
    Platform, RawMetrics, TitleProfile, Viewpoint,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read titles file {path}: {source}")]
    TitlesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse titles file: {0}")]
    TitlesFileParse(#[from] serde_yaml::Error),

    #[error("titles validation failed: {0}")]
    Validation(String),
}
