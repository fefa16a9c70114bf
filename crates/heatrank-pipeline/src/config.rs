use std::time::Duration;

use heatrank_classify::KnownTitleRegistry;
use heatrank_core::{load_titles, AppConfig, ConfigError};

/// Per-cycle settings. Passed into every cycle so two configurations can
/// run side by side in one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleConfig {
    pub discovery_count: usize,
    pub use_weighted: bool,
    pub use_heuristic: bool,
    pub weighted_timeout: Duration,
    pub heuristic_timeout: Duration,
    /// Pause between classifications that reach the classifier stages.
    pub classify_delay: Duration,
    /// Pause between per-title metric collections.
    pub collect_delay: Duration,
    pub local_region: String,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            discovery_count: 20,
            use_weighted: true,
            use_heuristic: true,
            weighted_timeout: Duration::from_secs(15),
            heuristic_timeout: Duration::from_secs(10),
            classify_delay: Duration::from_millis(1_500),
            collect_delay: Duration::from_millis(2_000),
            local_region: "Taiwan".to_owned(),
        }
    }
}

impl CycleConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            discovery_count: config.discovery_count,
            use_weighted: config.use_weighted,
            use_heuristic: config.use_heuristic,
            weighted_timeout: Duration::from_secs(config.weighted_timeout_secs),
            heuristic_timeout: Duration::from_secs(config.heuristic_timeout_secs),
            classify_delay: Duration::from_millis(config.classify_delay_ms),
            collect_delay: Duration::from_millis(config.collect_delay_ms),
            local_region: config.local_region.clone(),
        }
    }

    /// Same settings with every pause removed.
    #[must_use]
    pub fn without_delays(mut self) -> Self {
        self.classify_delay = Duration::ZERO;
        self.collect_delay = Duration::ZERO;
        self
    }
}

/// The built-in registry, extended by `HEATRANK_TITLES_PATH` when set.
///
/// # Errors
///
/// Returns [`ConfigError`] if the titles file cannot be read or is invalid.
pub fn load_registry(config: &AppConfig) -> Result<KnownTitleRegistry, ConfigError> {
    match &config.titles_path {
        Some(path) => {
            let file = load_titles(path)?;
            tracing::info!(
                path = %path.display(),
                extra = file.titles.len(),
                "loaded curated titles"
            );
            Ok(KnownTitleRegistry::with_extra(file.titles))
        }
        None => Ok(KnownTitleRegistry::builtin()),
    }
}
