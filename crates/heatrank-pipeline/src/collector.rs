//! Per-title metric collection: the measured Steam count plus estimates.

use std::sync::Arc;

use async_trait::async_trait;
use heatrank_core::{RawMetrics, TitleProfile};
use heatrank_discovery::{DiscoveryError, SteamClient};
use heatrank_scoring::{assemble_metrics, MetricEstimator};

#[async_trait]
pub trait PlayerCountSource: Send + Sync {
    /// Concurrent players for a Steam app id; `Ok(None)` for unknown apps.
    async fn current_players(&self, app_id: &str) -> Result<Option<u64>, DiscoveryError>;
}

#[async_trait]
impl PlayerCountSource for SteamClient {
    async fn current_players(&self, app_id: &str) -> Result<Option<u64>, DiscoveryError> {
        SteamClient::current_players(self, app_id).await
    }
}

pub struct MetricCollector {
    steam: Option<Arc<dyn PlayerCountSource>>,
    estimator: Arc<dyn MetricEstimator>,
}

impl MetricCollector {
    #[must_use]
    pub fn new(
        steam: Option<Arc<dyn PlayerCountSource>>,
        estimator: Arc<dyn MetricEstimator>,
    ) -> Self {
        Self { steam, estimator }
    }

    #[must_use]
    pub fn estimator(&self) -> &dyn MetricEstimator {
        self.estimator.as_ref()
    }

    /// Steam players for `profile`, or 0 when it has no numeric Steam id or
    /// the lookup fails.
    pub async fn measured_players(&self, profile: &TitleProfile) -> u64 {
        let (Some(steam), Some(app_id)) = (&self.steam, profile.steam_app_id()) else {
            return 0;
        };
        match steam.current_players(app_id).await {
            Ok(Some(count)) => count,
            Ok(None) => {
                tracing::debug!(title = %profile.name, app_id, "steam does not know this app");
                0
            }
            Err(e) => {
                tracing::warn!(
                    title = %profile.name,
                    app_id,
                    error = %e,
                    "steam player count failed"
                );
                0
            }
        }
    }

    pub async fn collect(&self, profile: &TitleProfile) -> RawMetrics {
        let measured = self.measured_players(profile).await;
        assemble_metrics(profile, measured, self.estimator.as_ref())
    }
}
