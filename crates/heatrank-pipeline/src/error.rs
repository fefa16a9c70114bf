use heatrank_classify::LlmError;
use heatrank_discovery::DiscoveryError;
use thiserror::Error;

/// Failures while wiring a cycle together. A running cycle never fails.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("discovery setup failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("classifier backend setup failed: {0}")]
    Backend(#[from] LlmError),
}
