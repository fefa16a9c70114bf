//! Candidate discovery for the heat ranking: popularity feeds with ordered
//! fallback, the platform exclusion filter, and the Steam player-count client.

pub mod directory;
pub mod error;
pub mod exclusion;
pub mod helix;
pub(crate) mod retry;
pub mod source;
pub mod steam;

pub use error::DiscoveryError;
pub use exclusion::{filter, ExclusionReason};
pub use source::{
    parse_viewer_count, static_candidates, CandidateBatch, CandidateSource, SourceConfig,
    SourceTier,
};
pub use steam::SteamClient;
