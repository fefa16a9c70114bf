use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which text-classification service backs the heuristic stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeuristicProvider {
    OpenAi,
    Anthropic,
}

impl HeuristicProvider {
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            HeuristicProvider::OpenAi => "gpt-3.5-turbo",
            HeuristicProvider::Anthropic => "claude-3-haiku-20240307",
        }
    }
}

impl std::fmt::Display for HeuristicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeuristicProvider::OpenAi => write!(f, "openai"),
            HeuristicProvider::Anthropic => write!(f, "anthropic"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Only the server and persisting CLI commands require a database.
    pub database_url: Option<String>,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub titles_path: Option<PathBuf>,
    pub twitch_client_id: Option<String>,
    pub twitch_access_token: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub heuristic_provider: HeuristicProvider,
    pub weighted_model: String,
    pub heuristic_model: String,
    pub use_weighted: bool,
    pub use_heuristic: bool,
    pub discovery_count: usize,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub weighted_timeout_secs: u64,
    pub heuristic_timeout_secs: u64,
    pub classify_delay_ms: u64,
    pub collect_delay_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub schedule: String,
    pub schedule_utc_offset_hours: i32,
    pub local_region: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

fn redact(value: Option<&String>) -> Option<&'static str> {
    value.map(|_| "[redacted]")
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("titles_path", &self.titles_path)
            .field("database_url", &redact(self.database_url.as_ref()))
            .field("twitch_client_id", &self.twitch_client_id)
            .field(
                "twitch_access_token",
                &redact(self.twitch_access_token.as_ref()),
            )
            .field("openai_api_key", &redact(self.openai_api_key.as_ref()))
            .field(
                "anthropic_api_key",
                &redact(self.anthropic_api_key.as_ref()),
            )
            .field("heuristic_provider", &self.heuristic_provider)
            .field("weighted_model", &self.weighted_model)
            .field("heuristic_model", &self.heuristic_model)
            .field("use_weighted", &self.use_weighted)
            .field("use_heuristic", &self.use_heuristic)
            .field("discovery_count", &self.discovery_count)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("weighted_timeout_secs", &self.weighted_timeout_secs)
            .field("heuristic_timeout_secs", &self.heuristic_timeout_secs)
            .field("classify_delay_ms", &self.classify_delay_ms)
            .field("collect_delay_ms", &self.collect_delay_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("schedule", &self.schedule)
            .field("schedule_utc_offset_hours", &self.schedule_utc_offset_hours)
            .field("local_region", &self.local_region)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
