use crate::app_config::{AppConfig, Environment, HeuristicProvider};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from the current process environment,
/// without reading `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

fn invalid(var: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.into(),
    }
}

/// Parse and validate configuration through `lookup`, so tests can feed a
/// plain `HashMap` instead of mutating the process environment.
#[allow(clippy::too_many_lines)]
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                other => Err(invalid(var, format!("expected a boolean, got {other:?}"))),
            },
        }
    };

    let database_url = optional("DATABASE_URL");
    let env = parse_environment(&or_default("HEATRANK_ENV", "development"))?;
    let bind_addr = parse_addr("HEATRANK_BIND_ADDR", "0.0.0.0:3001")?;
    let log_level = or_default("HEATRANK_LOG_LEVEL", "info");
    let titles_path = optional("HEATRANK_TITLES_PATH").map(PathBuf::from);

    let twitch_client_id = optional("TWITCH_CLIENT_ID");
    let twitch_access_token = optional("TWITCH_ACCESS_TOKEN");
    let openai_api_key = optional("OPENAI_API_KEY");
    let anthropic_api_key = optional("ANTHROPIC_API_KEY");

    let heuristic_provider =
        parse_heuristic_provider(&or_default("HEATRANK_HEURISTIC_PROVIDER", "openai"))?;
    let weighted_model = or_default("HEATRANK_WEIGHTED_MODEL", "gpt-4o-mini");
    let heuristic_model = optional("HEATRANK_HEURISTIC_MODEL")
        .unwrap_or_else(|| heuristic_provider.default_model().to_string());
    let use_weighted = parse_bool("HEATRANK_USE_WEIGHTED", true)?;
    let use_heuristic = parse_bool("HEATRANK_USE_HEURISTIC", true)?;

    let discovery_count = parse_usize("HEATRANK_DISCOVERY_COUNT", "20")?;
    if discovery_count == 0 {
        return Err(invalid("HEATRANK_DISCOVERY_COUNT", "must be at least 1"));
    }
    let user_agent = or_default("HEATRANK_USER_AGENT", "heatrank/0.1 (shooter-heat-ranking)");
    let request_timeout_secs = parse_u64("HEATRANK_REQUEST_TIMEOUT_SECS", "10")?;
    let weighted_timeout_secs = parse_u64("HEATRANK_WEIGHTED_TIMEOUT_SECS", "15")?;
    let heuristic_timeout_secs = parse_u64("HEATRANK_HEURISTIC_TIMEOUT_SECS", "10")?;
    let classify_delay_ms = parse_u64("HEATRANK_CLASSIFY_DELAY_MS", "1500")?;
    let collect_delay_ms = parse_u64("HEATRANK_COLLECT_DELAY_MS", "2000")?;
    let max_retries = parse_u32("HEATRANK_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("HEATRANK_RETRY_BACKOFF_BASE_MS", "500")?;

    let schedule = or_default("HEATRANK_SCHEDULE", "0 0 2 * * *");
    let schedule_utc_offset_hours = or_default("HEATRANK_SCHEDULE_UTC_OFFSET_HOURS", "8")
        .parse::<i32>()
        .map_err(|e| invalid("HEATRANK_SCHEDULE_UTC_OFFSET_HOURS", e.to_string()))?;
    if !(-12..=14).contains(&schedule_utc_offset_hours) {
        return Err(invalid(
            "HEATRANK_SCHEDULE_UTC_OFFSET_HOURS",
            "must be between -12 and 14",
        ));
    }
    let local_region = or_default("HEATRANK_LOCAL_REGION", "Taiwan");

    let db_max_connections = parse_u32("HEATRANK_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("HEATRANK_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("HEATRANK_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        titles_path,
        twitch_client_id,
        twitch_access_token,
        openai_api_key,
        anthropic_api_key,
        heuristic_provider,
        weighted_model,
        heuristic_model,
        use_weighted,
        use_heuristic,
        discovery_count,
        user_agent,
        request_timeout_secs,
        weighted_timeout_secs,
        heuristic_timeout_secs,
        classify_delay_ms,
        collect_delay_ms,
        max_retries,
        retry_backoff_base_ms,
        schedule,
        schedule_utc_offset_hours,
        local_region,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(invalid(
            "HEATRANK_ENV",
            format!("expected development, test, or production; got {other:?}"),
        )),
    }
}

fn parse_heuristic_provider(s: &str) -> Result<HeuristicProvider, ConfigError> {
    match s.to_lowercase().as_str() {
        "openai" => Ok(HeuristicProvider::OpenAi),
        "anthropic" | "claude" => Ok(HeuristicProvider::Anthropic),
        other => Err(invalid(
            "HEATRANK_HEURISTIC_PROVIDER",
            format!("expected openai or anthropic, got {other:?}"),
        )),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
