use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Read `.env` (if present) and then the process environment.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] when `DATABASE_URL` is unset and
/// [`ConfigError::InvalidEnvVar`] for any value that does not parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Same as [`load_app_config`] without touching `.env`.
///
/// # Errors
///
/// See [`load_app_config`].
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
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

    let positive_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        match parse_u64(var, default)? {
            0 => Err(invalid(var, "must be greater than zero".to_string())),
            n => Ok(n),
        }
    };

    let positive_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        match parse_u32(var, default)? {
            0 => Err(invalid(var, "must be greater than zero".to_string())),
            n => Ok(n),
        }
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("VIBECHECK_ENV", "development"))?;

    let bind_addr = parse_addr("VIBECHECK_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("VIBECHECK_LOG_LEVEL", "info");
    let cors_origins = or_default("VIBECHECK_CORS_ORIGINS", "*");

    let db_max_connections = parse_u32("VIBECHECK_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("VIBECHECK_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("VIBECHECK_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let asknews_api_key = lookup("ASKNEWS_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let asknews_base_url = or_default("ASKNEWS_BASE_URL", "https://api.asknews.app");

    let provider_timeout_secs = positive_u64("VIBECHECK_PROVIDER_TIMEOUT_SECS", "30")?;
    let provider_max_attempts = positive_u32("VIBECHECK_PROVIDER_MAX_ATTEMPTS", "3")?;
    let provider_backoff_base_ms = parse_u64("VIBECHECK_PROVIDER_BACKOFF_BASE_MS", "1000")?;
    let provider_backoff_max_ms = parse_u64("VIBECHECK_PROVIDER_BACKOFF_MAX_MS", "16000")?;

    let news_interval_secs = positive_u64("VIBECHECK_NEWS_INTERVAL_SECS", "900")?;
    let story_interval_secs = positive_u64("VIBECHECK_STORY_INTERVAL_SECS", "3600")?;
    let fetch_limit = positive_u32("VIBECHECK_FETCH_LIMIT", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        cors_origins,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        asknews_api_key,
        asknews_base_url,
        provider_timeout_secs,
        provider_max_attempts,
        provider_backoff_base_ms,
        provider_backoff_max_ms,
        news_interval_secs,
        story_interval_secs,
        fetch_limit,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "VIBECHECK_ENV".to_string(),
            reason: format!("unknown environment {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
