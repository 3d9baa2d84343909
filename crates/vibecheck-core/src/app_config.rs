use std::net::SocketAddr;

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

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Comma-separated origin list, or `*` for any origin.
    pub cors_origins: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub asknews_api_key: Option<String>,
    pub asknews_base_url: String,
    pub provider_timeout_secs: u64,
    pub provider_max_attempts: u32,
    pub provider_backoff_base_ms: u64,
    pub provider_backoff_max_ms: u64,
    pub news_interval_secs: u64,
    pub story_interval_secs: u64,
    /// Maximum items requested per entity per provider call.
    pub fetch_limit: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("cors_origins", &self.cors_origins)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "asknews_api_key",
                &self.asknews_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("asknews_base_url", &self.asknews_base_url)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("provider_max_attempts", &self.provider_max_attempts)
            .field("provider_backoff_base_ms", &self.provider_backoff_base_ms)
            .field("provider_backoff_max_ms", &self.provider_backoff_max_ms)
            .field("news_interval_secs", &self.news_interval_secs)
            .field("story_interval_secs", &self.story_interval_secs)
            .field("fetch_limit", &self.fetch_limit)
            .finish()
    }
}
