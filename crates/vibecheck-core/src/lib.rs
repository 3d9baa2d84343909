//! Shared domain types, the curated entity registry, name normalization, and
//! application configuration for the `VibeCheck` workspace.

pub mod app_config;
pub mod config;
pub mod entities;
pub mod normalize;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use entities::{curated_entities, entity_names, TrackedEntity};
pub use normalize::{normalize_entity_name, NormalizedName};
pub use types::{Category, JobStatus, Period};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid category: {0}")]
    InvalidCategory(String),

    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("invalid job status: {0}")]
    InvalidJobStatus(String),
}
