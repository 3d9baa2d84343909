use thiserror::Error;
use vibecheck_asknews::AskNewsError;
use vibecheck_db::DbError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("provider error: {0}")]
    Provider(#[from] AskNewsError),

    #[error("storage error: {0}")]
    Storage(#[from] DbError),

    #[error("entity {0} has no row in the entities table")]
    EntityNotSeeded(String),

    #[error("news provider is not configured (ASKNEWS_API_KEY is unset)")]
    ProviderNotConfigured,
}
