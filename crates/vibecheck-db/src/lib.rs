//! Postgres storage for entities, articles, the sentiment series, and the
//! job execution log.

pub mod articles;
pub mod entities;
pub mod job_executions;
pub mod pool;
pub mod query;
pub mod seed;
pub mod sentiment_points;

use thiserror::Error;

pub use articles::{
    external_id_exists, insert_article_if_absent, list_articles_for_entity, url_hash_exists,
    ArticleRow, NewArticle,
};
pub use entities::{get_entity_by_name, resolve_entity_ids, EntityRow};
pub use job_executions::{
    complete_job_execution, fail_job_execution, list_job_executions, start_job_execution,
    JobExecutionRow,
};
pub use pool::{connect_pool, health_check, ping, run_migrations, PoolConfig};
pub use query::{
    clamp_sentiment_limit, get_entity, get_sentiment, latest_daily_sentiment, list_entities,
    SentimentPage, SentimentQuery, DEFAULT_SENTIMENT_LIMIT, MAX_SENTIMENT_LIMIT,
};
pub use seed::seed_entities;
pub use sentiment_points::{insert_sentiment_point_if_absent, NewSentimentPoint, SentimentPointRow};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,

    /// A guarded status update matched no row.
    #[error("job execution {execution_id} is not in status '{expected_status}'")]
    InvalidExecutionTransition {
        execution_id: uuid::Uuid,
        expected_status: &'static str,
    },

    #[error("invalid stored value in {column}: {value}")]
    InvalidStoredValue { column: &'static str, value: String },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}
