//! Read-model queries used by `vibecheck-server` REST endpoints.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use vibecheck_core::Period;

use crate::entities::EntityRow;
use crate::sentiment_points::SentimentPointRow;
use crate::DbError;

pub const DEFAULT_SENTIMENT_LIMIT: i64 = 100;
pub const MAX_SENTIMENT_LIMIT: i64 = 1000;

/// Filters for one page of an entity's sentiment series.
///
/// `cursor` is the `timestamp` of the last point on the previous page; the
/// next page holds strictly older points.
#[derive(Debug, Clone)]
pub struct SentimentQuery {
    pub period: Period,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub cursor: Option<DateTime<Utc>>,
    pub limit: i64,
}

impl Default for SentimentQuery {
    fn default() -> Self {
        Self {
            period: Period::Daily,
            start: None,
            end: None,
            cursor: None,
            limit: DEFAULT_SENTIMENT_LIMIT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentimentPage {
    pub data: Vec<SentimentPointRow>,
    pub next_cursor: Option<DateTime<Utc>>,
    pub has_more: bool,
}

/// Clamp a requested page size into `[1, MAX_SENTIMENT_LIMIT]`.
#[must_use]
pub fn clamp_sentiment_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_SENTIMENT_LIMIT)
        .clamp(1, MAX_SENTIMENT_LIMIT)
}

/// Returns all tracked entities ordered by name, byte-wise so the order
/// does not depend on the database locale.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_entities(pool: &PgPool) -> Result<Vec<EntityRow>, DbError> {
    let rows = sqlx::query_as::<_, EntityRow>(
        "SELECT id, name, category, created_at \
         FROM entities \
         ORDER BY name COLLATE \"C\" ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetches a single entity by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no entity has that id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_entity(pool: &PgPool, id: i64) -> Result<EntityRow, DbError> {
    sqlx::query_as::<_, EntityRow>(
        "SELECT id, name, category, created_at \
         FROM entities \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the newest daily point for an entity, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_daily_sentiment(
    pool: &PgPool,
    entity_id: i64,
) -> Result<Option<SentimentPointRow>, DbError> {
    let row = sqlx::query_as::<_, SentimentPointRow>(
        "SELECT id, entity_id, bucket_start, period, sentiment_mean, sentiment_min, \
                sentiment_max, sentiment_std, record_count, community_sentiment, \
                community_thread_count, created_at \
         FROM sentiment_points \
         WHERE entity_id = $1 AND period = 'daily' \
         ORDER BY bucket_start DESC \
         LIMIT 1",
    )
    .bind(entity_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns one page of an entity's sentiment series, newest first.
///
/// `query.limit` is clamped into `[1, MAX_SENTIMENT_LIMIT]`. `has_more` is set
/// when the page came back full, and only then is `next_cursor` populated.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the entity does not exist, or
/// [`DbError::Sqlx`] if a query fails.
pub async fn get_sentiment(
    pool: &PgPool,
    entity_id: i64,
    query: &SentimentQuery,
) -> Result<SentimentPage, DbError> {
    get_entity(pool, entity_id).await?;

    let limit = clamp_sentiment_limit(Some(query.limit));

    let data = sqlx::query_as::<_, SentimentPointRow>(
        "SELECT id, entity_id, bucket_start, period, sentiment_mean, sentiment_min, \
                sentiment_max, sentiment_std, record_count, community_sentiment, \
                community_thread_count, created_at \
         FROM sentiment_points \
         WHERE entity_id = $1 \
           AND period = $2 \
           AND ($3::TIMESTAMPTZ IS NULL OR bucket_start >= $3) \
           AND ($4::TIMESTAMPTZ IS NULL OR bucket_start <= $4) \
           AND ($5::TIMESTAMPTZ IS NULL OR bucket_start < $5) \
         ORDER BY bucket_start DESC \
         LIMIT $6",
    )
    .bind(entity_id)
    .bind(query.period.as_str())
    .bind(query.start)
    .bind(query.end)
    .bind(query.cursor)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(page_from_rows(data, limit))
}

fn page_from_rows(data: Vec<SentimentPointRow>, limit: i64) -> SentimentPage {
    let has_more = i64::try_from(data.len()).is_ok_and(|len| len == limit);
    let next_cursor = if has_more {
        data.last().map(|p| p.bucket_start)
    } else {
        None
    };

    SentimentPage {
        data,
        next_cursor,
        has_more,
    }
}
