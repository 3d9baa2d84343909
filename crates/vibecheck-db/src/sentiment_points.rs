//! Database operations for the `sentiment_points` time series.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::DbError;

/// A row from the `sentiment_points` table.
///
/// `bucket_start` is exposed to API clients as `timestamp`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SentimentPointRow {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub entity_id: i64,
    #[serde(rename = "timestamp")]
    pub bucket_start: DateTime<Utc>,
    pub period: String,
    pub sentiment_mean: Option<f64>,
    pub sentiment_min: Option<f64>,
    pub sentiment_max: Option<f64>,
    pub sentiment_std: Option<f64>,
    pub record_count: i32,
    pub community_sentiment: Option<f64>,
    pub community_thread_count: i32,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

/// Insert payload for one aggregated bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSentimentPoint {
    pub entity_id: i64,
    pub bucket_start: DateTime<Utc>,
    pub period: vibecheck_core::Period,
    pub sentiment_mean: Option<f64>,
    pub sentiment_min: Option<f64>,
    pub sentiment_max: Option<f64>,
    pub sentiment_std: Option<f64>,
    pub record_count: i32,
    pub community_sentiment: Option<f64>,
    pub community_thread_count: i32,
}

/// Inserts a point unless `(entity_id, bucket_start, period)` already exists.
///
/// The first write for a bucket wins. Returns `true` when a row was written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails for any reason other than the
/// bucket uniqueness conflict.
pub async fn insert_sentiment_point_if_absent<'e, E>(
    executor: E,
    point: &NewSentimentPoint,
) -> Result<bool, DbError>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query(
        "INSERT INTO sentiment_points \
             (entity_id, bucket_start, period, sentiment_mean, sentiment_min, \
              sentiment_max, sentiment_std, record_count, community_sentiment, \
              community_thread_count) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (entity_id, bucket_start, period) DO NOTHING",
    )
    .bind(point.entity_id)
    .bind(point.bucket_start)
    .bind(point.period.as_str())
    .bind(point.sentiment_mean)
    .bind(point.sentiment_min)
    .bind(point.sentiment_max)
    .bind(point.sentiment_std)
    .bind(point.record_count)
    .bind(point.community_sentiment)
    .bind(point.community_thread_count)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
