//! Database operations for the `articles` table.
//!
//! Articles are write-once: there is no update path. Inserts are
//! insert-or-ignore so that a concurrent run racing past the deduplicator
//! results in a skipped row rather than a failed transaction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `articles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: i64,
    pub entity_id: i64,
    pub external_id: Option<String>,
    pub title: String,
    pub url: String,
    pub url_hash: String,
    pub source_name: Option<String>,
    pub published_at: DateTime<Utc>,
    pub sentiment_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a single article.
#[derive(Debug, Clone)]
pub struct NewArticle<'a> {
    pub entity_id: i64,
    pub external_id: Option<&'a str>,
    pub title: &'a str,
    pub url: &'a str,
    pub url_hash: &'a str,
    pub source_name: Option<&'a str>,
    pub published_at: DateTime<Utc>,
    pub sentiment_score: Option<f64>,
}

// ---------------------------------------------------------------------------
// Existence checks
// ---------------------------------------------------------------------------

/// Returns `true` if an article with this provider id is already stored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn external_id_exists(pool: &PgPool, external_id: &str) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM articles WHERE external_id = $1)",
    )
    .bind(external_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Returns `true` if an article with this URL hash is already stored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn url_hash_exists(pool: &PgPool, url_hash: &str) -> Result<bool, DbError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM articles WHERE url_hash = $1)")
            .bind(url_hash)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Inserts an article unless one with the same `external_id` or `url_hash`
/// already exists.
///
/// Returns the new row id, or `None` when the insert was skipped.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails for any reason other than a
/// uniqueness conflict.
pub async fn insert_article_if_absent<'e, E>(
    executor: E,
    article: &NewArticle<'_>,
) -> Result<Option<i64>, DbError>
where
    E: sqlx::PgExecutor<'e>,
{
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO articles \
             (entity_id, external_id, title, url, url_hash, source_name, \
              published_at, sentiment_score) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT DO NOTHING \
         RETURNING id",
    )
    .bind(article.entity_id)
    .bind(article.external_id)
    .bind(article.title)
    .bind(article.url)
    .bind(article.url_hash)
    .bind(article.source_name)
    .bind(article.published_at)
    .bind(article.sentiment_score)
    .fetch_optional(executor)
    .await?;

    Ok(id)
}

/// Returns the most recent articles for an entity, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_articles_for_entity(
    pool: &PgPool,
    entity_id: i64,
    limit: i64,
) -> Result<Vec<ArticleRow>, DbError> {
    let rows = sqlx::query_as::<_, ArticleRow>(
        "SELECT id, entity_id, external_id, title, url, url_hash, source_name, \
                published_at, sentiment_score, created_at \
         FROM articles \
         WHERE entity_id = $1 \
         ORDER BY published_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(entity_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
