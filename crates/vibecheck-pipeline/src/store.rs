//! Persistence seam between the jobs and Postgres.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use vibecheck_db::{DbError, NewArticle, NewSentimentPoint};

use crate::aggregate::points_from_records;
use crate::transform::CandidateRecord;

/// Everything written for one entity in one job run.
#[derive(Debug, Clone, Default)]
pub struct IngestBatch {
    pub entity_id: i64,
    /// Deduplicated articles. Hourly and daily points are derived from the
    /// ones that actually get inserted.
    pub records: Vec<CandidateRecord>,
    /// Points computed up front, such as a story's series.
    pub points: Vec<NewSentimentPoint>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistOutcome {
    pub records_inserted: usize,
    pub points_stored: usize,
}

#[async_trait]
pub trait IngestStore: Send + Sync {
    /// Map canonical names to entity ids; unknown names are absent.
    async fn resolve_entity_ids(&self, names: &[&str]) -> Result<HashMap<String, i64>, DbError>;

    async fn external_id_exists(&self, external_id: &str) -> Result<bool, DbError>;

    async fn url_hash_exists(&self, url_hash: &str) -> Result<bool, DbError>;

    /// Write a batch atomically. Conflicting rows are skipped, not errors.
    async fn persist_batch(&self, batch: &IngestBatch) -> Result<PersistOutcome, DbError>;
}

/// [`IngestStore`] backed by the shared connection pool.
#[derive(Clone)]
pub struct PgIngestStore {
    pool: PgPool,
}

impl PgIngestStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IngestStore for PgIngestStore {
    async fn resolve_entity_ids(&self, names: &[&str]) -> Result<HashMap<String, i64>, DbError> {
        vibecheck_db::resolve_entity_ids(&self.pool, names).await
    }

    async fn external_id_exists(&self, external_id: &str) -> Result<bool, DbError> {
        vibecheck_db::external_id_exists(&self.pool, external_id).await
    }

    async fn url_hash_exists(&self, url_hash: &str) -> Result<bool, DbError> {
        vibecheck_db::url_hash_exists(&self.pool, url_hash).await
    }

    async fn persist_batch(&self, batch: &IngestBatch) -> Result<PersistOutcome, DbError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted: Vec<&CandidateRecord> = Vec::with_capacity(batch.records.len());

        for record in &batch.records {
            let article = NewArticle {
                entity_id: batch.entity_id,
                external_id: record.external_id.as_deref(),
                title: &record.title,
                url: &record.url,
                url_hash: &record.url_hash,
                source_name: record.source_name.as_deref(),
                published_at: record.published_at,
                sentiment_score: record.sentiment_score,
            };
            if vibecheck_db::insert_article_if_absent(&mut *tx, &article)
                .await?
                .is_some()
            {
                inserted.push(record);
            }
        }

        let mut points = points_from_records(batch.entity_id, &inserted);
        points.extend(batch.points.iter().cloned());

        let mut points_stored = 0usize;
        for point in &points {
            if vibecheck_db::insert_sentiment_point_if_absent(&mut *tx, point).await? {
                points_stored += 1;
            }
        }

        tx.commit().await?;

        Ok(PersistOutcome {
            records_inserted: inserted.len(),
            points_stored,
        })
    }
}
