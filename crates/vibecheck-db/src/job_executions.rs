//! Database operations for the `job_executions` audit log.
//!
//! Rows are inserted as `running` when a scheduled job starts and are
//! finalized exactly once. Both finalizers are guarded on
//! `status = 'running'`, so a second finalization is reported as
//! [`DbError::InvalidExecutionTransition`] instead of overwriting history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `job_executions` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JobExecutionRow {
    #[serde(skip)]
    pub id: i64,
    pub execution_id: Uuid,
    pub job_name: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<f64>,
    pub error_message: Option<String>,
    pub metadata: Option<serde_json::Value>,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

/// Inserts a `running` row for a new execution and returns it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn start_job_execution(
    pool: &PgPool,
    execution_id: Uuid,
    job_name: &str,
    started_at: DateTime<Utc>,
) -> Result<JobExecutionRow, DbError> {
    let row = sqlx::query_as::<_, JobExecutionRow>(
        "INSERT INTO job_executions (execution_id, job_name, status, started_at) \
         VALUES ($1, $2, 'running', $3) \
         RETURNING id, execution_id, job_name, status, started_at, completed_at, \
                   duration_seconds, error_message, metadata, created_at",
    )
    .bind(execution_id)
    .bind(job_name)
    .bind(started_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a running execution as `success` and stores its stats.
///
/// # Errors
///
/// Returns [`DbError::InvalidExecutionTransition`] if the row is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_job_execution(
    pool: &PgPool,
    execution_id: Uuid,
    duration_seconds: f64,
    metadata: &serde_json::Value,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE job_executions \
         SET status = 'success', completed_at = NOW(), duration_seconds = $1, metadata = $2 \
         WHERE execution_id = $3 AND status = 'running'",
    )
    .bind(duration_seconds)
    .bind(metadata)
    .bind(execution_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidExecutionTransition {
            execution_id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a running execution as `failure` with the error text.
///
/// # Errors
///
/// Returns [`DbError::InvalidExecutionTransition`] if the row is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_job_execution(
    pool: &PgPool,
    execution_id: Uuid,
    duration_seconds: f64,
    error_message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE job_executions \
         SET status = 'failure', completed_at = NOW(), duration_seconds = $1, error_message = $2 \
         WHERE execution_id = $3 AND status = 'running'",
    )
    .bind(duration_seconds)
    .bind(error_message)
    .bind(execution_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidExecutionTransition {
            execution_id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Returns the most recent executions, newest first, optionally for one job.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_job_executions(
    pool: &PgPool,
    job_name: Option<&str>,
    limit: i64,
) -> Result<Vec<JobExecutionRow>, DbError> {
    let rows = sqlx::query_as::<_, JobExecutionRow>(
        "SELECT id, execution_id, job_name, status, started_at, completed_at, \
                duration_seconds, error_message, metadata, created_at \
         FROM job_executions \
         WHERE ($1::TEXT IS NULL OR job_name = $1) \
         ORDER BY started_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(job_name)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
