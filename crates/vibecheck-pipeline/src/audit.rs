//! Audited execution: every run leaves one `job_executions` row that goes
//! from `running` to `success` or `failure`.

use std::future::Future;
use std::time::Instant;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use vibecheck_core::JobStatus;

use crate::error::PipelineError;
use crate::stats::ExecutionStats;

/// What an audited run reports back to its caller.
#[derive(Debug)]
pub struct AuditedRun {
    pub execution_id: Uuid,
    pub status: JobStatus,
    pub duration_seconds: f64,
    pub result: Result<ExecutionStats, PipelineError>,
}

/// Run `job` between a `running` audit insert and its finalization.
///
/// Audit write failures are logged and otherwise ignored: the job still runs,
/// and its outcome is still returned.
pub async fn run_audited<F>(pool: &PgPool, job_name: &str, job: F) -> AuditedRun
where
    F: Future<Output = Result<ExecutionStats, PipelineError>>,
{
    let execution_id = Uuid::new_v4();
    let timer = Instant::now();

    tracing::info!(%execution_id, job_name, "job execution started");

    let audit_started =
        match vibecheck_db::start_job_execution(pool, execution_id, job_name, Utc::now()).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    %execution_id,
                    job_name,
                    error = %e,
                    "failed to record job start; running without an audit row"
                );
                false
            }
        };

    let result = job.await;
    let duration_seconds = timer.elapsed().as_secs_f64();

    let status = match &result {
        Ok(stats) => {
            tracing::info!(
                %execution_id,
                job_name,
                duration_seconds,
                entities_processed = stats.entities_processed,
                entities_failed = stats.entities_failed,
                records_inserted = stats.records_inserted,
                "job execution completed"
            );
            if audit_started {
                if let Err(e) = vibecheck_db::complete_job_execution(
                    pool,
                    execution_id,
                    duration_seconds,
                    &stats.to_metadata(),
                )
                .await
                {
                    tracing::error!(%execution_id, job_name, error = %e, "failed to record job success");
                }
            }
            JobStatus::Success
        }
        Err(err) => {
            tracing::error!(
                %execution_id,
                job_name,
                duration_seconds,
                error = %err,
                "job execution failed"
            );
            if audit_started {
                if let Err(e) = vibecheck_db::fail_job_execution(
                    pool,
                    execution_id,
                    duration_seconds,
                    &err.to_string(),
                )
                .await
                {
                    tracing::error!(%execution_id, job_name, error = %e, "failed to record job failure");
                }
            }
            JobStatus::Failure
        }
    };

    AuditedRun {
        execution_id,
        status,
        duration_seconds,
        result,
    }
}
