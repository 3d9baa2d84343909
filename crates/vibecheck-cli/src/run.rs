//! Manual job runs.
//!
//! Goes through the same audited path as the scheduler, so a CLI run shows
//! up in `job_executions` next to scheduled ones.

use vibecheck_core::AppConfig;
use vibecheck_pipeline::{run_audited, IngestRunner, JobKind};

/// Run `kind` once and print its outcome.
///
/// # Errors
///
/// Returns an error if the runner cannot be built or the job run failed. The
/// failure is recorded in the execution log before this returns.
pub(crate) async fn run_job(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    kind: JobKind,
) -> anyhow::Result<()> {
    let runner = IngestRunner::from_app_config(pool.clone(), config)?;

    let run = run_audited(pool, kind.name(), runner.run(kind)).await;

    println!(
        "{} {} in {:.2}s (execution {})",
        kind,
        run.status,
        run.duration_seconds,
        run.execution_id
    );

    match run.result {
        Ok(stats) => {
            println!("{}", serde_json::to_string_pretty(&stats.to_metadata())?);
            for failure in &stats.errors {
                tracing::warn!(entity = %failure.entity, error = %failure.error, "entity failed");
            }
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("{kind} failed: {e}")),
    }
}
