use std::future::Future;

use sqlx::PgPool;
use vibecheck_core::JobStatus;
use vibecheck_pipeline::{run_audited, ExecutionStats, PipelineError};

use super::state::{RunGuard, SchedulerState};

/// Run one scheduled invocation under the audit log and record its outcome.
///
/// `guard` keeps the job marked running until the audit row is finalized and
/// the attempt is recorded.
pub async fn run_tracked<F>(
    pool: &PgPool,
    state: &SchedulerState,
    guard: RunGuard,
    job: F,
) -> JobStatus
where
    F: Future<Output = Result<ExecutionStats, PipelineError>>,
{
    let run = run_audited(pool, guard.job_name(), job).await;
    state.record_finished(guard.job_name(), run.status);
    drop(guard);
    run.status
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::scheduler::{Clock, ManualClock};

    fn state() -> SchedulerState {
        let state = SchedulerState::new(ManualClock::new() as Arc<dyn Clock>);
        state.register("poll_news", Duration::from_secs(900));
        state
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn success_is_audited_and_recorded(pool: PgPool) {
        let state = state();
        let guard = state.try_begin("poll_news").expect("guard");

        let status = run_tracked(&pool, &state, guard, async {
            Ok(ExecutionStats::default())
        })
        .await;

        assert_eq!(status, JobStatus::Success);
        let job = &state.health().jobs["poll_news"];
        assert!(!job.running);
        assert_eq!(job.status, Some(JobStatus::Success));
        assert!(job.last_success_at.is_some());

        let rows = vibecheck_db::list_job_executions(&pool, Some("poll_news"), 5)
            .await
            .expect("executions");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, "success");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn failure_is_audited_and_job_can_run_again(pool: PgPool) {
        let state = state();
        let guard = state.try_begin("poll_news").expect("guard");

        let status = run_tracked(&pool, &state, guard, async {
            Err(PipelineError::ProviderNotConfigured)
        })
        .await;

        assert_eq!(status, JobStatus::Failure);
        let job = &state.health().jobs["poll_news"];
        assert_eq!(job.status, Some(JobStatus::Failure));
        assert!(job.last_attempt_at.is_some());
        assert!(job.last_success_at.is_none());
        assert!(state.try_begin("poll_news").is_some());

        let rows = vibecheck_db::list_job_executions(&pool, Some("poll_news"), 5)
            .await
            .expect("executions");
        assert_eq!(rows[0].status, "failure");
    }
}
