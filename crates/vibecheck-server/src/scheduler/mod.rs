//! Background job scheduler.
//!
//! Registers the recurring ingestion jobs on a [`JobScheduler`]. Each trigger
//! either starts a tracked run on its own task or, when the previous run of
//! the same job is still going, is skipped.

mod execution;
mod state;

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use thiserror::Error;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use vibecheck_core::AppConfig;
use vibecheck_pipeline::{IngestRunner, JobKind};

pub use execution::run_tracked;
pub use state::{Clock, SchedulerState, SystemClock};

#[cfg(test)]
pub(crate) use state::tests::ManualClock;

/// Jobs that must be registered before the server accepts traffic.
pub const REQUIRED_JOBS: [&str; 2] = [JobKind::News.name(), JobKind::Stories.name()];

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("required jobs not registered: {}", .0.join(", "))]
    MissingJobs(Vec<String>),

    #[error(transparent)]
    Cron(#[from] JobSchedulerError),
}

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process.
///
/// # Errors
///
/// Returns [`SchedulerError::Cron`] if a job cannot be created or the
/// scheduler fails to start, and [`SchedulerError::MissingJobs`] if a
/// required job ended up unregistered.
pub async fn build_scheduler(
    pool: PgPool,
    runner: IngestRunner,
    state: SchedulerState,
    config: &AppConfig,
) -> Result<JobScheduler, SchedulerError> {
    let scheduler = JobScheduler::new().await?;
    let runner = Arc::new(runner);

    for kind in JobKind::ALL {
        register_job(
            &scheduler,
            kind,
            kind.interval(config),
            pool.clone(),
            Arc::clone(&runner),
            state.clone(),
        )
        .await?;
    }

    state.verify_registered(&REQUIRED_JOBS)?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Register `kind` to fire every `interval`.
async fn register_job(
    scheduler: &JobScheduler,
    kind: JobKind,
    interval: Duration,
    pool: PgPool,
    runner: Arc<IngestRunner>,
    state: SchedulerState,
) -> Result<(), SchedulerError> {
    let trigger_state = state.clone();
    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let pool = pool.clone();
        let runner = Arc::clone(&runner);
        let state = trigger_state.clone();

        Box::pin(async move {
            trigger(kind, pool, runner, state);
        })
    })?;

    scheduler.add(job).await?;
    state.register(kind.name(), interval);

    tracing::info!(
        job_name = kind.name(),
        interval_secs = interval.as_secs(),
        "scheduler: job registered"
    );
    Ok(())
}

fn trigger(kind: JobKind, pool: PgPool, runner: Arc<IngestRunner>, state: SchedulerState) {
    let Some(guard) = state.try_begin(kind.name()) else {
        tracing::warn!(
            job_name = kind.name(),
            "scheduler: trigger skipped, previous run still in progress or shutting down"
        );
        return;
    };

    tokio::spawn(async move {
        run_tracked(&pool, &state, guard, runner.run(kind)).await;
    });
}
