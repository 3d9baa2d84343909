//! Shared scheduler bookkeeping: which jobs exist, which are running, when
//! each last ran, and whether the process is draining for shutdown.
//!
//! One [`SchedulerState`] is created in `main` and cloned into both the cron
//! jobs and the HTTP health handlers.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tokio::sync::{OwnedRwLockReadGuard, RwLock};
use vibecheck_core::JobStatus;

use super::SchedulerError;

/// Source of "now" for liveness checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct JobSlot {
    interval: Duration,
    running: bool,
    last_attempt_at: Option<DateTime<Utc>>,
    last_success_at: Option<DateTime<Utc>>,
    last_status: Option<JobStatus>,
}

struct Inner {
    clock: Arc<dyn Clock>,
    started_at: DateTime<Utc>,
    jobs: Mutex<BTreeMap<String, JobSlot>>,
    shutting_down: AtomicBool,
    // Each running invocation holds a read permit; drain takes the write side.
    in_flight: Arc<RwLock<()>>,
}

#[derive(Clone)]
pub struct SchedulerState {
    inner: Arc<Inner>,
}

/// Proof that an invocation is running. Dropping it clears the job's running
/// flag and releases the drain permit.
#[must_use = "the job is marked running only while the guard is alive"]
pub struct RunGuard {
    state: SchedulerState,
    job_name: String,
    _permit: OwnedRwLockReadGuard<()>,
}

impl RunGuard {
    pub fn job_name(&self) -> &str {
        &self.job_name
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if let Some(slot) = self.state.jobs().get_mut(&self.job_name) {
            slot.running = false;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobHealth {
    /// `running` while an invocation is in flight, otherwise the last outcome.
    pub status: Option<JobStatus>,
    pub running: bool,
    pub interval_seconds: u64,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    /// Seconds since the last attempt finished.
    pub age_seconds: Option<i64>,
    pub overdue: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulerHealth {
    pub healthy: bool,
    pub jobs: BTreeMap<String, JobHealth>,
}

impl SchedulerState {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let started_at = clock.now();
        Self {
            inner: Arc::new(Inner {
                clock,
                started_at,
                jobs: Mutex::new(BTreeMap::new()),
                shutting_down: AtomicBool::new(false),
                in_flight: Arc::new(RwLock::new(())),
            }),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    pub fn register(&self, job_name: &str, interval: Duration) {
        self.jobs().insert(
            job_name.to_string(),
            JobSlot {
                interval,
                running: false,
                last_attempt_at: None,
                last_success_at: None,
                last_status: None,
            },
        );
    }

    /// Fails if any of `required` was never registered.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::MissingJobs`] listing the absent names.
    pub fn verify_registered(&self, required: &[&str]) -> Result<(), SchedulerError> {
        let jobs = self.jobs();
        let missing: Vec<String> = required
            .iter()
            .filter(|name| !jobs.contains_key(**name))
            .map(|name| (*name).to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchedulerError::MissingJobs(missing))
        }
    }

    /// Mark `job_name` running, unless it already is, it is unknown, or
    /// shutdown has begun.
    pub fn try_begin(&self, job_name: &str) -> Option<RunGuard> {
        if self.inner.shutting_down.load(Ordering::SeqCst) {
            return None;
        }

        let mut jobs = self.jobs();
        let slot = jobs.get_mut(job_name)?;
        if slot.running {
            return None;
        }
        let permit = Arc::clone(&self.inner.in_flight).try_read_owned().ok()?;
        slot.running = true;
        drop(jobs);

        Some(RunGuard {
            state: self.clone(),
            job_name: job_name.to_string(),
            _permit: permit,
        })
    }

    pub fn record_finished(&self, job_name: &str, status: JobStatus) {
        let now = self.now();
        if let Some(slot) = self.jobs().get_mut(job_name) {
            slot.last_attempt_at = Some(now);
            if status == JobStatus::Success {
                slot.last_success_at = Some(now);
            }
            slot.last_status = Some(status);
        }
    }

    /// Liveness snapshot. A job is overdue when more than twice its interval
    /// has passed since its last attempt, or since startup if it never ran.
    pub fn health(&self) -> SchedulerHealth {
        let now = self.now();
        let jobs: BTreeMap<String, JobHealth> = self
            .jobs()
            .iter()
            .map(|(name, slot)| {
                let reference = slot.last_attempt_at.unwrap_or(self.inner.started_at);
                let allowed = slot
                    .interval
                    .checked_mul(2)
                    .and_then(|d| TimeDelta::from_std(d).ok())
                    .unwrap_or(TimeDelta::MAX);

                let health = JobHealth {
                    status: if slot.running {
                        Some(JobStatus::Running)
                    } else {
                        slot.last_status
                    },
                    running: slot.running,
                    interval_seconds: slot.interval.as_secs(),
                    last_attempt_at: slot.last_attempt_at,
                    last_success_at: slot.last_success_at,
                    age_seconds: slot.last_attempt_at.map(|at| (now - at).num_seconds()),
                    overdue: now - reference > allowed,
                };
                (name.clone(), health)
            })
            .collect();

        SchedulerHealth {
            healthy: jobs.values().all(|job| !job.overdue),
            jobs,
        }
    }

    /// Stop handing out run guards. Running invocations are unaffected.
    pub fn begin_shutdown(&self) {
        self.inner.shutting_down.store(true, Ordering::SeqCst);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutting_down.load(Ordering::SeqCst)
    }

    /// Wait until every outstanding [`RunGuard`] has been dropped.
    pub async fn drain(&self) {
        self.begin_shutdown();
        let _all_idle = self.inner.in_flight.write().await;
    }

    fn jobs(&self) -> MutexGuard<'_, BTreeMap<String, JobSlot>> {
        self.inner
            .jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
