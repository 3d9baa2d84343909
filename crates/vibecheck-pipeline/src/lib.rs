//! Ingestion pipeline: provider polling, normalization, deduplication, and
//! sentiment time-series storage.
//!
//! The two jobs ([`run_news_job`] and [`run_story_job`]) share one shape:
//! resolve entity ids, then process every curated entity independently so a
//! failure for one never aborts the rest.

pub mod aggregate;
pub mod audit;
pub mod dedup;
pub mod error;
pub mod news_job;
pub mod provider;
pub mod retry;
pub mod runner;
pub mod stats;
pub mod store;
pub mod story_job;
pub mod transform;

#[cfg(test)]
pub(crate) mod testing;

pub use audit::{run_audited, AuditedRun};
pub use dedup::{compute_url_hash, filter_duplicates, DedupOutcome};
pub use error::PipelineError;
pub use news_job::run_news_job;
pub use provider::NewsProvider;
pub use retry::{retry_with_backoff, RetryPolicy};
pub use runner::{IngestRunner, JobKind};
pub use stats::{EntityFailure, ExecutionStats};
pub use store::{IngestBatch, IngestStore, PersistOutcome, PgIngestStore};
pub use story_job::run_story_job;
pub use transform::CandidateRecord;

/// Everything a job run needs, borrowed for the duration of the run.
#[derive(Clone, Copy)]
pub struct JobContext<'a> {
    pub provider: &'a dyn NewsProvider,
    pub store: &'a dyn IngestStore,
    pub retry: RetryPolicy,
    /// Maximum items requested per entity per provider call.
    pub fetch_limit: u32,
}
