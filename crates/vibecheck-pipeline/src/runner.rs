//! Entry point shared by the scheduler and the CLI for running one job.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use vibecheck_asknews::AskNewsClient;
use vibecheck_core::AppConfig;

use crate::error::PipelineError;
use crate::news_job::run_news_job;
use crate::provider::NewsProvider;
use crate::retry::RetryPolicy;
use crate::stats::ExecutionStats;
use crate::store::{IngestStore, PgIngestStore};
use crate::story_job::run_story_job;
use crate::JobContext;

/// The recurring ingestion jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    News,
    Stories,
}

impl JobKind {
    pub const ALL: [JobKind; 2] = [JobKind::News, JobKind::Stories];

    /// Name used for scheduler registration and the audit log.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::News => "poll_news",
            Self::Stories => "poll_stories",
        }
    }

    #[must_use]
    pub fn interval(self, config: &AppConfig) -> Duration {
        match self {
            Self::News => Duration::from_secs(config.news_interval_secs),
            Self::Stories => Duration::from_secs(config.story_interval_secs),
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Owns the provider and store a job run borrows.
///
/// The provider is optional so the process can start without an API key;
/// every run then fails with [`PipelineError::ProviderNotConfigured`] and is
/// audited like any other failure.
#[derive(Clone)]
pub struct IngestRunner {
    store: Arc<dyn IngestStore>,
    provider: Option<Arc<dyn NewsProvider>>,
    retry: RetryPolicy,
    fetch_limit: u32,
}

impl IngestRunner {
    #[must_use]
    pub fn new(
        store: Arc<dyn IngestStore>,
        provider: Option<Arc<dyn NewsProvider>>,
        retry: RetryPolicy,
        fetch_limit: u32,
    ) -> Self {
        Self {
            store,
            provider,
            retry,
            fetch_limit,
        }
    }

    /// Builds a runner against Postgres and the AskNews API.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Provider`] if the HTTP client cannot be built
    /// (for example an invalid `ASKNEWS_BASE_URL`).
    pub fn from_app_config(pool: PgPool, config: &AppConfig) -> Result<Self, PipelineError> {
        let provider: Option<Arc<dyn NewsProvider>> = match config.asknews_api_key.as_deref() {
            Some(api_key) => Some(Arc::new(AskNewsClient::with_base_url(
                api_key,
                config.provider_timeout_secs,
                &config.asknews_base_url,
            )?)),
            None => {
                tracing::warn!("ASKNEWS_API_KEY not set; ingestion runs will fail until it is");
                None
            }
        };

        Ok(Self::new(
            Arc::new(PgIngestStore::new(pool)),
            provider,
            RetryPolicy::from_app_config(config),
            config.fetch_limit,
        ))
    }

    /// Run one pass of `kind` to completion.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ProviderNotConfigured`] without an API key,
    /// otherwise whatever the job itself returns.
    pub async fn run(&self, kind: JobKind) -> Result<ExecutionStats, PipelineError> {
        let provider = self
            .provider
            .as_deref()
            .ok_or(PipelineError::ProviderNotConfigured)?;

        let ctx = JobContext {
            provider,
            store: self.store.as_ref(),
            retry: self.retry,
            fetch_limit: self.fetch_limit,
        };

        match kind {
            JobKind::News => run_news_job(ctx).await,
            JobKind::Stories => run_story_job(ctx).await,
        }
    }
}
