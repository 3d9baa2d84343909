//! Recurring news ingest: articles per curated entity into `articles` and
//! daily `sentiment_points`.

use std::collections::HashMap;

use chrono::Utc;
use vibecheck_asknews::AskNewsError;
use vibecheck_core::{entity_names, normalize_entity_name, NormalizedName};

use crate::dedup::filter_duplicates;
use crate::error::PipelineError;
use crate::retry::retry_with_backoff;
use crate::stats::{EntityOutcome, ExecutionStats};
use crate::store::IngestBatch;
use crate::transform::{candidate_from_article, CandidateRecord};
use crate::JobContext;

/// Run one news ingest pass over every curated entity.
///
/// Entities are processed in registry order. A failure for one entity is
/// recorded in the returned stats and the run moves on.
///
/// # Errors
///
/// Returns [`PipelineError::Storage`] only if entity ids cannot be resolved,
/// which leaves nothing to process.
pub async fn run_news_job(ctx: JobContext<'_>) -> Result<ExecutionStats, PipelineError> {
    let names = entity_names();
    let entity_ids = ctx.store.resolve_entity_ids(&names).await?;
    let mut stats = ExecutionStats::default();

    tracing::info!(entities = names.len(), "news job: starting");

    for name in names {
        match ingest_entity_news(ctx, name, &entity_ids).await {
            Ok(outcome) => {
                tracing::debug!(
                    entity = name,
                    fetched = outcome.fetched,
                    inserted = outcome.inserted,
                    duplicates = outcome.duplicates,
                    "news job: entity done"
                );
                stats.record_success(outcome);
            }
            Err(e) => {
                tracing::error!(entity = name, error = %e, "news job: entity failed");
                stats.record_failure(name, &e);
            }
        }
    }

    tracing::info!(
        processed = stats.entities_processed,
        failed = stats.entities_failed,
        inserted = stats.records_inserted,
        duplicates = stats.duplicates_skipped,
        points = stats.points_stored,
        "news job: finished"
    );

    Ok(stats)
}

async fn ingest_entity_news(
    ctx: JobContext<'_>,
    name: &str,
    entity_ids: &HashMap<String, i64>,
) -> Result<EntityOutcome, PipelineError> {
    let articles = retry_with_backoff(&ctx.retry, AskNewsError::is_transient, || {
        ctx.provider.fetch_news(name, ctx.fetch_limit)
    })
    .await?;

    let mut outcome = EntityOutcome {
        fetched: articles.len(),
        ..EntityOutcome::default()
    };

    // Results come back per queried entity, so this only rejects a query name
    // that has drifted out of the registry.
    let NormalizedName::Matched(canonical) = normalize_entity_name(name) else {
        tracing::debug!(entity = name, "news job: mention is not tracked");
        outcome.not_tracked = articles.len();
        return Ok(outcome);
    };
    let entity_id = *entity_ids
        .get(canonical)
        .ok_or_else(|| PipelineError::EntityNotSeeded(canonical.to_string()))?;

    let now = Utc::now();
    let candidates: Vec<CandidateRecord> = articles
        .iter()
        .map(|article| candidate_from_article(article, canonical, now))
        .collect();

    let deduped = filter_duplicates(ctx.store, candidates).await?;
    outcome.duplicates = deduped.duplicate_count;
    if deduped.to_insert.is_empty() {
        return Ok(outcome);
    }

    let persisted = ctx
        .store
        .persist_batch(&IngestBatch {
            entity_id,
            records: deduped.to_insert,
            points: Vec::new(),
        })
        .await?;
    outcome.inserted = persisted.records_inserted;
    outcome.points = persisted.points_stored;

    Ok(outcome)
}
