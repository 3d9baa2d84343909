//! Recurring story ingest: per-story sentiment series plus community
//! discussion, stored as hourly `sentiment_points`.

use std::collections::HashMap;

use vibecheck_asknews::{AskNewsError, StoryCluster};
use vibecheck_core::{entity_names, normalize_entity_name, NormalizedName};
use vibecheck_db::NewSentimentPoint;

use crate::aggregate::points_from_series;
use crate::error::PipelineError;
use crate::retry::retry_with_backoff;
use crate::stats::{EntityOutcome, ExecutionStats};
use crate::store::IngestBatch;
use crate::transform::{community_sentiment, story_series};
use crate::JobContext;

/// Run one story ingest pass over every curated entity.
///
/// When two stories land in the same hour for one entity, the first one
/// written keeps the bucket.
///
/// # Errors
///
/// Returns [`PipelineError::Storage`] only if entity ids cannot be resolved.
pub async fn run_story_job(ctx: JobContext<'_>) -> Result<ExecutionStats, PipelineError> {
    let names = entity_names();
    let entity_ids = ctx.store.resolve_entity_ids(&names).await?;
    let mut stats = ExecutionStats::default();

    tracing::info!(entities = names.len(), "story job: starting");

    for name in names {
        match ingest_entity_stories(ctx, name, &entity_ids).await {
            Ok(outcome) => stats.record_success(outcome),
            Err(e) => {
                tracing::error!(entity = name, error = %e, "story job: entity failed");
                stats.record_failure(name, &e);
            }
        }
    }

    tracing::info!(
        processed = stats.entities_processed,
        failed = stats.entities_failed,
        stories = stats.records_fetched,
        points = stats.points_stored,
        threads = stats.community_threads,
        "story job: finished"
    );

    Ok(stats)
}

async fn ingest_entity_stories(
    ctx: JobContext<'_>,
    name: &str,
    entity_ids: &HashMap<String, i64>,
) -> Result<EntityOutcome, PipelineError> {
    let stories = retry_with_backoff(&ctx.retry, AskNewsError::is_transient, || {
        ctx.provider.fetch_stories(name, ctx.fetch_limit)
    })
    .await?;

    let mut outcome = EntityOutcome {
        fetched: stories.len(),
        ..EntityOutcome::default()
    };

    // Results come back per queried entity, so this only rejects a query name
    // that has drifted out of the registry.
    let NormalizedName::Matched(canonical) = normalize_entity_name(name) else {
        outcome.not_tracked = stories.len();
        return Ok(outcome);
    };
    let entity_id = *entity_ids
        .get(canonical)
        .ok_or_else(|| PipelineError::EntityNotSeeded(canonical.to_string()))?;

    let (points, threads) = story_points(entity_id, &stories);
    outcome.threads = threads;
    if points.is_empty() {
        return Ok(outcome);
    }

    let persisted = ctx
        .store
        .persist_batch(&IngestBatch {
            entity_id,
            records: Vec::new(),
            points,
        })
        .await?;
    outcome.points = persisted.points_stored;

    Ok(outcome)
}

/// Hourly points for every story, in provider order, and the total number of
/// community threads seen.
fn story_points(entity_id: i64, stories: &[StoryCluster]) -> (Vec<NewSentimentPoint>, usize) {
    let mut points = Vec::new();
    let mut threads = 0usize;

    for story in stories {
        let community = community_sentiment(story.latest_reddit_threads());
        threads += usize::try_from(community.thread_count).unwrap_or(0);

        let series = story_series(story);
        if series.is_empty() {
            tracing::debug!(story = %story.uuid, "story job: story has no usable series");
            continue;
        }
        points.extend(points_from_series(entity_id, &series, community));
    }

    (points, threads)
}
