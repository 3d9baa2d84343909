//! Bucketed sentiment statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use vibecheck_core::Period;
use vibecheck_db::NewSentimentPoint;

use crate::transform::{CandidateRecord, CommunitySentiment};

/// Summary statistics over one bucket's scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std: f64,
    pub count: usize,
}

/// Mean, min, max, and population standard deviation of `values`.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn summarize(values: &[f64]) -> Option<BucketStats> {
    if values.is_empty() {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(BucketStats {
        mean: mean.clamp(-1.0, 1.0),
        min,
        max,
        std: variance.sqrt(),
        count: values.len(),
    })
}

fn to_point(
    entity_id: i64,
    period: Period,
    bucket_start: DateTime<Utc>,
    stats: BucketStats,
    community: CommunitySentiment,
) -> NewSentimentPoint {
    NewSentimentPoint {
        entity_id,
        bucket_start,
        period,
        sentiment_mean: Some(stats.mean),
        sentiment_min: Some(stats.min),
        sentiment_max: Some(stats.max),
        sentiment_std: Some(stats.std),
        record_count: i32::try_from(stats.count).unwrap_or(i32::MAX),
        community_sentiment: community.mean,
        community_thread_count: community.thread_count,
    }
}

/// Daily points for a set of freshly inserted records.
///
/// The hourly series belongs to the story job, whose points carry community
/// sentiment; news records only roll up into daily buckets. Records without
/// a score do not contribute, and a bucket with no scored record yields no
/// point.
#[must_use]
pub fn points_from_records(entity_id: i64, records: &[&CandidateRecord]) -> Vec<NewSentimentPoint> {
    let mut buckets: BTreeMap<DateTime<Utc>, Vec<f64>> = BTreeMap::new();
    for record in records {
        if let Some(score) = record.sentiment_score {
            buckets
                .entry(Period::Daily.bucket_start(record.published_at))
                .or_default()
                .push(score);
        }
    }

    buckets
        .into_iter()
        .filter_map(|(bucket_start, scores)| {
            summarize(&scores).map(|stats| {
                to_point(
                    entity_id,
                    Period::Daily,
                    bucket_start,
                    stats,
                    CommunitySentiment::default(),
                )
            })
        })
        .collect()
}

/// Hourly points for one story's series, each carrying the story's
/// community sentiment.
#[must_use]
pub fn points_from_series(
    entity_id: i64,
    series: &[(DateTime<Utc>, f64)],
    community: CommunitySentiment,
) -> Vec<NewSentimentPoint> {
    let mut buckets: BTreeMap<DateTime<Utc>, Vec<f64>> = BTreeMap::new();
    for (ts, score) in series {
        buckets
            .entry(Period::Hourly.bucket_start(*ts))
            .or_default()
            .push(*score);
    }

    buckets
        .into_iter()
        .filter_map(|(bucket_start, scores)| {
            summarize(&scores)
                .map(|stats| to_point(entity_id, Period::Hourly, bucket_start, stats, community))
        })
        .collect()
}
