//! Conversion of provider payloads into storage-ready values.
//!
//! Timestamps arrive as RFC 3339 strings, naive ISO strings, or Unix seconds.
//! Sentiment arrives as a score or a categorical label. Everything here is
//! pure; the jobs decide what to do with `None`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use vibecheck_asknews::{NewsArticle, ProviderSentiment, StoryCluster};

use crate::dedup::compute_url_hash;

const POSITIVE_LABEL_SCORE: f64 = 0.5;
const NEGATIVE_LABEL_SCORE: f64 = -0.5;
const NEUTRAL_LABEL_SCORE: f64 = 0.0;

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// A normalized article ready for deduplication and insert.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub entity: &'static str,
    pub external_id: Option<String>,
    pub title: String,
    pub url: String,
    pub url_hash: String,
    pub source_name: Option<String>,
    pub published_at: DateTime<Utc>,
    pub sentiment_score: Option<f64>,
}

/// Community discussion summary for one story.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommunitySentiment {
    pub mean: Option<f64>,
    pub thread_count: i32,
}

/// Parse a provider timestamp as UTC.
///
/// Accepts RFC 3339 (including a `Z` suffix) and naive ISO-8601 forms, which
/// are taken to be UTC already.
#[must_use]
pub fn parse_provider_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Parse a JSON timestamp that may be a string or Unix seconds.
#[must_use]
pub fn timestamp_from_json(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_provider_timestamp(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

/// Map provider sentiment to a score in `[-1, 1]`.
///
/// Scores outside the range and unknown labels become `None`.
#[must_use]
pub fn sentiment_score(sentiment: &ProviderSentiment) -> Option<f64> {
    match sentiment {
        ProviderSentiment::Score(score) => in_range(*score),
        ProviderSentiment::Label(label) => match label.trim().to_lowercase().as_str() {
            "positive" => Some(POSITIVE_LABEL_SCORE),
            "negative" => Some(NEGATIVE_LABEL_SCORE),
            "neutral" => Some(NEUTRAL_LABEL_SCORE),
            _ => None,
        },
    }
}

/// Numeric score from a loosely typed JSON value, if in `[-1, 1]`.
#[must_use]
pub fn score_from_json(value: &Value) -> Option<f64> {
    numeric(value).and_then(in_range)
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn in_range(score: f64) -> Option<f64> {
    (score.is_finite() && (-1.0..=1.0).contains(&score)).then_some(score)
}

/// Build a candidate record from a news article attributed to `entity`.
///
/// A missing or unparseable publication time falls back to `now`.
#[must_use]
pub fn candidate_from_article(
    article: &NewsArticle,
    entity: &'static str,
    now: DateTime<Utc>,
) -> CandidateRecord {
    let published_at = article
        .pub_date
        .as_deref()
        .and_then(parse_provider_timestamp)
        .unwrap_or_else(|| {
            tracing::debug!(
                entity,
                pub_date = article.pub_date.as_deref(),
                "transform: unusable publication time, using now"
            );
            now
        });

    let url = article.article_url.trim().to_string();

    CandidateRecord {
        entity,
        external_id: article
            .article_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        title: article.title.trim().to_string(),
        url_hash: compute_url_hash(&url),
        url,
        source_name: article.domain_url.clone(),
        published_at,
        sentiment_score: article.sentiment.as_ref().and_then(sentiment_score),
    }
}

/// The story's `(timestamp, score)` pairs.
///
/// Pairs with an unparseable timestamp or an out-of-range score are dropped.
/// Extra elements in the longer of the two parallel arrays are ignored.
#[must_use]
pub fn story_series(story: &StoryCluster) -> Vec<(DateTime<Utc>, f64)> {
    story
        .sentiment_timestamps
        .iter()
        .zip(story.sentiment.iter())
        .filter_map(|(ts, score)| {
            let ts = timestamp_from_json(ts);
            let score = score_from_json(score);
            match (ts, score) {
                (Some(ts), Some(score)) => Some((ts, score)),
                _ => {
                    tracing::debug!(
                        story = %story.uuid,
                        "transform: dropping unusable series point"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Average community sentiment across the threads of a story's latest update.
///
/// Each thread contributes its `sentiment`, or failing that its `score`, when
/// it is a number in [-1, 1]. Vote counts and other out-of-range values are
/// ignored. Anything other than a JSON array means no community data.
#[must_use]
pub fn community_sentiment(threads: Option<&Value>) -> CommunitySentiment {
    let Some(Value::Array(threads)) = threads else {
        return CommunitySentiment::default();
    };

    let values: Vec<f64> = threads
        .iter()
        .filter_map(|thread| {
            let sentiment = thread.get("sentiment").and_then(score_from_json);
            sentiment.or_else(|| thread.get("score").and_then(score_from_json))
        })
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let mean = (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64);

    CommunitySentiment {
        mean,
        thread_count: i32::try_from(threads.len()).unwrap_or(i32::MAX),
    }
}
