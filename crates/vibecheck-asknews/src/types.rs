//! Wire types for the `AskNews` news search and stories endpoints.
//!
//! Fields the pipeline does not read are omitted; serde ignores them.
//! Values whose shape varies between responses are kept as
//! [`serde_json::Value`] and interpreted by the caller.

use serde::Deserialize;

/// Envelope for `GET /v1/news/search?return_type=dicts`.
#[derive(Debug, Deserialize)]
pub(crate) struct NewsSearchResponse {
    #[serde(default)]
    pub as_dicts: Option<Vec<NewsArticle>>,
}

/// Envelope for `GET /v1/stories`.
#[derive(Debug, Deserialize)]
pub(crate) struct StoriesResponse {
    #[serde(default)]
    pub stories: Vec<StoryCluster>,
}

/// One article from the news search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub article_id: Option<String>,
    pub title: String,
    pub article_url: String,
    #[serde(default)]
    pub domain_url: Option<String>,
    #[serde(default)]
    pub pub_date: Option<String>,
    #[serde(default)]
    pub sentiment: Option<ProviderSentiment>,
}

/// Article sentiment as sent by the provider: a number on most responses, a
/// categorical label on some.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProviderSentiment {
    Score(f64),
    Label(String),
}

/// A story cluster with its sentiment time series.
///
/// `sentiment` and `sentiment_timestamps` are parallel arrays; elements are
/// kept untyped because the provider mixes numbers, strings, and nulls.
#[derive(Debug, Clone, Deserialize)]
pub struct StoryCluster {
    pub uuid: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub sentiment: Vec<serde_json::Value>,
    #[serde(default)]
    pub sentiment_timestamps: Vec<serde_json::Value>,
    #[serde(default)]
    pub updates: Vec<StoryUpdate>,
}

impl StoryCluster {
    /// Community threads attached to the newest update, if present.
    #[must_use]
    pub fn latest_reddit_threads(&self) -> Option<&serde_json::Value> {
        self.updates.first().and_then(|u| u.reddit_threads.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoryUpdate {
    #[serde(default)]
    pub reddit_threads: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_accepts_integer_float_and_label() {
        let int: ProviderSentiment = serde_json::from_str("1").unwrap();
        let float: ProviderSentiment = serde_json::from_str("-0.25").unwrap();
        let label: ProviderSentiment = serde_json::from_str("\"positive\"").unwrap();

        assert_eq!(int, ProviderSentiment::Score(1.0));
        assert_eq!(float, ProviderSentiment::Score(-0.25));
        assert_eq!(label, ProviderSentiment::Label("positive".to_string()));
    }

    #[test]
    fn story_without_updates_has_no_threads() {
        let story: StoryCluster =
            serde_json::from_value(serde_json::json!({ "uuid": "abc" })).unwrap();
        assert!(story.latest_reddit_threads().is_none());
        assert!(story.sentiment.is_empty());
    }

    #[test]
    fn article_tolerates_missing_optional_fields() {
        let article: NewsArticle = serde_json::from_value(serde_json::json!({
            "title": "Copilot adds agent mode",
            "article_url": "https://news.example/copilot",
            "extra_field": [1, 2, 3]
        }))
        .unwrap();
        assert!(article.article_id.is_none());
        assert!(article.sentiment.is_none());
    }
}
