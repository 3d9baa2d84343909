use async_trait::async_trait;
use vibecheck_asknews::{AskNewsClient, AskNewsError, NewsArticle, StoryCluster};

/// Source of news articles and story clusters for one entity at a time.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_news(
        &self,
        entity_name: &str,
        limit: u32,
    ) -> Result<Vec<NewsArticle>, AskNewsError>;

    async fn fetch_stories(
        &self,
        entity_name: &str,
        limit: u32,
    ) -> Result<Vec<StoryCluster>, AskNewsError>;
}

#[async_trait]
impl NewsProvider for AskNewsClient {
    async fn fetch_news(
        &self,
        entity_name: &str,
        limit: u32,
    ) -> Result<Vec<NewsArticle>, AskNewsError> {
        AskNewsClient::fetch_news(self, entity_name, limit).await
    }

    async fn fetch_stories(
        &self,
        entity_name: &str,
        limit: u32,
    ) -> Result<Vec<StoryCluster>, AskNewsError> {
        AskNewsClient::fetch_stories(self, entity_name, limit).await
    }
}
