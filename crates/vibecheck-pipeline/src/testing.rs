//! In-memory fakes for job-level tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use vibecheck_asknews::{AskNewsError, NewsArticle, StoryCluster};
use vibecheck_core::Period;
use vibecheck_db::{DbError, NewSentimentPoint};

use crate::aggregate::points_from_records;
use crate::provider::NewsProvider;
use crate::store::{IngestBatch, IngestStore, PersistOutcome};
use crate::transform::CandidateRecord;

fn storage_down() -> DbError {
    DbError::Sqlx(sqlx::Error::PoolTimedOut)
}

#[derive(Default)]
struct MemoryState {
    entities: HashMap<String, i64>,
    external_ids: HashSet<String>,
    url_hashes: HashSet<String>,
    articles: Vec<(i64, CandidateRecord)>,
    points: HashMap<(i64, DateTime<Utc>, Period), NewSentimentPoint>,
}

/// [`IngestStore`] with insert-or-ignore semantics over hash maps.
#[derive(Default)]
pub(crate) struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_lookups: AtomicBool,
    fail_resolve: AtomicBool,
}

impl MemoryStore {
    pub(crate) fn with_entities(names: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            for (i, name) in names.iter().enumerate() {
                state
                    .entities
                    .insert((*name).to_string(), i64::try_from(i).unwrap() + 1);
            }
        }
        store
    }

    pub(crate) fn insert_existing(&self, external_id: Option<&str>, url_hash: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(id) = external_id {
            state.external_ids.insert(id.to_string());
        }
        state.url_hashes.insert(url_hash.to_string());
    }

    pub(crate) fn fail_lookups(&self) {
        self.fail_lookups.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_resolve(&self) {
        self.fail_resolve.store(true, Ordering::SeqCst);
    }

    pub(crate) fn entity_id(&self, name: &str) -> i64 {
        self.state.lock().unwrap().entities[name]
    }

    pub(crate) fn article_count_for(&self, entity_id: i64) -> usize {
        self.state
            .lock()
            .unwrap()
            .articles
            .iter()
            .filter(|(id, _)| *id == entity_id)
            .count()
    }

    pub(crate) fn entities_with_articles(&self) -> HashSet<i64> {
        self.state
            .lock()
            .unwrap()
            .articles
            .iter()
            .map(|(id, _)| *id)
            .collect()
    }

    pub(crate) fn points_for(&self, entity_id: i64) -> Vec<NewSentimentPoint> {
        let mut points: Vec<NewSentimentPoint> = self
            .state
            .lock()
            .unwrap()
            .points
            .values()
            .filter(|p| p.entity_id == entity_id)
            .cloned()
            .collect();
        points.sort_by_key(|p| (p.period.as_str(), p.bucket_start));
        points
    }
}

#[async_trait]
impl IngestStore for MemoryStore {
    async fn resolve_entity_ids(&self, names: &[&str]) -> Result<HashMap<String, i64>, DbError> {
        if self.fail_resolve.load(Ordering::SeqCst) {
            return Err(storage_down());
        }
        let state = self.state.lock().unwrap();
        Ok(names
            .iter()
            .filter_map(|n| state.entities.get(*n).map(|id| ((*n).to_string(), *id)))
            .collect())
    }

    async fn external_id_exists(&self, external_id: &str) -> Result<bool, DbError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(storage_down());
        }
        Ok(self.state.lock().unwrap().external_ids.contains(external_id))
    }

    async fn url_hash_exists(&self, url_hash: &str) -> Result<bool, DbError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(storage_down());
        }
        Ok(self.state.lock().unwrap().url_hashes.contains(url_hash))
    }

    async fn persist_batch(&self, batch: &IngestBatch) -> Result<PersistOutcome, DbError> {
        let mut state = self.state.lock().unwrap();
        let mut inserted = Vec::new();

        for record in &batch.records {
            let id_taken = record
                .external_id
                .as_ref()
                .is_some_and(|id| state.external_ids.contains(id));
            if id_taken || state.url_hashes.contains(&record.url_hash) {
                continue;
            }
            if let Some(id) = &record.external_id {
                state.external_ids.insert(id.clone());
            }
            state.url_hashes.insert(record.url_hash.clone());
            state.articles.push((batch.entity_id, record.clone()));
            inserted.push(record);
        }

        let mut points = points_from_records(batch.entity_id, &inserted);
        points.extend(batch.points.iter().cloned());

        let mut points_stored = 0;
        for point in points {
            let key = (point.entity_id, point.bucket_start, point.period);
            if let std::collections::hash_map::Entry::Vacant(slot) = state.points.entry(key) {
                slot.insert(point);
                points_stored += 1;
            }
        }

        Ok(PersistOutcome {
            records_inserted: inserted.len(),
            points_stored,
        })
    }
}

/// [`NewsProvider`] serving canned responses per entity name.
#[derive(Default)]
pub(crate) struct FakeProvider {
    news: HashMap<String, Vec<NewsArticle>>,
    stories: HashMap<String, Vec<StoryCluster>>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub(crate) fn with_news(mut self, entity: &str, articles: Vec<NewsArticle>) -> Self {
        self.news.insert(entity.to_string(), articles);
        self
    }

    pub(crate) fn with_stories(mut self, entity: &str, stories: Vec<StoryCluster>) -> Self {
        self.stories.insert(entity.to_string(), stories);
        self
    }

    pub(crate) fn failing_for(mut self, entity: &str) -> Self {
        self.failing.insert(entity.to_string());
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, entity_name: &str) -> Result<(), AskNewsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(entity_name) {
            return Err(AskNewsError::UnexpectedStatus {
                status: 500,
                url: "/v1/fake".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl NewsProvider for FakeProvider {
    async fn fetch_news(
        &self,
        entity_name: &str,
        _limit: u32,
    ) -> Result<Vec<NewsArticle>, AskNewsError> {
        self.check(entity_name)?;
        Ok(self.news.get(entity_name).cloned().unwrap_or_default())
    }

    async fn fetch_stories(
        &self,
        entity_name: &str,
        _limit: u32,
    ) -> Result<Vec<StoryCluster>, AskNewsError> {
        self.check(entity_name)?;
        Ok(self.stories.get(entity_name).cloned().unwrap_or_default())
    }
}

/// A news article built through the wire format.
pub(crate) fn article(
    id: Option<&str>,
    url: &str,
    pub_date: &str,
    sentiment: serde_json::Value,
) -> NewsArticle {
    serde_json::from_value(serde_json::json!({
        "article_id": id,
        "title": format!("Headline for {url}"),
        "article_url": url,
        "domain_url": "news.example",
        "pub_date": pub_date,
        "sentiment": sentiment,
    }))
    .unwrap()
}

pub(crate) fn story(value: serde_json::Value) -> StoryCluster {
    serde_json::from_value(value).unwrap()
}
