use serde::{Deserialize, Serialize};

/// Counters for one job run, stored as the audit row's `metadata`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub entities_processed: usize,
    pub entities_failed: usize,
    pub records_fetched: usize,
    pub records_inserted: usize,
    pub duplicates_skipped: usize,
    pub not_tracked_skipped: usize,
    pub points_stored: usize,
    pub community_threads: usize,
    pub errors: Vec<EntityFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityFailure {
    pub entity: String,
    pub error: String,
}

/// Counters from one successfully processed entity.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EntityOutcome {
    pub fetched: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub not_tracked: usize,
    pub points: usize,
    pub threads: usize,
}

impl ExecutionStats {
    pub(crate) fn record_success(&mut self, outcome: EntityOutcome) {
        self.entities_processed += 1;
        self.records_fetched += outcome.fetched;
        self.records_inserted += outcome.inserted;
        self.duplicates_skipped += outcome.duplicates;
        self.not_tracked_skipped += outcome.not_tracked;
        self.points_stored += outcome.points;
        self.community_threads += outcome.threads;
    }

    pub(crate) fn record_failure(&mut self, entity: &str, error: &impl std::fmt::Display) {
        self.entities_failed += 1;
        self.errors.push(EntityFailure {
            entity: entity.to_string(),
            error: error.to_string(),
        });
    }

    /// Serialized form for the audit log.
    #[must_use]
    pub fn to_metadata(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
