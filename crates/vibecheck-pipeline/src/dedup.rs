//! Two-stage duplicate filter: provider id first, URL content hash second.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::error::PipelineError;
use crate::store::IngestStore;
use crate::transform::CandidateRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupOutcome {
    pub to_insert: Vec<CandidateRecord>,
    pub duplicate_count: usize,
}

/// SHA-256 hex digest of a URL.
#[must_use]
pub fn compute_url_hash(url: &str) -> String {
    format!("{:x}", Sha256::digest(url.as_bytes()))
}

/// Drop candidates already stored or repeated earlier in the same batch.
///
/// The provider id is checked first. A candidate that passes it, or has no id,
/// is then checked by URL hash, which also catches one article republished
/// under a new id.
///
/// # Errors
///
/// Returns [`PipelineError::Storage`] if an existence lookup fails.
pub async fn filter_duplicates(
    lookup: &dyn IngestStore,
    candidates: Vec<CandidateRecord>,
) -> Result<DedupOutcome, PipelineError> {
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut seen_hashes: HashSet<String> = HashSet::new();
    let mut outcome = DedupOutcome::default();

    for candidate in candidates {
        let id_duplicate = match candidate.external_id.as_deref() {
            Some(external_id) => {
                seen_ids.contains(external_id) || lookup.external_id_exists(external_id).await?
            }
            None => false,
        };
        let duplicate = id_duplicate
            || seen_hashes.contains(&candidate.url_hash)
            || lookup.url_hash_exists(&candidate.url_hash).await?;

        if duplicate {
            tracing::debug!(
                entity = candidate.entity,
                external_id = candidate.external_id.as_deref(),
                "dedup: skipping duplicate"
            );
            outcome.duplicate_count += 1;
            continue;
        }

        if let Some(external_id) = &candidate.external_id {
            seen_ids.insert(external_id.clone());
        }
        seen_hashes.insert(candidate.url_hash.clone());
        outcome.to_insert.push(candidate);
    }

    Ok(outcome)
}
