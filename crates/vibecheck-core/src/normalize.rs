//! Map free-text entity mentions onto canonical registry names.
//!
//! Matching is case-insensitive and bidirectional: a mention matches a
//! variation when either string contains the other. This catches both
//! "OpenAI's GPT-4o mini" (mention contains variation) and "gpt" style
//! truncations (variation contains mention). Registry order decides ties.

use crate::entities::curated_entities;

/// Outcome of normalizing one mention.
///
/// `NotTracked` is an ordinary result: most mentions in provider content are
/// not curated entities and are dropped without logging at warn level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedName {
    Matched(&'static str),
    NotTracked,
}

impl NormalizedName {
    #[must_use]
    pub fn canonical(self) -> Option<&'static str> {
        match self {
            NormalizedName::Matched(name) => Some(name),
            NormalizedName::NotTracked => None,
        }
    }
}

/// Normalize a raw entity mention to its canonical name.
///
/// Blank input never matches; without that guard the empty string would be a
/// substring of every variation and resolve to the first registry entry.
#[must_use]
pub fn normalize_entity_name(raw: &str) -> NormalizedName {
    let needle = raw.trim().to_lowercase();
    if needle.is_empty() {
        return NormalizedName::NotTracked;
    }

    for entity in curated_entities() {
        if needle == entity.name.to_lowercase() {
            return NormalizedName::Matched(entity.name);
        }

        if let Some(variation) = entity
            .variations
            .iter()
            .find(|v| needle.contains(*v) || v.contains(needle.as_str()))
        {
            tracing::trace!(
                raw,
                variation,
                canonical = entity.name,
                "normalizer: matched variation"
            );
            return NormalizedName::Matched(entity.name);
        }
    }

    tracing::debug!(raw, "normalizer: mention is not a tracked entity");
    NormalizedName::NotTracked
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
