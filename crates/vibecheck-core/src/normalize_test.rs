use super::*;
use crate::entities::{curated_entities, entity_names};

#[test]
fn every_variation_maps_to_its_own_entity() {
    for entity in curated_entities() {
        for variation in entity.variations {
            assert_eq!(
                normalize_entity_name(variation),
                NormalizedName::Matched(entity.name),
                "{variation:?} should belong to {}",
                entity.name
            );
            assert_eq!(
                normalize_entity_name(&variation.to_uppercase()),
                NormalizedName::Matched(entity.name),
                "upper-cased {variation:?} should belong to {}",
                entity.name
            );
        }
    }
}

#[test]
fn upper_case_variation_matches_like_lower_case() {
    for entity in curated_entities() {
        for variation in entity.variations {
            assert_eq!(
                normalize_entity_name(&variation.to_uppercase()),
                normalize_entity_name(variation),
                "case changed the result for {variation:?}"
            );
        }
    }
}

#[test]
fn canonical_names_are_fixed_points() {
    for name in entity_names() {
        assert_eq!(normalize_entity_name(name), NormalizedName::Matched(name));
    }
}

#[test]
fn normalization_is_idempotent() {
    for entity in curated_entities() {
        for variation in entity.variations {
            if let NormalizedName::Matched(first) = normalize_entity_name(variation) {
                assert_eq!(
                    normalize_entity_name(first),
                    NormalizedName::Matched(first)
                );
            }
        }
    }
}

#[test]
fn mention_containing_a_variation_matches() {
    assert_eq!(
        normalize_entity_name("Anthropic's Claude 3.5 Sonnet"),
        NormalizedName::Matched("Claude")
    );
    assert_eq!(
        normalize_entity_name("OpenAI GPT-4o mini"),
        NormalizedName::Matched("GPT-4o")
    );
}

#[test]
fn mixed_case_and_whitespace_are_ignored() {
    assert_eq!(
        normalize_entity_name("  GitHub Copilot  "),
        NormalizedName::Matched("GitHub Copilot")
    );
    assert_eq!(
        normalize_entity_name("CURSOR IDE"),
        NormalizedName::Matched("Cursor")
    );
}

#[test]
fn unrelated_mention_is_not_tracked() {
    assert_eq!(
        normalize_entity_name("Photoshop"),
        NormalizedName::NotTracked
    );
}

#[test]
fn blank_mention_is_not_tracked() {
    assert_eq!(normalize_entity_name(""), NormalizedName::NotTracked);
    assert_eq!(normalize_entity_name("   "), NormalizedName::NotTracked);
}

#[test]
fn common_mentions_resolve_as_expected() {
    assert_eq!(
        normalize_entity_name("Anthropic's Claude 3 Opus"),
        NormalizedName::Matched("Claude")
    );
    assert_eq!(
        normalize_entity_name("GPT 4o"),
        NormalizedName::Matched("GPT-4o")
    );
    assert_eq!(normalize_entity_name("BERT"), NormalizedName::NotTracked);
}
