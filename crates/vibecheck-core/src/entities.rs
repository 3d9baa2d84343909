//! Curated registry of tracked entities.
//!
//! The list is fixed at compile time to keep provider spend predictable.
//! Order matters: [`crate::normalize`] walks this slice front to back and the
//! first matching entity wins.

use crate::types::Category;

/// One curated entity with the surface forms it appears under in news text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedEntity {
    pub name: &'static str,
    pub category: Category,
    /// Lowercase spellings matched by the normalizer.
    pub variations: &'static [&'static str],
}

static CURATED_ENTITIES: [TrackedEntity; 10] = [
    TrackedEntity {
        name: "GPT-4o",
        category: Category::Model,
        variations: &[
            "gpt-4o",
            "gpt 4o",
            "gpt4o",
            "gpt-4 omni",
            "openai gpt-4o",
            "chatgpt-4o",
            "openai's gpt-4o",
            "gpt-4 turbo",
        ],
    },
    TrackedEntity {
        name: "Claude",
        category: Category::Model,
        variations: &[
            "claude",
            "claude ai",
            "anthropic claude",
            "claude 3",
            "claude 3.5",
            "claude sonnet",
            "claude opus",
            "claude haiku",
            "anthropic's claude",
        ],
    },
    TrackedEntity {
        name: "Gemini",
        category: Category::Model,
        variations: &[
            "gemini",
            "google gemini",
            "gemini pro",
            "gemini ultra",
            "gemini advanced",
            "gemini ai",
            "google's gemini",
            "bard gemini",
        ],
    },
    TrackedEntity {
        name: "Llama",
        category: Category::Model,
        variations: &[
            "llama",
            "meta llama",
            "llama 2",
            "llama 3",
            "llama 3.1",
            "llama 3.2",
            "llama 3.3",
            "meta's llama",
            "meta ai llama",
        ],
    },
    TrackedEntity {
        name: "Mistral",
        category: Category::Model,
        variations: &[
            "mistral",
            "mistral ai",
            "mistral 7b",
            "mistral large",
            "mistral medium",
            "mistral small",
            "mixtral",
            "mistral's models",
        ],
    },
    TrackedEntity {
        name: "Cursor",
        category: Category::Tool,
        variations: &[
            "cursor",
            "cursor ai",
            "cursor editor",
            "cursor ide",
            "cursor.sh",
            "cursor.so",
            "anysphere cursor",
        ],
    },
    TrackedEntity {
        name: "Lovable",
        category: Category::Tool,
        variations: &[
            "lovable",
            "lovable.dev",
            "lovable ai",
            "gptengineer",
            "gpt engineer",
            "gpt-engineer",
        ],
    },
    TrackedEntity {
        name: "v0",
        category: Category::Tool,
        variations: &[
            "v0",
            "v0.dev",
            "vercel v0",
            "v0 by vercel",
            "v zero",
            "vercel's v0",
        ],
    },
    TrackedEntity {
        name: "GitHub Copilot",
        category: Category::Tool,
        variations: &[
            "github copilot",
            "copilot",
            "gh copilot",
            "github's copilot",
            "copilot x",
            "copilot chat",
            "microsoft copilot",
        ],
    },
    TrackedEntity {
        name: "Replit",
        category: Category::Tool,
        variations: &[
            "replit",
            "repl.it",
            "replit ai",
            "replit ghostwriter",
            "ghostwriter",
            "replit agent",
        ],
    },
];

/// All curated entities in registry order.
#[must_use]
pub fn curated_entities() -> &'static [TrackedEntity] {
    &CURATED_ENTITIES
}

/// Canonical names in registry order.
#[must_use]
pub fn entity_names() -> Vec<&'static str> {
    CURATED_ENTITIES.iter().map(|e| e.name).collect()
}
