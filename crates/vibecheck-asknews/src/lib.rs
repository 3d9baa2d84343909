pub mod client;
pub mod error;
pub mod types;

pub use client::AskNewsClient;
pub use error::AskNewsError;
pub use types::{NewsArticle, ProviderSentiment, StoryCluster, StoryUpdate};
