use thiserror::Error;

/// Errors returned by the `AskNews` API client.
#[derive(Debug, Error)]
pub enum AskNewsError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the credentials (401 or 403).
    #[error("AskNews rejected the API key (HTTP {status})")]
    Unauthorized { status: u16 },

    /// Any other non-2xx response.
    #[error("AskNews returned HTTP {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl AskNewsError {
    /// Whether a retry has a reasonable chance of succeeding.
    ///
    /// Only timeouts and connection failures qualify. Auth failures, other
    /// HTTP statuses, and malformed bodies will fail the same way again.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            AskNewsError::Http(e) => e.is_timeout() || e.is_connect(),
            AskNewsError::Unauthorized { .. }
            | AskNewsError::UnexpectedStatus { .. }
            | AskNewsError::Deserialize { .. }
            | AskNewsError::InvalidBaseUrl(_) => false,
        }
    }
}
