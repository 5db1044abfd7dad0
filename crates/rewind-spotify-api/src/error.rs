use thiserror::Error;

/// Reasons a callback from the authorize endpoint is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization error: {0}")]
    AuthDenied(String),
    #[error("State mismatch: the callback does not belong to a login started here")]
    StateMismatch,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Failed to deserialize response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid request URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
