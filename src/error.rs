//! Error types shared by the query, client and share-link layers.

use thiserror::Error;

/// Errors that can occur while talking to the image search API or
/// handling its data.
#[derive(Debug, Error)]
pub enum SiteError {
    /// Request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// Response body did not match the expected record shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Deep link could not be decoded into a share query.
    #[error("malformed share link: {0}")]
    MalformedShareLink(String),

    /// A catalog identifier the backend does not know about.
    #[error("unknown {kind} '{value}'")]
    UnknownValue { kind: &'static str, value: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid timestamp: {0}")]
    Timestamp(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, SiteError>;
