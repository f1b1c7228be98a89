use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("request failed ({status}): {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("invalid header: {0}")]
    Header(String),
    #[error("token error: {0}")]
    Token(String),
}

impl Error {
    /// Whether sending the same request again may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::HttpStatus { status, .. } => status.is_server_error(),
            _ => false,
        }
    }

    /// HTTP status of a rejected response, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
