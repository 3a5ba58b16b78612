//! Error types for collection operations

use std::fmt;

/// Error raised while resolving, fetching or decoding a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionError {
    /// The base URL or resource path could not be turned into a URL
    InvalidUrl(String),
    /// Transport-level failure (connect, timeout, body read)
    Http(String),
    /// The server answered with a non-success status
    Status { status: u16, url: String },
    /// A record in the response could not be built from its raw JSON
    Decode { index: usize, message: String },
    /// The response body was JSON but neither a list nor a paginated envelope
    UnexpectedShape(String),
    /// Invalid client configuration
    Config(String),
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            CollectionError::Http(msg) => write!(f, "HTTP error: {}", msg),
            CollectionError::Status { status, url } => {
                write!(f, "Request to {} failed with status {}", url, status)
            }
            CollectionError::Decode { index, message } => {
                write!(f, "Failed to decode record #{}: {}", index, message)
            }
            CollectionError::UnexpectedShape(msg) => {
                write!(f, "Unexpected response shape: {}", msg)
            }
            CollectionError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for CollectionError {}

impl From<reqwest::Error> for CollectionError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => CollectionError::Status {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None => CollectionError::Http(e.to_string()),
        }
    }
}

/// Result type alias for collection operations.
pub type CollectionResult<T> = Result<T, CollectionError>;
