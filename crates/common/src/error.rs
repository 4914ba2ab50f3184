use thiserror::Error;

/// Top-level error type for webcache operations.
#[derive(Debug, Error)]
pub enum WebCacheError {
    /// The caller passed something that is not an absolute http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The network fetch failed (connection, protocol, non-2xx status).
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The key-value store was unreachable or rejected a command.
    #[error("Store error: {0}")]
    Store(String),

    /// A fetch or store operation exceeded its deadline.
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WebCacheError {
    /// Whether this error is a deadline/cancellation, as opposed to a
    /// hard failure. Callers layering their own retry policy branch on this.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Whether the store (rather than the network fetch) failed.
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// Result type alias for webcache operations.
pub type Result<T> = std::result::Result<T, WebCacheError>;
