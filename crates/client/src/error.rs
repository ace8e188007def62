//! Error types for the catalog source manager and its collaborators.

use thiserror::Error;

/// Errors that can occur when fetching the remote product feed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("product feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed answered with a non-success status code.
    #[error("product feed returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The response body is not a valid product list (missing or
    /// mismatched fields included).
    #[error("product feed body is not a valid product list: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors that can occur in the key-value settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the state file failed.
    #[error("state file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The state file exists but does not hold valid JSON.
    #[error("state file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Errors that can occur when managing the catalog source.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The candidate feed URL is empty or not syntactically a URL.
    #[error("invalid product feed URL {url:?}: {reason}")]
    InvalidUrl {
        /// The rejected input.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Fetching the feed failed; the previously active catalog is kept.
    #[error("refreshing the product feed failed: {0}")]
    Fetch(#[from] FetchError),

    /// A refresh is already outstanding; retry once it completes.
    #[error("a catalog refresh is already in progress")]
    RefreshInProgress,

    /// Persisting the configured URL failed.
    #[error("persisting POS settings failed: {0}")]
    Store(#[from] StoreError),
}
