//! Error types for the query access layer.
//!
//! Errors are split into backend failures, which are propagated unchanged
//! from the document store, and validation failures, which are raised before
//! a store call is made. A malformed cursor is deliberately absent from this
//! hierarchy: cursors fail open (see [`crate::types::cursor`]).

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all query operations.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Errors raised by the underlying document store.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Errors raised before the store is contacted.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors originating from the document store backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}: {message}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// The store rejected the read for lack of permission.
    #[error("permission denied by {backend_name}: {message}")]
    PermissionDenied {
        backend_name: String,
        message: String,
    },

    /// The store's read quota has been exhausted.
    #[error("quota exceeded on {backend_name}: {message}")]
    QuotaExceeded {
        backend_name: String,
        message: String,
    },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryFailed { message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

/// Errors detected before a query reaches the store.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// An IN filter carries more values than the store accepts.
    #[error("IN filter on '{field}' has {len} values, maximum is {max}")]
    InFilterTooLarge {
        field: String,
        len: usize,
        max: usize,
    },

    /// Chunk size for a chunked lookup must be positive.
    #[error("chunk size must be at least 1, got {chunk_size}")]
    InvalidChunkSize { chunk_size: usize },

    /// A field path contains characters the backend cannot address.
    #[error("invalid field path: '{field}'")]
    InvalidFieldPath { field: String },

    /// The configuration failed validation.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl QueryError {
    /// Returns the HTTP status a request handler should answer with.
    ///
    /// | Error | Status |
    /// |-------|--------|
    /// | any `ValidationError` | 400 |
    /// | `PermissionDenied` | 403 |
    /// | `QuotaExceeded` | 429 |
    /// | `Unavailable`, `ConnectionFailed` | 503 |
    /// | anything else | 500 |
    pub fn status_code(&self) -> u16 {
        match self {
            QueryError::Validation(_) => 400,
            QueryError::Backend(BackendError::PermissionDenied { .. }) => 403,
            QueryError::Backend(BackendError::QuotaExceeded { .. }) => 429,
            QueryError::Backend(
                BackendError::Unavailable { .. } | BackendError::ConnectionFailed { .. },
            ) => 503,
            QueryError::Backend(_) => 500,
        }
    }

    /// Returns true if the error came from the store rather than from input validation.
    pub fn is_backend(&self) -> bool {
        matches!(self, QueryError::Backend(_))
    }
}

/// Result type alias for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Backend(BackendError::Serialization {
            message: err.to_string(),
        })
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for QueryError {
    fn from(err: rusqlite::Error) -> Self {
        QueryError::Backend(BackendError::Internal {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        })
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for QueryError {
    fn from(err: r2d2::Error) -> Self {
        QueryError::Backend(BackendError::ConnectionFailed {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
        })
    }
}
