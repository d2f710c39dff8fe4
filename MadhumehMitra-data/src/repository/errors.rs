use std::sync::PoisonError;
use thiserror::Error;

/// Failures from the stores and their backends
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The request cannot be served by this store (e.g. guest identity on a profile store)
    #[error("Validation error: {0}")]
    Validation(String),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// No pooled connection was available
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// A stored value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A mutex guarding in-memory state was poisoned
    #[error("Lock error: {0}")]
    Lock(String),

    /// The backend refused or could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(error: PoisonError<T>) -> Self {
        RepositoryError::Lock(error.to_string())
    }
}
