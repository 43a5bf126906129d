//! Error taxonomy for the record store.

use thiserror::Error;

/// Errors that can occur during record store operations. The UI renders every
/// variant in a modal dialog; none of them end the process once it is running.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Bad user input, such as a blank name or an out-of-range age.
    #[error("{0}")]
    Validation(String),

    /// The referenced student id has no row.
    #[error("Student #{0} not found.")]
    NotFound(i64),

    /// Connection or statement failure inside SQLite.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
