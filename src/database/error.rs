//! Statblock store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to serialize statblock: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Statblock not found: {0}")]
    NotFound(String),

    #[error("Invalid statblock: {0}")]
    Invalid(String),
}

impl StoreError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Whether the error is a unique constraint violation, such as a second
    /// insert racing for the same name.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
