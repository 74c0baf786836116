//! Error types for statblock parsing.

use thiserror::Error;

/// Failure to turn a single record into a statblock.
///
/// Missing or malformed optional fields never produce an error; they fall
/// back to the values in [`super::defaults`].
#[derive(Debug, Error)]
pub enum StatblockError {
    /// The input is not valid JSON.
    #[error("Invalid JSON format in monster file: {0}")]
    Parse(#[from] serde_json::Error),

    /// The record has no usable `name`.
    #[error("Monster file missing required \"name\" field")]
    MissingName,

    /// A statblock could not be converted to JSON.
    #[error("Statblock could not be serialized: {0}")]
    Shape(serde_json::Error),
}

impl StatblockError {
    /// Whether this is a record-level validation failure rather than a syntax error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingName | Self::Shape(_))
    }
}

/// Result type alias for statblock parsing.
pub type StatblockResult<T> = Result<T, StatblockError>;
