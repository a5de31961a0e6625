//! Error types for the todo store.

use crate::types::TodoId;
use thiserror::Error;

/// Errors reported by [`TodoState`](crate::TodoState) lookups
///
/// The reducer treats these as no-ops; they exist so direct users of the
/// state can tell a miss from a hit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// No todo with this id
    #[error("Todo with ID {0} not found")]
    NotFound(TodoId),
}

/// Errors from loading [`TodoConfig`](crate::TodoConfig)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable could not be parsed
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },

    /// A parsed value is out of range
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}
