//! Error types for the domain layer

use thiserror::Error;

/// Result type alias for domain operations
pub type Result<T> = std::result::Result<T, DomainError>;

/// Errors raised while building or parsing entity bodies
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Malformed entity or property identifier
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// A typed value failed its kind-specific validation
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Input of the wrong shape handed to a mutation API
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Wire JSON does not have the expected structure
    #[error("Malformed JSON: {0}")]
    Malformed(String),

    /// Entity JSON carries the `missing` marker
    #[error("Entity is nonexistent: {0}")]
    EntityNotFound(String),
}
