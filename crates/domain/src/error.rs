//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur while building expectations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A pattern could not be compiled as a regular expression.
    #[error("invalid pattern /{pattern}/: {reason}")]
    InvalidPattern {
        /// The offending pattern source.
        pattern: String,
        /// Why the pattern was rejected.
        reason: String,
    },
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
