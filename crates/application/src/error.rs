//! Application error types

use spyrr_domain::DomainError;
use thiserror::Error;

/// Application-level errors.
///
/// Assertion failures are not errors at this level: they are delivered to
/// the completion callback as values.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The harness was finalized without a controller to invoke.
    #[error("no controller defined")]
    MissingController,
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
