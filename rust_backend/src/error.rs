//! Error types for the visit-log engine.

/// Result type for engine operations
pub type VisitResult<T> = Result<T, VisitError>;

/// Error type for engine operations.
///
/// The aggregation and metrics code is total over its inputs; the only
/// failures it reports are bad configuration supplied by the caller and
/// malformed arguments to the selection helpers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VisitError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
