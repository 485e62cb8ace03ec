//! Error types for the gesture engine.
//!
//! Engine code never lets these escape a gesture: the controllers turn every
//! failure into "no commit" plus a visual reset. They exist so the internal
//! steps can use `?` and so degraded paths can be logged with a reason.

use thiserror::Error;

/// Errors raised while reading or computing calendar entry data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid instant: {0}")]
    InvalidInstant(String),

    #[error("Entry end must be after start ({start} .. {end})")]
    InvalidSpan { start: String, end: String },

    #[error("Time arithmetic overflowed while computing {0}")]
    Overflow(&'static str),

    #[error("Invalid settings: {0}")]
    Settings(String),
}

/// Errors raised by a rendered grid surface when it cannot answer a query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("Element {0} is not inside a week grid or day view")]
    MissingContainer(String),

    #[error("Malformed day header label: {0:?}")]
    MalformedHeader(String),

    #[error("Surface query failed: {0}")]
    Query(String),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
