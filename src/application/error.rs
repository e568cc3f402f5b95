//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomError;

/// Application errors wrap domain errors and add scheduling concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomError),

    #[error("application is not running")]
    Closed,

    #[error("operation cancelled before it was applied")]
    Cancelled,

    #[error("unknown key: {0}")]
    UnknownKey(String),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("invalid layout: {message}")]
    Layout { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
