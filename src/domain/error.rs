//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::NodeId;

/// Domain errors represent violations of the tree's rules.
/// These are independent of scheduling and I/O concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("expected exactly one node matching '{selector}', found {matches}")]
    AmbiguousQuery { selector: String, matches: usize },

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("the screen node cannot be removed")]
    CannotRemoveScreen,

    #[error("a Screen cannot be mounted inside the tree")]
    CannotMountScreen,

    #[error("node cannot receive focus: {0}")]
    NotFocusable(NodeId),
}

/// Result type for tree operations.
pub type DomResult<T> = Result<T, DomError>;
