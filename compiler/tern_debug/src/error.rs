//! Error type for debug info emission.

use thiserror::Error;

/// Error raised while mapping types or emitting debug metadata.
///
/// Every failure is fatal for the output being compiled: a partial or
/// wrong-sized debug descriptor is worse than none.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebugInfoError {
    /// The type mapper has no case for this type shape.
    #[error("debug info for type '{ty}' is not yet implemented")]
    NotYetImplemented { ty: String },

    /// The metadata sink refused a node or operand.
    #[error("debug metadata rejected {what}: {reason}")]
    Rejected { what: String, reason: String },

    /// The debug info header was already emitted for this output.
    #[error("debug info header already emitted for this output")]
    HeaderAlreadyEmitted,

    /// A symbol-level node was requested before any compile unit exists.
    #[error("no compile unit in the debug metadata; emit the header first")]
    MissingCompileUnit,

    /// A target triple or data layout string could not be understood.
    #[error("invalid target layout '{layout}': {reason}")]
    InvalidTargetLayout { layout: String, reason: String },
}

/// Result type for debug info operations.
pub type Result<T> = std::result::Result<T, DebugInfoError>;

impl DebugInfoError {
    #[cold]
    pub(crate) fn rejected(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            what: what.into(),
            reason: reason.into(),
        }
    }

    #[cold]
    pub(crate) fn invalid_layout(layout: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTargetLayout {
            layout: layout.to_string(),
            reason: reason.into(),
        }
    }
}
