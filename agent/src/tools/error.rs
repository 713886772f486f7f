//! Errors raised by tool handlers.

use crate::process::ProcessError;
use crate::sandbox::PathError;
use crate::tools::schema::ValidationError;
use thiserror::Error;

/// Result type of every tool handler.
pub type ToolResult = Result<serde_json::Map<String, serde_json::Value>, ToolError>;

/// Ways a tool invocation can fail after dispatch.
#[derive(Debug, Error)]
pub enum ToolError {
    /// An argument was rejected by the handler itself (for example a file that
    /// does not exist).
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// A path argument failed sandbox resolution.
    #[error("Invalid argument '{field}': {source}")]
    Path {
        /// Name of the path argument.
        field: &'static str,
        /// Why resolution failed.
        #[source]
        source: PathError,
    },

    /// An external command ran but did not succeed.
    #[error("Command failed (exit code {exit_code:?}, timed out: {timed_out}): {stderr}")]
    CommandFailed {
        /// Exit code, `None` when the command never produced one.
        exit_code: Option<i32>,
        /// Diagnostic output of the command.
        stderr: String,
        /// The command was killed after exceeding its timeout.
        timed_out: bool,
    },

    /// The command could not be started or produced unusable output.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A bug in the agent.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Shorthand for a handler-level validation failure.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid(ValidationError::new(field, reason))
    }

    /// Wraps a path resolution failure for `field`.
    #[must_use]
    pub fn path(field: &'static str, source: PathError) -> Self {
        Self::Path { field, source }
    }
}
