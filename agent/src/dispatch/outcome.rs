//! Typed result of a single tool invocation.

use crate::process::ProcessError;
use crate::tools::ToolError;
use serde_json::{Map, Value};
use tracing::error;

/// What happened to one tool request.
///
/// Produced by the dispatcher and consumed only by the response normalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// The tool completed.
    Success {
        /// Tool-specific result data.
        data: Map<String, Value>,
    },
    /// The tool name is not registered.
    UnknownTool {
        /// The name as requested.
        name: String,
    },
    /// An argument was missing, unexpected or malformed.
    ValidationError {
        /// Offending argument.
        field: String,
        /// Human-readable reason.
        reason: String,
    },
    /// An external command failed or timed out.
    ExecutionError {
        /// Exit code, if the command produced one.
        exit_code: Option<i32>,
        /// Diagnostic output; excerpted before it reaches the caller.
        stderr_excerpt: String,
        /// The command was killed after exceeding its timeout.
        timed_out: bool,
    },
    /// A fault inside the agent. The cause is logged, never returned.
    InternalError {
        /// Description of the fault.
        cause: String,
    },
}

impl ExecutionOutcome {
    /// Short label used for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::UnknownTool { .. } => "unknown_tool",
            Self::ValidationError { .. } => "validation_error",
            Self::ExecutionError { .. } => "execution_error",
            Self::InternalError { .. } => "internal_error",
        }
    }

    /// Whether the tool completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<ToolError> for ExecutionOutcome {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::Invalid(e) => Self::ValidationError {
                field: e.field,
                reason: e.reason,
            },
            ToolError::Path { field, source } => Self::ValidationError {
                field: field.to_string(),
                reason: source.to_string(),
            },
            ToolError::CommandFailed {
                exit_code,
                stderr,
                timed_out,
            } => Self::ExecutionError {
                exit_code,
                stderr_excerpt: stderr,
                timed_out,
            },
            ToolError::Process(ProcessError::Spawn { program, source }) => Self::ExecutionError {
                exit_code: None,
                stderr_excerpt: format!("failed to launch {program}: {source}"),
                timed_out: false,
            },
            ToolError::Io(e) => Self::ExecutionError {
                exit_code: None,
                stderr_excerpt: e.to_string(),
                timed_out: false,
            },
            other @ (ToolError::Process(_) | ToolError::Internal(_)) => {
                error!(error = %other, "Tool failed with an internal error");
                Self::InternalError {
                    cause: other.to_string(),
                }
            }
        }
    }
}
