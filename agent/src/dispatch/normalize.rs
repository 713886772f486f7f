//! Conversion of outcomes into the wire response.

use crate::dispatch::outcome::ExecutionOutcome;
use axum::http::StatusCode;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};
use tracing::error;

/// Absolute paths preceded by start of text, whitespace, a quote or `=`/`:`/`(`.
static ABSOLUTE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(^|[\s'"(=:])(/[A-Za-z0-9._\-]+(?:/[A-Za-z0-9._\-]*)*)"#)
        .expect("absolute path pattern is valid")
});

const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred while executing the tool";
const REDACTED_PATH: &str = "<path>";

/// The JSON body returned for every task request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolResponse {
    /// `{"status":"success","data":{...}}`
    Success {
        /// Tool-specific result data.
        data: Map<String, Value>,
    },
    /// `{"status":"error","message":"..."}`
    Error {
        /// What went wrong.
        message: String,
    },
}

impl ToolResponse {
    /// An error body with `message`.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Maps outcomes to status codes and bodies.
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    stderr_excerpt_chars: usize,
    sandbox_root: Option<PathBuf>,
}

impl ResponseNormalizer {
    /// Creates a normalizer that keeps at most `stderr_excerpt_chars` of
    /// diagnostic output.
    #[must_use]
    pub fn new(stderr_excerpt_chars: usize) -> Self {
        Self {
            stderr_excerpt_chars,
            sandbox_root: None,
        }
    }

    /// Keeps absolute paths under `root` in excerpts; all other absolute
    /// paths are redacted.
    #[must_use]
    pub fn with_sandbox_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.sandbox_root = Some(root.into());
        self
    }

    /// Converts `outcome` into a status code and body. Never fails.
    #[must_use]
    pub fn normalize(&self, outcome: ExecutionOutcome) -> (StatusCode, ToolResponse) {
        match outcome {
            ExecutionOutcome::Success { data } => (StatusCode::OK, ToolResponse::Success { data }),
            ExecutionOutcome::UnknownTool { name } => (
                StatusCode::NOT_FOUND,
                ToolResponse::error(format!("Unknown tool: {name}")),
            ),
            ExecutionOutcome::ValidationError { field, reason } => (
                StatusCode::BAD_REQUEST,
                ToolResponse::error(format!("Invalid argument '{field}': {reason}")),
            ),
            ExecutionOutcome::ExecutionError {
                exit_code,
                stderr_excerpt,
                timed_out,
            } => {
                let headline = match (timed_out, exit_code) {
                    (true, _) => "Tool execution timed out".to_string(),
                    (false, Some(code)) => format!("Tool execution failed (exit code {code})"),
                    (false, None) => "Tool execution failed".to_string(),
                };
                let excerpt = self.excerpt(&stderr_excerpt);
                let message = if excerpt.is_empty() {
                    headline
                } else {
                    format!("{headline}: {excerpt}")
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ToolResponse::error(message),
                )
            }
            ExecutionOutcome::InternalError { cause } => {
                error!(%cause, "Internal error while handling tool request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ToolResponse::error(INTERNAL_ERROR_MESSAGE),
                )
            }
        }
    }

    /// Redacts foreign paths, collapses whitespace and caps the length.
    fn excerpt(&self, text: &str) -> String {
        let redacted = redact_paths(text, self.sandbox_root.as_deref());
        excerpt(&redacted, self.stderr_excerpt_chars)
    }
}

fn redact_paths(text: &str, keep_under: Option<&Path>) -> String {
    ABSOLUTE_PATH
        .replace_all(text, |caps: &Captures<'_>| {
            let path = &caps[2];
            let keep = keep_under.is_some_and(|root| is_under(Path::new(path), root));
            format!("{}{}", &caps[1], if keep { path } else { REDACTED_PATH })
        })
        .into_owned()
}

/// `..` segments could climb back out of `root`, so such paths never count.
fn is_under(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
        && !path
            .components()
            .any(|component| matches!(component, Component::ParentDir))
}

/// Collapses runs of whitespace and truncates to `max_chars` characters,
/// marking truncation with an ellipsis.
#[must_use]
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let mut truncated: String = collapsed.chars().take(max_chars).collect();
    truncated.push('…');
    truncated
}
