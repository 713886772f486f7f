//! Request/Response Types for the Task API

use crate::tools::{ToolName, ToolSchema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /a2a/task`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRequest {
    /// Tool to run. Any JSON value is accepted here so that a non-string
    /// name is reported as an unknown tool rather than a malformed body.
    #[serde(default)]
    pub tool: Value,
    /// Tool arguments.
    #[serde(default)]
    pub args: Value,
}

impl TaskRequest {
    /// The requested tool name, or `None` when it is absent or empty.
    ///
    /// `null`, `false`, `0`, blank strings and empty arrays or objects all
    /// count as missing. Other non-string values are rendered as JSON.
    #[must_use]
    pub fn tool_name(&self) -> Option<String> {
        match &self.tool {
            Value::Null | Value::Bool(false) => None,
            Value::String(name) if name.trim().is_empty() => None,
            Value::String(name) => Some(name.clone()),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::Array(items) if items.is_empty() => None,
            Value::Object(map) if map.is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `healthy` while the agent serves.
    pub status: String,
    /// Human-readable status.
    pub message: String,
    /// Time of the check.
    pub timestamp: DateTime<Utc>,
}

/// One entry of `GET /a2a/tools`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    /// Wire name.
    pub name: ToolName,
    /// What the tool does.
    pub description: &'static str,
    /// Accepted arguments.
    pub params: ToolSchema,
}
