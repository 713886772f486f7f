use serde::Serialize;
use tracing::{info, info_span};

/// Security-relevant event for the audit channel.
/// Structured for JSON serialization to enable machine-readable audit trails.
#[derive(Debug, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// The agent started serving.
    SystemStartup {
        /// Component that started.
        component: String,
        /// Whether requests require an API key.
        authenticated: bool,
    },
    /// The agent is shutting down.
    SystemShutdown {
        /// Why the agent stopped.
        reason: String,
    },
    /// A request was rejected by the API key check.
    AccessDenied {
        /// Remote address, when known.
        remote: String,
        /// Requested resource.
        resource: String,
    },
    /// A file tool asked for a path outside the sandbox.
    SandboxViolation {
        /// Tool that received the path.
        tool: String,
        /// The caller-supplied path.
        path: String,
    },
    /// A file tool modified a file inside the sandbox.
    FileModified {
        /// Tool that wrote the file.
        tool: String,
        /// The caller-supplied path.
        path: String,
        /// Number of bytes written.
        bytes: usize,
    },
}

/// Logs an audit event to the dedicated audit channel as structured JSON.
/// This uses a specific `target` which can be filtered by the subscriber to redirect to a secure file.
pub fn log_audit(event: &AuditEvent) {
    let span = info_span!(target: "audit", "audit_event");
    let _enter = span.enter();

    let json = serde_json::to_string(event).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"));
    info!(target: "audit", audit_json = %json, "Security Audit Event");
}
