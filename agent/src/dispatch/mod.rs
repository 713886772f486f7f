//! Tool dispatch.
//!
//! A request moves through `Received → Validated → Executed → Responded`:
//! the name is looked up in the [`ToolRegistry`], the arguments are checked
//! against the tool's schema, the handler runs on its own task, and the
//! resulting [`ExecutionOutcome`] is handed to the [`ResponseNormalizer`].
//! Every failure along the way becomes an outcome; nothing escapes as a
//! panic or an error to the transport.

/// Outcome type.
pub mod outcome;
/// Outcome to response conversion.
pub mod normalize;

pub use normalize::{ResponseNormalizer, ToolResponse};
pub use outcome::ExecutionOutcome;

use crate::tools::{ToolArgs, ToolContext, ToolEntry, ToolError, ToolName, ToolRegistry};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// An inbound tool invocation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolRequest {
    /// Wire name of the tool.
    pub tool: String,
    /// Arguments; `null` or absent means none.
    #[serde(default)]
    pub args: Value,
}

impl ToolRequest {
    /// A request for `tool` with `args`.
    pub fn new(tool: impl Into<String>, args: Value) -> Self {
        Self {
            tool: tool.into(),
            args,
        }
    }
}

/// Routes requests to handlers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    context: Arc<ToolContext>,
    permits: Arc<Semaphore>,
}

impl Dispatcher {
    /// Creates a dispatcher running at most `max_concurrent` handlers at once.
    #[must_use]
    pub fn new(registry: ToolRegistry, context: ToolContext, max_concurrent: usize) -> Self {
        Self {
            registry: Arc::new(registry),
            context: Arc::new(context),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// The registry this dispatcher routes through.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Runs one request to completion. Never fails and never panics.
    pub async fn dispatch(&self, request: ToolRequest) -> ExecutionOutcome {
        let started = Instant::now();

        let Some((name, entry)) = self.registry.lookup(&request.tool) else {
            warn!(tool = %request.tool, "Unknown tool requested");
            metrics::counter!(
                "wp_agent_tool_invocations_total",
                "tool" => "unknown",
                "outcome" => "unknown_tool"
            )
            .increment(1);
            return ExecutionOutcome::UnknownTool { name: request.tool };
        };

        let outcome = match validate(entry, request.args) {
            Ok(args) => {
                debug!(tool = %name, "Arguments validated");
                self.execute(name, entry, args).await
            }
            Err(outcome) => outcome,
        };

        let elapsed = started.elapsed();
        info!(
            tool = %name,
            outcome = outcome.kind(),
            elapsed_ms = elapsed.as_millis(),
            "Tool request finished"
        );
        metrics::counter!(
            "wp_agent_tool_invocations_total",
            "tool" => name.as_str(),
            "outcome" => outcome.kind()
        )
        .increment(1);
        metrics::histogram!("wp_agent_tool_duration_seconds", "tool" => name.as_str())
            .record(elapsed.as_secs_f64());

        outcome
    }

    /// Runs the handler on a detached task so a dropped request future does
    /// not abort a subprocess mid-flight, and so a panic stays contained.
    async fn execute(
        &self,
        name: ToolName,
        entry: &ToolEntry,
        args: ToolArgs,
    ) -> ExecutionOutcome {
        let handler = Arc::clone(&entry.handler);
        let context = Arc::clone(&self.context);
        let permits = Arc::clone(&self.permits);

        let task = tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| ToolError::Internal("dispatcher is shutting down".into()))?;
            handler.call(args, &context).await
        });

        match task.await {
            Ok(Ok(data)) => ExecutionOutcome::Success { data },
            Ok(Err(e)) => e.into(),
            Err(join_error) => {
                error!(tool = %name, "Tool handler aborted: {join_error}");
                ExecutionOutcome::InternalError {
                    cause: join_error.to_string(),
                }
            }
        }
    }
}

fn validate(entry: &ToolEntry, args: Value) -> Result<ToolArgs, ExecutionOutcome> {
    let args = match args {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        _ => {
            return Err(ExecutionOutcome::ValidationError {
                field: "args".into(),
                reason: "must be a JSON object".into(),
            })
        }
    };
    entry
        .schema
        .validate(&args)
        .map_err(|e| ExecutionOutcome::ValidationError {
            field: e.field,
            reason: e.reason,
        })
}
