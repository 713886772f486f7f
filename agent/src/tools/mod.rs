//! Tools the agent can execute.
//!
//! The set of tools is closed: [`ToolName`] enumerates them, and
//! [`ToolRegistry`] pairs each with its argument schema and handler.

/// Shared handler state.
pub mod context;
/// Handler error type.
pub mod error;
mod handlers;
/// Tool names.
pub mod name;
/// Name to schema/handler table.
pub mod registry;
/// Argument schemas and validation.
pub mod schema;
/// WP-CLI client.
pub mod wp_cli;

pub use context::ToolContext;
pub use error::{ToolError, ToolResult};
pub use name::{ToolName, UnknownToolName};
pub use registry::{ToolEntry, ToolHandler, ToolRegistry};
pub use schema::{Format, ParamKind, ParamSpec, ToolArgs, ToolSchema, ValidationError};
pub use wp_cli::WpCli;
