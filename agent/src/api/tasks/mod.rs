//! Task API: tool execution and discovery.

pub mod handlers;
pub mod routes;
pub mod types;

pub use routes::routes;
pub use types::{HealthResponse, TaskRequest, ToolDescriptor};
