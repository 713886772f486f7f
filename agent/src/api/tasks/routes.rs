//! Task API routes.

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::state::AppState;
use crate::api::tasks::handlers::{execute_task, list_tools};

/// Routes that require authentication and count against the rate limit.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/a2a/task", post(execute_task))
        .route("/a2a/tools", get(list_tools))
}
