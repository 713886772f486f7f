//! Task API handlers.

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::api::tasks::types::{HealthResponse, TaskRequest, ToolDescriptor};
use crate::dispatch::{ToolRequest, ToolResponse};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::{Map, json};
use tracing::{Instrument, info_span, warn};
use uuid::Uuid;

/// POST /a2a/task
///
/// Runs one tool and returns its normalized result.
pub async fn execute_task(
    State(state): State<AppState>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("Invalid JSON received: {rejection}");
            return ApiError::InvalidJson.into_response();
        }
    };

    let Some(tool) = request.tool_name() else {
        warn!("Request missing 'tool' field");
        return ApiError::MissingTool.into_response();
    };

    let request_id = Uuid::new_v4();
    let span = info_span!("tool_request", %request_id, %tool);
    let outcome = state
        .dispatcher
        .dispatch(ToolRequest::new(tool, request.args))
        .instrument(span)
        .await;

    let (status, body) = state.normalizer.normalize(outcome);
    (status, Json(body)).into_response()
}

/// GET /a2a/tools
///
/// Lists every tool with its argument schema.
pub async fn list_tools(State(state): State<AppState>) -> Json<ToolResponse> {
    let tools: Vec<ToolDescriptor> = state
        .dispatcher
        .registry()
        .iter()
        .map(|(name, entry)| ToolDescriptor {
            name,
            description: name.description(),
            params: entry.schema.clone(),
        })
        .collect();

    let mut data = Map::new();
    data.insert("tools".into(), json!(tools));
    Json(ToolResponse::Success { data })
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Agent is running".to_string(),
        timestamp: Utc::now(),
    })
}
