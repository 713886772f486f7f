//! Transport-level request failures.
//!
//! These are rejected before a request reaches the dispatcher. Their bodies
//! use the same `{"status":"error","message":...}` shape as tool errors.

use crate::dispatch::ToolResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// A request rejected by the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body was not a JSON object of the expected shape.
    #[error("Invalid JSON payload")]
    InvalidJson,
    /// The body had no usable `tool` field.
    #[error("Missing 'tool' field in request")]
    MissingTool,
    /// The API key was absent or wrong.
    #[error("Unauthorized: Invalid or missing API Key")]
    Unauthorized,
    /// The client exceeded its request quota.
    #[error("Rate limit exceeded")]
    RateLimited,
}

impl ApiError {
    /// HTTP status for this rejection.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson | Self::MissingTool => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ToolResponse::error(self.to_string());
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingTool.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::Unauthorized.to_string(),
            "Unauthorized: Invalid or missing API Key"
        );
        assert_eq!(
            ApiError::MissingTool.to_string(),
            "Missing 'tool' field in request"
        );
    }
}
