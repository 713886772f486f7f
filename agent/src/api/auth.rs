//! `X-API-KEY` authentication.

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::infrastructure::audit::{log_audit, AuditEvent};
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use secrecy::{ExposeSecret, SecretString};
use std::net::SocketAddr;
use subtle::ConstantTimeEq;
use tracing::warn;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Checks presented keys against the configured one.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyAuth {
    key: Option<SecretString>,
}

impl ApiKeyAuth {
    /// With `None`, every request is accepted.
    #[must_use]
    pub fn new(key: Option<SecretString>) -> Self {
        // An empty key would accept an empty header.
        let key = key.filter(|k| !k.expose_secret().is_empty());
        Self { key }
    }

    /// Whether a key is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Compares `presented` with the configured key in constant time.
    #[must_use]
    pub fn verify(&self, presented: Option<&str>) -> bool {
        match &self.key {
            None => true,
            Some(expected) => presented.is_some_and(|candidate| {
                candidate
                    .as_bytes()
                    .ct_eq(expected.expose_secret().as_bytes())
                    .into()
            }),
        }
    }
}

/// Middleware rejecting requests without a valid API key.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.auth.is_enabled() {
        warn!("API key not set on server, skipping authentication");
        return next.run(request).await;
    }

    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    if state.auth.verify(presented) {
        return next.run(request).await;
    }

    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.ip().to_string());
    warn!(%remote, "Unauthorized access attempt, invalid API key provided");
    log_audit(&AuditEvent::AccessDenied {
        remote,
        resource: request.uri().path().to_string(),
    });
    ApiError::Unauthorized.into_response()
}
