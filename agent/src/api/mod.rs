//! HTTP API for the agent.
//!
//! `POST /a2a/task` and `GET /a2a/tools` sit behind the rate limiter and the
//! API key check; `GET /health` is open.

pub mod auth;
pub mod error;
pub mod rate_limit;
pub mod state;
pub mod tasks;

pub use error::ApiError;
pub use state::AppState;

use crate::infrastructure::config::CorsSettings;
use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::get,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Builds the full application router.
pub fn router(state: AppState, cors: &CorsSettings) -> Router {
    // route_layer runs the last-added layer first: rate limit, then auth.
    let protected = tasks::routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_requests,
        ));

    Router::new()
        .route("/health", get(tasks::handlers::health_check))
        .merge(protected)
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(settings: &CorsSettings) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if settings.origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = settings
        .origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
