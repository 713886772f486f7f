//! Shared state for request handlers.

use crate::api::auth::ApiKeyAuth;
use crate::api::rate_limit::ClientRateLimiter;
use crate::dispatch::{Dispatcher, ResponseNormalizer};
use crate::infrastructure::config::Settings;
use crate::sandbox::PathError;
use crate::tools::{ToolContext, ToolRegistry};
use std::sync::Arc;

/// Everything the HTTP layer needs, cheap to clone per request.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Routes tool requests.
    pub dispatcher: Arc<Dispatcher>,
    /// Shapes dispatcher outcomes into responses.
    pub normalizer: Arc<ResponseNormalizer>,
    /// API key check.
    pub auth: Arc<ApiKeyAuth>,
    /// Per-client request quota.
    pub limiter: Arc<ClientRateLimiter>,
}

impl AppState {
    /// Builds the production state from settings.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidRoot`] if the sandbox root does not exist.
    pub fn from_settings(settings: &Settings) -> Result<Self, PathError> {
        Self::with_registry(settings, ToolRegistry::builtin())
    }

    /// Builds the state around a caller-supplied registry.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidRoot`] if the sandbox root does not exist.
    pub fn with_registry(settings: &Settings, registry: ToolRegistry) -> Result<Self, PathError> {
        let context = ToolContext::from_settings(settings)?;
        let normalizer = ResponseNormalizer::new(settings.limits.stderr_excerpt_chars)
            .with_sandbox_root(context.guard.root());
        let dispatcher = Dispatcher::new(registry, context, settings.limits.max_concurrent_tools);

        Ok(Self {
            dispatcher: Arc::new(dispatcher),
            normalizer: Arc::new(normalizer),
            auth: Arc::new(ApiKeyAuth::new(settings.auth.api_key.clone())),
            limiter: Arc::new(ClientRateLimiter::per_minute(
                settings.limits.rate_limit_per_minute,
            )),
        })
    }
}
