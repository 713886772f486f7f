//! Authentication configuration for the agent.

use secrecy::SecretString;
use serde::Deserialize;

/// API key settings.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthSettings {
    /// Shared key expected in the `X-API-KEY` header. When unset the agent
    /// serves requests unauthenticated.
    pub api_key: Option<SecretString>,
}
