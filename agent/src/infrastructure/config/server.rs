//! Server configuration for the agent.
//!
//! This module defines HTTP server binding settings.

use serde::Deserialize;

/// Server binding settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}
