//! WP-CLI configuration for the agent.
//!
//! This module defines how the `wp` binary is located and invoked.

use serde::Deserialize;
use std::time::Duration;

/// WP-CLI invocation settings.
#[derive(Debug, Deserialize, Clone)]
pub struct WordPressSettings {
    /// Name or path of the WP-CLI executable.
    pub cli_binary: String,
    /// Whether to pass `--allow-root`.
    pub allow_root: bool,
    /// Wall-clock limit for a single WP-CLI call, in seconds.
    pub timeout_secs: u64,
    /// Environment variables forwarded from the agent process to WP-CLI.
    pub env_allowlist: Vec<String>,
}

impl WordPressSettings {
    /// The per-call timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
