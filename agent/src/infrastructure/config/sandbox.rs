//! Sandbox configuration for the agent.
//!
//! This module defines the filesystem root that file tools are confined to.

use serde::Deserialize;
use std::path::PathBuf;

/// Sandbox settings for file tools.
#[derive(Debug, Deserialize, Clone)]
pub struct SandboxSettings {
    /// The WordPress installation directory. All file tool paths are
    /// resolved relative to it, and WP-CLI receives it as `--path`.
    pub root: PathBuf,
}
