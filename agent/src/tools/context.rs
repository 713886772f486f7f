//! Shared, read-only state handed to every tool handler.

use crate::infrastructure::config::Settings;
use crate::process::ProcessRunner;
use crate::sandbox::{PathError, PathGuard};
use crate::tools::wp_cli::WpCli;

/// Everything a handler may use to do its work.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Containment for file tools.
    pub guard: PathGuard,
    /// WP-CLI client bound to the sandbox root.
    pub wp: WpCli,
    /// Largest file `read_file` returns.
    pub max_read_bytes: u64,
}

impl ToolContext {
    /// Builds the context from settings.
    ///
    /// WP-CLI runs from, and is pointed at, the canonical sandbox root.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidRoot`] if the sandbox root does not exist.
    pub fn from_settings(settings: &Settings) -> Result<Self, PathError> {
        let guard = PathGuard::from_settings(&settings.sandbox)?;
        let runner = ProcessRunner::new(
            settings.wordpress.env_allowlist.clone(),
            settings.limits.max_output_bytes,
        )
        .with_working_dir(guard.root());
        let wp = WpCli::new(&settings.wordpress, guard.root(), runner);
        Ok(Self {
            guard,
            wp,
            max_read_bytes: settings.limits.max_read_bytes,
        })
    }
}
