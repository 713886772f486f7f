//! WP-CLI invocation.
//!
//! Every call is `<binary> --path=<root> [--allow-root] <args...>`, built as
//! an argument vector and handed to the [`ProcessRunner`].

use crate::infrastructure::config::WordPressSettings;
use crate::process::{ProcessResult, ProcessRunner};
use crate::tools::error::ToolError;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Builds an owned argument list from string slices.
pub(crate) fn args<const N: usize>(fixed: [&str; N]) -> Vec<String> {
    fixed.iter().map(ToString::to_string).collect()
}

/// Runs WP-CLI against one WordPress installation.
#[derive(Debug, Clone)]
pub struct WpCli {
    binary: String,
    wp_path: PathBuf,
    allow_root: bool,
    timeout: Duration,
    runner: ProcessRunner,
}

impl WpCli {
    /// Creates a client for the installation at `wp_path`.
    #[must_use]
    pub fn new(settings: &WordPressSettings, wp_path: &Path, runner: ProcessRunner) -> Self {
        Self {
            binary: settings.cli_binary.clone(),
            wp_path: wp_path.to_path_buf(),
            allow_root: settings.allow_root,
            timeout: settings.timeout(),
            runner,
        }
    }

    /// The full argument vector for a subcommand.
    #[must_use]
    pub fn argv(&self, args: Vec<String>) -> Vec<String> {
        let mut argv = Vec::with_capacity(args.len() + 3);
        argv.push(self.binary.clone());
        argv.push(format!("--path={}", self.wp_path.display()));
        if self.allow_root {
            argv.push("--allow-root".to_string());
        }
        argv.extend(args);
        argv
    }

    /// Runs a subcommand and returns its trimmed stdout.
    ///
    /// # Errors
    ///
    /// [`ToolError::Process`] if WP-CLI cannot be launched and
    /// [`ToolError::CommandFailed`] on a non-zero exit or timeout.
    pub async fn run(&self, args: Vec<String>) -> Result<String, ToolError> {
        let argv = self.argv(args);
        debug!(command = ?&argv[1..], "Executing WP-CLI command");
        let result = self.runner.run(&argv, self.timeout).await?;
        if result.truncated {
            warn!("WP-CLI output exceeded the capture limit and was truncated");
        }
        if !result.success() {
            return Err(command_failed(&result));
        }
        Ok(result.stdout_lossy().trim().to_string())
    }

    /// Runs a subcommand that prints JSON and parses the output.
    ///
    /// Empty output yields [`Value::Null`].
    ///
    /// # Errors
    ///
    /// As [`WpCli::run`], plus [`ToolError::CommandFailed`] when the output
    /// is not valid JSON.
    pub async fn run_json(&self, args: Vec<String>) -> Result<Value, ToolError> {
        let stdout = self.run(args).await?;
        if stdout.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&stdout).map_err(|e| {
            warn!("WP-CLI returned malformed JSON: {e}");
            ToolError::CommandFailed {
                exit_code: Some(0),
                stderr: format!("WP-CLI returned malformed JSON: {e}"),
                timed_out: false,
            }
        })
    }
}

fn command_failed(result: &ProcessResult) -> ToolError {
    // WP-CLI sometimes reports errors on stdout.
    let stderr = result.stderr_lossy();
    let detail = if stderr.trim().is_empty() {
        result.stdout_lossy()
    } else {
        stderr
    };
    warn!(
        exit_code = result.exit_code,
        timed_out = result.timed_out,
        "WP-CLI command failed"
    );
    ToolError::CommandFailed {
        exit_code: (!result.timed_out).then_some(result.exit_code),
        stderr: detail.trim().to_string(),
        timed_out: result.timed_out,
    }
}
