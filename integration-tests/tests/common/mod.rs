//! Shared test utilities for the end-to-end tests.
//!
//! Each [`TestAgent`] owns a temporary directory holding a sandbox root and a
//! fake `wp` executable. The fake answers the WP-CLI subcommands the agent
//! uses and records every invocation, one bracketed argument per element, in
//! `calls.log` next to itself.

#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;
use wp_agent::api::{self, AppState};
use wp_agent::infrastructure::config::{Profile, Settings};

/// API key configured by [`TestAgentBuilder::with_api_key`] callers in tests.
pub const TEST_API_KEY: &str = "test-api-key-0123456789";

const FAKE_WP: &str = r#"#!/bin/sh
STATE="$(dirname "$0")"
for arg in "$@"; do printf '[%s]' "$arg"; done >> "$STATE/calls.log"
echo >> "$STATE/calls.log"

while [ $# -gt 0 ]; do
  case "$1" in
    --path=*|--allow-root) shift ;;
    *) break ;;
  esac
done

case "$1 $2" in
  "cli info") echo '{"php_version":"8.2.12","php_binary_path":"/usr/bin/php8.2"}' ;;
  "cli version") echo 'WP-CLI 2.10.0' ;;
  "core version") echo '6.5.3' ;;
  "post create") echo '42' ;;
  "plugin list") echo '[{"name":"akismet","status":"active","version":"5.3"}]' ;;
  "plugin activate"|"plugin deactivate"|"plugin delete"|"plugin install")
    if [ "$3" = "missing-plugin" ]; then
      echo "Warning: cache at /usr/share/wp-cli/cache" >&2
      echo "Error: The '$3' plugin could not be found." >&2
      exit 1
    fi
    echo "Success: Plugin '$3' $2 complete." ;;
  "theme list")
    if [ "$3" = "--status=active" ]; then
      echo '[{"name":"twentytwentyfour","status":"active"}]'
    else
      echo '[{"name":"twentytwentyfour","status":"active"},{"name":"twentytwentythree","status":"inactive"}]'
    fi ;;
  "theme activate"|"theme delete"|"theme install") echo "Success: Theme '$3' $2 complete." ;;
  "option get")
    if [ "$3" = "slow_option" ]; then sleep 30; fi
    if [ -f "$STATE/option_$3" ]; then cat "$STATE/option_$3"; echo; else echo '"My WordPress Site"'; fi ;;
  "option update")
    printf '%s' "$4" > "$STATE/option_$3"
    echo "Success: Updated '$3' option." ;;
  *)
    echo "Error: '$*' is not a registered wp command." >&2
    exit 1 ;;
esac
"#;

/// Configures a [`TestAgent`].
#[derive(Debug, Default)]
pub struct TestAgentBuilder {
    api_key: Option<String>,
    timeout_secs: Option<u64>,
    rate_limit_per_minute: Option<u32>,
}

impl TestAgentBuilder {
    /// Requires `key` in `X-API-KEY`.
    #[must_use]
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// WP-CLI timeout in seconds.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Requests per minute before 429.
    #[must_use]
    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limit_per_minute = Some(per_minute);
        self
    }

    /// Creates the directories, the fake `wp`, and the router.
    pub fn build(self) -> Result<TestAgent> {
        let dir = TempDir::new()?;
        let root = dir.path().join("site");
        let bin = dir.path().join("bin");
        fs::create_dir_all(&root)?;
        fs::create_dir_all(&bin)?;
        let wp = install_fake_wp(&bin)?;

        let mut settings = Settings::from_defaults(Profile::Testing)?;
        settings.sandbox.root = root.clone();
        settings.wordpress.cli_binary = wp.to_string_lossy().into_owned();
        settings.auth.api_key = self.api_key.map(SecretString::from);
        if let Some(secs) = self.timeout_secs {
            settings.wordpress.timeout_secs = secs;
        }
        if let Some(limit) = self.rate_limit_per_minute {
            settings.limits.rate_limit_per_minute = limit;
        }

        let state = AppState::from_settings(&settings)?;
        let app = api::router(state, &settings.cors);

        Ok(TestAgent {
            _dir: dir,
            root,
            bin,
            app,
        })
    }
}

/// An in-process agent backed by a fake WP-CLI.
pub struct TestAgent {
    _dir: TempDir,
    /// Sandbox root.
    pub root: PathBuf,
    /// Directory holding the fake `wp` and its state.
    pub bin: PathBuf,
    /// The application router.
    pub app: Router,
}

impl TestAgent {
    /// An unauthenticated agent with default limits.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Starts configuring an agent.
    #[must_use]
    pub fn builder() -> TestAgentBuilder {
        TestAgentBuilder::default()
    }

    /// Posts `body` to `/a2a/task` without an API key.
    pub async fn task(&self, body: &Value) -> Result<(StatusCode, Value)> {
        self.task_with_key(body, None).await
    }

    /// Posts `body` to `/a2a/task`, optionally with an API key.
    pub async fn task_with_key(
        &self,
        body: &Value,
        key: Option<&str>,
    ) -> Result<(StatusCode, Value)> {
        self.post_raw("/a2a/task", body.to_string(), key).await
    }

    /// Posts a raw body with a JSON content type.
    pub async fn post_raw(
        &self,
        uri: &str,
        body: String,
        key: Option<&str>,
    ) -> Result<(StatusCode, Value)> {
        let mut request = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = key {
            request = request.header("X-API-KEY", key);
        }
        self.send(request.body(Body::from(body))?).await
    }

    /// Issues a GET request.
    pub async fn get(&self, uri: &str, key: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut request = Request::get(uri);
        if let Some(key) = key {
            request = request.header("X-API-KEY", key);
        }
        self.send(request.body(Body::empty())?).await
    }

    /// Sends `request` through the router and decodes the JSON body.
    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.app.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok((status, body))
    }

    /// Every recorded WP-CLI invocation, oldest first.
    pub fn wp_calls(&self) -> Result<Vec<String>> {
        let log = self.bin.join("calls.log");
        if !log.exists() {
            return Ok(Vec::new());
        }
        Ok(fs::read_to_string(log)?
            .lines()
            .map(ToString::to_string)
            .collect())
    }
}

fn install_fake_wp(bin: &Path) -> Result<PathBuf> {
    let wp = bin.join("wp");
    fs::write(&wp, FAKE_WP)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&wp, fs::Permissions::from_mode(0o755))?;
    }
    Ok(wp)
}
