//! Configuration management for the agent.
//!
//! Settings are layered: built-in defaults for the active profile, then an
//! optional `config/<profile>.toml` file, then `WP_AGENT__*` environment
//! variables. The profile is chosen by `WP_AGENT_ENV`.
//!
//! # Example
//!
//! ```no_run
//! use wp_agent::infrastructure::config::Settings;
//!
//! let settings = Settings::new().expect("Failed to load configuration");
//! ```

pub mod auth;
pub mod limits;
pub mod sandbox;
pub mod server;
pub mod telemetry;
pub mod wordpress;

pub use auth::AuthSettings;
pub use limits::{CorsSettings, LimitSettings};
pub use sandbox::SandboxSettings;
pub use server::ServerSettings;
pub use telemetry::{LogFormat, TelemetrySettings};
pub use wordpress::WordPressSettings;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

/// Environment variable prefix for all settings.
pub const ENV_PREFIX: &str = "WP_AGENT";
/// Legacy variable accepted as the API key when `WP_AGENT__AUTH__API_KEY` is unset.
pub const LEGACY_API_KEY_VAR: &str = "A2A_API_KEY";

/// Deployment profile selecting the default values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Local development: verbose logging.
    Development,
    /// Test runs: sandbox under `/tmp/wordpress`.
    Testing,
    /// Production defaults.
    Production,
}

impl Profile {
    /// Reads the profile from `WP_AGENT_ENV`, defaulting to development.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var("WP_AGENT_ENV")
            .map(|value| Self::parse(&value))
            .unwrap_or(Self::Development)
    }

    /// Parses a profile name; unknown names fall back to development.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "testing" | "test" => Self::Testing,
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    /// Lowercase profile name, also used as the config file stem.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Production => "production",
        }
    }
}

/// Top-level configuration for the agent.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Server settings.
    pub server: ServerSettings,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthSettings,
    /// Sandbox settings.
    pub sandbox: SandboxSettings,
    /// WP-CLI settings.
    pub wordpress: WordPressSettings,
    /// Request and resource limits.
    pub limits: LimitSettings,
    /// Cross-origin settings.
    pub cors: CorsSettings,
    /// Telemetry settings.
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Creates a new settings instance from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be built or deserialized.
    pub fn new() -> Result<Self, ConfigError> {
        let profile = Profile::from_env();
        let mut builder = Self::defaults(profile)?;
        if let Ok(key) = std::env::var(LEGACY_API_KEY_VAR) {
            builder = builder.set_default("auth.api_key", key)?;
        }

        builder
            .add_source(File::with_name(&format!("config/{}", profile.as_str())).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("wordpress.env_allowlist")
                    .with_list_parse_key("cors.origins"),
            )
            .build()?
            .try_deserialize()
    }

    /// Builds settings from profile defaults only, ignoring files and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the defaults cannot be deserialized.
    pub fn from_defaults(profile: Profile) -> Result<Self, ConfigError> {
        Self::defaults(profile)?.build()?.try_deserialize()
    }

    /// Default values for `profile`.
    ///
    /// # Errors
    ///
    /// Returns an error if a default cannot be set.
    pub fn defaults(profile: Profile) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let (sandbox_root, log_level) = match profile {
            Profile::Development => ("/var/www/html", "debug"),
            Profile::Testing => ("/tmp/wordpress", "info"),
            Profile::Production => ("/var/www/html", "info"),
        };

        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("sandbox.root", sandbox_root)?
            .set_default("wordpress.cli_binary", "wp")?
            .set_default("wordpress.allow_root", true)?
            .set_default("wordpress.timeout_secs", 60)?
            .set_default(
                "wordpress.env_allowlist",
                vec!["PATH", "HOME", "LANG", "LC_ALL", "TMPDIR"],
            )?
            .set_default("limits.rate_limit_per_minute", 100)?
            .set_default("limits.max_concurrent_tools", 8)?
            .set_default("limits.max_output_bytes", 1024 * 1024)?
            .set_default("limits.max_read_bytes", 10 * 1024 * 1024)?
            .set_default("limits.stderr_excerpt_chars", 500)?
            .set_default("cors.origins", vec!["*"])?
            .set_default("telemetry.service_name", "wp-agent")?
            .set_default("telemetry.log_level", log_level)?
            .set_default("telemetry.log_format", "json")?
            .set_default("telemetry.sampling_ratio", 1.0)?
            .set_default("telemetry.metrics", true)
    }

    /// The address the HTTP server binds to.
    #[must_use]
    pub fn bind_address(&self) -> BindAddress {
        BindAddress(self.server.host.clone(), self.server.port)
    }
}

/// Helper for strong typing addresses
pub struct BindAddress(pub String, pub u16);

impl BindAddress {
    /// Converts the bind address to a `SocketAddr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the IP address string cannot be parsed.
    pub fn to_socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        let ip = self
            .0
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid IP address '{}': {e}", self.0))?;
        Ok(std::net::SocketAddr::new(ip, self.1))
    }
}
