//! Telemetry configuration for the agent.
//!
//! This module defines logging, OpenTelemetry and metrics settings.

use serde::Deserialize;

/// Log output format.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable console output.
    Pretty,
}

/// Telemetry configuration settings.
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    /// Service name for telemetry.
    pub service_name: String,
    /// Default log filter, overridden by `RUST_LOG`.
    pub log_level: String,
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
    /// OTLP endpoint for traces.
    pub otlp_endpoint: Option<String>,
    /// Sampling ratio for traces.
    #[serde(default = "default_sampling")]
    pub sampling_ratio: f64,
    /// Whether to expose Prometheus metrics at `/metrics`.
    #[serde(default = "default_metrics")]
    pub metrics: bool,
}

fn default_sampling() -> f64 {
    1.0
}

fn default_metrics() -> bool {
    true
}
