/// Audit logging for security events.
pub mod audit;
/// Configuration management for the agent.
pub mod config;
/// HTTP server lifecycle.
pub mod server;
/// Telemetry setup for logging, tracing, and metrics.
pub mod telemetry;
