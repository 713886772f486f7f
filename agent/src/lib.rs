//! WordPress Agent - remote task-dispatch service for WordPress sites.
//!
//! This crate receives tool invocation requests over HTTP, validates them
//! against a closed registry of tool schemas, and executes them either
//! through WP-CLI or directly against a sandboxed filesystem root.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// HTTP transport: routes, authentication, rate limiting.
pub mod api;
/// Tool dispatch, outcomes and response normalization.
pub mod dispatch;
/// Infrastructure components (config, server, telemetry, audit).
pub mod infrastructure;
/// External process execution with timeouts.
pub mod process;
/// Filesystem path containment.
pub mod sandbox;
/// Tool names, schemas, registry and handlers.
pub mod tools;
