//! External process execution.
//!
//! Commands are always launched from an explicit argument vector; there is
//! no shell in between, so caller-controlled strings can never be parsed as
//! shell syntax.

/// Bounded subprocess runner.
pub mod runner;

pub use runner::{ProcessError, ProcessResult, ProcessRunner};
