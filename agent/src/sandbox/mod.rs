//! Filesystem sandbox for tool file operations.
//!
//! Every path a tool touches goes through [`PathGuard::resolve`], which is
//! the only way to obtain a [`SandboxedPath`].

/// Path containment within the configured root.
pub mod guard;

pub use guard::{PathError, PathGuard, SandboxedPath};
