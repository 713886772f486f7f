//! Request and resource limits for the agent.

use serde::Deserialize;

/// Limits applied by the transport and the dispatcher.
#[derive(Debug, Deserialize, Clone)]
pub struct LimitSettings {
    /// Requests allowed per client address per minute.
    pub rate_limit_per_minute: u32,
    /// Tool executions allowed to run at the same time.
    pub max_concurrent_tools: usize,
    /// Bytes captured per output stream of a subprocess.
    pub max_output_bytes: usize,
    /// Largest file `read_file` will return.
    pub max_read_bytes: u64,
    /// Characters of stderr echoed back in an execution error.
    pub stderr_excerpt_chars: usize,
}

/// Cross-origin settings.
#[derive(Debug, Deserialize, Clone)]
pub struct CorsSettings {
    /// Allowed origins; `*` allows any.
    pub origins: Vec<String>,
}
