//! Subprocess runner with timeouts and bounded output capture.
//!
//! # Security Considerations
//!
//! - The program and its arguments are passed as discrete `argv` elements
//! - The child environment is cleared and rebuilt from an allow-list
//! - stdin is closed, stdout/stderr capture is capped per stream
//! - On timeout the whole process group is killed and reaped

use parking_lot::Mutex;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long output readers may keep draining after the process is gone.
const DRAIN_GRACE: Duration = Duration::from_millis(500);
const READ_CHUNK: usize = 8 * 1024;

/// Errors that prevent a process from being run at all.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The argument vector was empty.
    #[error("No command provided")]
    EmptyCommand,
    /// The program could not be started.
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// Waiting on the child failed.
    #[error("Failed to wait for process: {0}")]
    Wait(#[source] std::io::Error),
}

/// Captured result of one subprocess invocation.
///
/// A non-zero `exit_code` is not an error at this level; callers decide what
/// it means for their tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Exit code, or `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    /// Captured stdout, possibly partial.
    pub stdout: Vec<u8>,
    /// Captured stderr, possibly partial.
    pub stderr: Vec<u8>,
    /// The process was killed because it exceeded its timeout.
    pub timed_out: bool,
    /// At least one stream exceeded the capture limit.
    pub truncated: bool,
    /// OS process id of the child.
    pub pid: Option<u32>,
}

impl ProcessResult {
    /// Whether the process completed in time with exit code zero.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }

    /// stdout decoded as UTF-8, invalid sequences replaced.
    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// stderr decoded as UTF-8, invalid sequences replaced.
    #[must_use]
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Launches external programs with a cleared environment and a timeout.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    env_allowlist: Vec<String>,
    output_limit: usize,
    working_dir: Option<PathBuf>,
}

impl ProcessRunner {
    /// Creates a runner forwarding only `env_allowlist` and capturing at
    /// most `output_limit` bytes per stream.
    #[must_use]
    pub fn new(env_allowlist: Vec<String>, output_limit: usize) -> Self {
        Self {
            env_allowlist,
            output_limit,
            working_dir: None,
        }
    }

    /// Runs children from `dir` instead of the agent's working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Runs `argv[0]` with `argv[1..]` as arguments and waits at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError`] if `argv` is empty, the program cannot be
    /// spawned, or waiting on it fails. Timeouts and non-zero exits are
    /// reported through [`ProcessResult`].
    pub async fn run(
        &self,
        argv: &[String],
        timeout: Duration,
    ) -> Result<ProcessResult, ProcessError> {
        let (program, args) = argv.split_first().ok_or(ProcessError::EmptyCommand)?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .env_clear()
            .envs(self.forwarded_env())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }
        // Own process group so a timeout also takes down grandchildren.
        #[cfg(unix)]
        cmd.process_group(0);

        let started = Instant::now();
        let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;
        let pid = child.id();

        let stdout = Capture::spawn(child.stdout.take(), self.output_limit);
        let stderr = Capture::spawn(child.stderr.take(), self.output_limit);

        let (exit_code, timed_out) = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(status) => {
                let status = status.map_err(ProcessError::Wait)?;
                // Background children left in the group would outlive the call.
                kill_process_group(pid);
                (status.code().unwrap_or(-1), false)
            }
            Err(_) => {
                warn!(
                    program = %program,
                    ?pid,
                    timeout_ms = timeout.as_millis(),
                    "Process timed out, killing"
                );
                terminate(&mut child).await;
                metrics::counter!("wp_agent_process_timeouts_total").increment(1);
                (-1, true)
            }
        };

        let (stdout, stdout_truncated) = stdout.finish().await;
        let (stderr, stderr_truncated) = stderr.finish().await;

        debug!(
            program = %program,
            exit_code,
            timed_out,
            elapsed_ms = started.elapsed().as_millis(),
            "Process finished"
        );

        Ok(ProcessResult {
            exit_code,
            stdout,
            stderr,
            timed_out,
            truncated: stdout_truncated || stderr_truncated,
            pid,
        })
    }

    fn forwarded_env(&self) -> Vec<(String, OsString)> {
        self.env_allowlist
            .iter()
            .filter_map(|key| std::env::var_os(key).map(|value| (key.clone(), value)))
            .collect()
    }
}

/// Kills the child's process group, then the child itself, and reaps it.
async fn terminate(child: &mut Child) {
    kill_process_group(child.id());
    if let Err(e) = child.kill().await {
        warn!("Failed to kill timed out process: {e}");
    }
}

/// Sends SIGKILL to the group led by `pid`. A group that is already empty
/// is not an error.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pgid) = pid.and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return;
    };
    // SAFETY: killpg only sends a signal. The group id was created for our
    // child and cannot be reused while any member of the group is alive.
    unsafe {
        libc::killpg(pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

#[derive(Default)]
struct CaptureBuffer {
    bytes: Vec<u8>,
    truncated: bool,
}

/// Background reader for one output stream.
///
/// The buffer is shared so bytes read before a timeout survive aborting the
/// reader task.
struct Capture {
    buffer: Arc<Mutex<CaptureBuffer>>,
    task: Option<JoinHandle<()>>,
}

impl Capture {
    fn spawn<R>(reader: Option<R>, limit: usize) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(CaptureBuffer::default()));
        let task = reader.map(|mut reader| {
            let buffer = Arc::clone(&buffer);
            tokio::spawn(async move {
                let mut chunk = vec![0u8; READ_CHUNK];
                loop {
                    match reader.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            // Keep draining past the limit so the child never
                            // blocks on a full pipe.
                            let mut buf = buffer.lock();
                            let room = limit.saturating_sub(buf.bytes.len());
                            if n > room {
                                buf.bytes.extend_from_slice(&chunk[..room]);
                                buf.truncated = true;
                            } else {
                                buf.bytes.extend_from_slice(&chunk[..n]);
                            }
                        }
                    }
                }
            })
        });
        Self { buffer, task }
    }

    async fn finish(self) -> (Vec<u8>, bool) {
        if let Some(mut task) = self.task {
            if tokio::time::timeout(DRAIN_GRACE, &mut task).await.is_err() {
                task.abort();
            }
        }
        let mut buf = self.buffer.lock();
        (std::mem::take(&mut buf.bytes), buf.truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> ProcessRunner {
        ProcessRunner::new(vec!["PATH".to_string()], 64 * 1024)
    }

    #[tokio::test]
    async fn test_empty_argv_is_rejected() {
        let result = runner().run(&[], Duration::from_secs(1)).await;
        assert!(matches!(result, Err(ProcessError::EmptyCommand)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let argv = vec!["definitely-not-a-real-binary-wp-agent".to_string()];
        let result = runner().run(&argv, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(ProcessError::Spawn { .. })));
    }

    #[test]
    fn test_result_helpers() {
        let result = ProcessResult {
            exit_code: 0,
            stdout: b"ok\n".to_vec(),
            stderr: vec![0x80, b'x'],
            timed_out: false,
            truncated: false,
            pid: None,
        };
        assert!(result.success());
        assert_eq!(result.stdout_lossy(), "ok\n");
        assert!(result.stderr_lossy().ends_with('x'));

        let timed_out = ProcessResult {
            timed_out: true,
            ..result
        };
        assert!(!timed_out.success());
    }
}
