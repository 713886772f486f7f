//! Tests for the subprocess runner. These spawn real `/bin/sh` processes.
#![cfg(unix)]

use std::time::{Duration, Instant};
use wp_agent::process::ProcessRunner;

fn runner() -> ProcessRunner {
    ProcessRunner::new(vec!["PATH".to_string()], 64 * 1024)
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(ToString::to_string).collect()
}

fn sh(script: &str) -> Vec<String> {
    argv(&["sh", "-c", script])
}

// =============================================================================
// Exit Status and Capture
// =============================================================================

#[tokio::test]
async fn test_captures_stdout() -> anyhow::Result<()> {
    let result = runner()
        .run(&argv(&["echo", "hello world"]), Duration::from_secs(5))
        .await?;

    assert!(result.success());
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout_lossy(), "hello world\n");
    assert!(result.stderr.is_empty());
    assert!(!result.timed_out);
    Ok(())
}

#[tokio::test]
async fn test_non_zero_exit_is_not_an_error() -> anyhow::Result<()> {
    let result = runner()
        .run(&sh("echo oops >&2; exit 3"), Duration::from_secs(5))
        .await?;

    assert!(!result.success());
    assert_eq!(result.exit_code, 3);
    assert_eq!(result.stderr_lossy(), "oops\n");
    Ok(())
}

#[tokio::test]
async fn test_arguments_are_not_shell_parsed() -> anyhow::Result<()> {
    let result = runner()
        .run(&argv(&["echo", "$(id); rm -rf /"]), Duration::from_secs(5))
        .await?;

    assert_eq!(result.stdout_lossy(), "$(id); rm -rf /\n");
    Ok(())
}

#[tokio::test]
async fn test_environment_is_cleared() -> anyhow::Result<()> {
    std::env::set_var("WP_AGENT_TEST_SECRET", "leak");
    let result = runner().run(&argv(&["env"]), Duration::from_secs(5)).await?;

    let env = result.stdout_lossy();
    assert!(!env.contains("WP_AGENT_TEST_SECRET"));
    for line in env.lines() {
        let key = line.split('=').next().unwrap_or_default();
        // sh may inject PWD/SHLVL, but nothing from the parent besides PATH.
        assert!(
            ["PATH", "PWD", "SHLVL", "_"].contains(&key),
            "unexpected variable {key}"
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_stdin_is_closed() -> anyhow::Result<()> {
    let result = runner().run(&argv(&["cat"]), Duration::from_secs(5)).await?;

    assert!(result.success());
    assert!(result.stdout.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_working_dir() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let canonical = dunce::canonicalize(dir.path())?;
    let result = runner()
        .with_working_dir(&canonical)
        .run(&argv(&["pwd"]), Duration::from_secs(5))
        .await?;

    assert_eq!(result.stdout_lossy().trim(), canonical.to_string_lossy());
    Ok(())
}

#[tokio::test]
async fn test_output_is_truncated_at_limit() -> anyhow::Result<()> {
    let runner = ProcessRunner::new(vec!["PATH".to_string()], 1024);
    let result = runner
        .run(
            &sh("i=0; while [ $i -lt 500 ]; do echo 0123456789; i=$((i+1)); done"),
            Duration::from_secs(10),
        )
        .await?;

    assert!(result.success());
    assert!(result.truncated);
    assert_eq!(result.stdout.len(), 1024);
    Ok(())
}

// =============================================================================
// Timeouts
// =============================================================================

#[tokio::test]
async fn test_timeout_kills_process() -> anyhow::Result<()> {
    let started = Instant::now();
    let result = runner()
        .run(&argv(&["sleep", "30"]), Duration::from_millis(200))
        .await?;

    assert!(result.timed_out);
    assert!(!result.success());
    assert_eq!(result.exit_code, -1);
    assert!(started.elapsed() < Duration::from_secs(5));

    let pid = libc::pid_t::try_from(result.pid.expect("child pid"))?;
    // SAFETY: signal 0 only probes for existence.
    let alive = unsafe { libc::kill(pid, 0) } == 0;
    assert!(!alive, "timed out process {pid} is still running");
    Ok(())
}

#[tokio::test]
async fn test_timeout_keeps_partial_output() -> anyhow::Result<()> {
    let result = runner()
        .run(&sh("echo started; echo warn >&2; sleep 30"), Duration::from_millis(500))
        .await?;

    assert!(result.timed_out);
    assert_eq!(result.stdout_lossy(), "started\n");
    assert_eq!(result.stderr_lossy(), "warn\n");
    Ok(())
}

#[tokio::test]
async fn test_timeout_kills_grandchildren() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let marker = dir.path().join("survived");
    let script = format!("(sleep 1; touch {}) & sleep 30", marker.display());

    let result = runner()
        .run(&sh(&script), Duration::from_millis(200))
        .await?;
    assert!(result.timed_out);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!marker.exists(), "background child outlived the timeout");
    Ok(())
}

#[tokio::test]
async fn test_normal_exit_kills_background_children() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let marker = dir.path().join("survived");
    let script = format!("(sleep 1; touch {}) & echo done", marker.display());

    let started = Instant::now();
    let result = runner().run(&sh(&script), Duration::from_secs(10)).await?;
    assert!(result.success());
    assert!(!result.timed_out);
    assert_eq!(result.stdout_lossy(), "done\n");
    assert!(started.elapsed() < Duration::from_secs(1));

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(!marker.exists(), "background child outlived the command");
    Ok(())
}

#[tokio::test]
async fn test_runner_serves_after_timeout() -> anyhow::Result<()> {
    let runner = runner();
    let slow = runner
        .run(&argv(&["sleep", "30"]), Duration::from_millis(100))
        .await?;
    assert!(slow.timed_out);

    let fast = runner.run(&argv(&["true"]), Duration::from_secs(5)).await?;
    assert!(fast.success());
    Ok(())
}
