#![cfg(unix)]

use std::time::{Duration, Instant};

use tempfile::TempDir;

use agentmcp_core::error::AgentError;
use agentmcp_core::transport::ProcessExecutor;

fn sh(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string()]
}

#[test]
fn captures_stdout_and_runs_in_working_directory() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("marker.txt"), "here").unwrap();

    let output = ProcessExecutor::new()
        .execute(&sh("cat marker.txt; echo warn >&2"), temp.path(), Duration::from_secs(10))
        .unwrap();

    assert_eq!(output.exit_code, 0);
    assert_eq!(output.stdout, "here");
    assert_eq!(output.stderr.trim(), "warn");
}

#[test]
fn passes_extra_environment() {
    let temp = TempDir::new().unwrap();
    let output = ProcessExecutor::new()
        .with_env([("AGENTMCP_TEST_VAR", "value")])
        .execute(&sh("printf %s \"$AGENTMCP_TEST_VAR\""), temp.path(), Duration::from_secs(10))
        .unwrap();
    assert_eq!(output.stdout, "value");
}

#[test]
fn silent_failure_message_has_no_dangling_separator() {
    let temp = TempDir::new().unwrap();
    let err = ProcessExecutor::new()
        .execute(&sh("exit 4"), temp.path(), Duration::from_secs(10))
        .unwrap_err();
    assert_eq!(err.to_string(), "Process exited with code 4");
}

#[test]
fn non_zero_exit_is_process_error() {
    let temp = TempDir::new().unwrap();
    let err = ProcessExecutor::new()
        .execute(&sh("echo partial; echo boom >&2; exit 3"), temp.path(), Duration::from_secs(10))
        .unwrap_err();

    match err {
        AgentError::ProcessExecution {
            exit_code,
            stdout,
            stderr,
        } => {
            assert_eq!(exit_code, 3);
            assert_eq!(stdout.trim(), "partial");
            assert_eq!(stderr.trim(), "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn timeout_kills_process_well_before_it_finishes() {
    let temp = TempDir::new().unwrap();
    let start = Instant::now();
    let err = ProcessExecutor::new()
        .execute(&sh("sleep 5"), temp.path(), Duration::from_secs(1))
        .unwrap_err();

    assert!(matches!(err, AgentError::Timeout { duration } if duration == Duration::from_secs(1)));
    assert!(start.elapsed() < Duration::from_secs(4));
}

#[test]
fn timeout_also_kills_background_children() {
    let temp = TempDir::new().unwrap();
    let err = ProcessExecutor::new()
        .execute(
            &sh("(sleep 2; touch survived) & wait"),
            temp.path(),
            Duration::from_secs(1),
        )
        .unwrap_err();
    assert!(matches!(err, AgentError::Timeout { .. }));

    std::thread::sleep(Duration::from_secs(3));
    assert!(!temp.path().join("survived").exists());
}

#[test]
fn missing_binary_is_executable_not_found() {
    let temp = TempDir::new().unwrap();
    let command = vec!["agentmcp-no-such-binary".to_string()];
    let err = ProcessExecutor::new()
        .execute(&command, temp.path(), Duration::from_secs(5))
        .unwrap_err();
    assert!(matches!(err, AgentError::ExecutableNotFound { .. }));
}

#[tokio::test]
async fn blocking_execute_inside_runtime_is_rejected() {
    let temp = TempDir::new().unwrap();
    let err = ProcessExecutor::new()
        .execute(&sh("echo never"), temp.path(), Duration::from_secs(10))
        .unwrap_err();
    assert!(matches!(err, AgentError::InvalidArgument(_)));
}

#[tokio::test]
async fn async_execution_inside_runtime() {
    let temp = TempDir::new().unwrap();
    let output = ProcessExecutor::new()
        .execute_async(&sh("echo async"), temp.path(), Duration::from_secs(10))
        .await
        .unwrap();
    assert_eq!(output.stdout.trim(), "async");
}
