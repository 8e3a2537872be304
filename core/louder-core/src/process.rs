//! Helpers for running short-lived external feedback commands.

use crate::error::{LouderError, Result};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Upper bound for a single sound or banner command.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(4);

/// Runs `program` with `args`, discarding output, and waits for a zero exit.
///
/// The child is killed if it outlives `timeout`.
pub async fn run_quiet(program: &str, args: &[&str], timeout: Duration) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|err| LouderError::CommandFailed {
            command: program.to_string(),
            details: format!("spawn failed: {}", err),
        })?;

    let status = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(status) => status.map_err(|err| LouderError::io(format!("waiting on {}", program), err))?,
        Err(_) => {
            let _ = child.start_kill();
            return Err(LouderError::CommandFailed {
                command: program.to_string(),
                details: format!("timed out after {}ms", timeout.as_millis()),
            });
        }
    };

    if status.success() {
        Ok(())
    } else {
        Err(LouderError::CommandFailed {
            command: program.to_string(),
            details: format!("exited with {}", status),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_command_returns_ok() {
        assert!(run_quiet("true", &[], COMMAND_TIMEOUT).await.is_ok());
    }

    #[tokio::test]
    async fn failing_command_reports_exit_status() {
        let err = run_quiet("false", &[], COMMAND_TIMEOUT).await.unwrap_err();
        assert!(matches!(err, LouderError::CommandFailed { .. }));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_failure() {
        let err = run_quiet("louder-definitely-not-a-real-binary", &[], COMMAND_TIMEOUT)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("spawn failed"));
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        let err = run_quiet("sleep", &["5"], Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
