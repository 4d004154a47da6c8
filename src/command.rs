//! Bounded execution of external tools.
//!
//! Every converter and git invocation goes through [`run_command`], which waits
//! for the child to exit (or kills it once the bound elapses) and reports a
//! [`CommandOutcome`] instead of a bare exit status.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

/// Result of a single external process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Exited with status zero.
    Success,
    /// Exited non-zero (`code` is `None` when killed by a signal).
    Failed { code: Option<i32>, stderr: String },
    /// The process could not be started at all.
    LaunchFailed { reason: String },
    /// Still running when the bound elapsed; the child has been killed.
    TimedOut { after: Duration },
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success)
    }

    /// Human-readable reason for a non-success outcome.
    pub fn describe(&self) -> String {
        match self {
            CommandOutcome::Success => "success".to_string(),
            CommandOutcome::Failed { code: Some(code), stderr } if stderr.is_empty() => {
                format!("exited with code {code}")
            }
            CommandOutcome::Failed { code: Some(code), stderr } => {
                format!("exited with code {code}: {stderr}")
            }
            CommandOutcome::Failed { code: None, stderr } => {
                format!("terminated by signal: {stderr}")
            }
            CommandOutcome::LaunchFailed { reason } => format!("failed to launch: {reason}"),
            CommandOutcome::TimedOut { after } => format!("timed out after {after:?}"),
        }
    }
}

/// Runs `command` to completion, waiting at most `timeout`.
///
/// stdin and stdout are discarded; stderr is captured for diagnostics.
pub async fn run_command(mut command: Command, timeout: Duration) -> CommandOutcome {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(error = ?e, "Failed to launch external process");
            return CommandOutcome::LaunchFailed {
                reason: e.to_string(),
            };
        }
    };

    // Dropping the wait future on timeout drops the child, which kills it.
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Err(_) => {
            warn!(?timeout, "External process exceeded its time bound; killed");
            CommandOutcome::TimedOut { after: timeout }
        }
        Ok(Err(e)) => CommandOutcome::Failed {
            code: None,
            stderr: e.to_string(),
        },
        Ok(Ok(output)) => {
            debug!(status = ?output.status, "External process exited");
            if output.status.success() {
                CommandOutcome::Success
            } else {
                CommandOutcome::Failed {
                    code: output.status.code(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                }
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    const BOUND: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn zero_exit_is_success() {
        let outcome = run_command(Command::new("true"), BOUND).await;
        assert_eq!(outcome, CommandOutcome::Success);
    }

    #[tokio::test]
    async fn non_zero_exit_captures_code_and_stderr() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo oops >&2; exit 3");
        let outcome = run_command(cmd, BOUND).await;
        assert_eq!(
            outcome,
            CommandOutcome::Failed {
                code: Some(3),
                stderr: "oops".to_string()
            }
        );
        assert_eq!(outcome.describe(), "exited with code 3: oops");
    }

    #[tokio::test]
    async fn missing_program_is_a_launch_failure() {
        let outcome = run_command(Command::new("definitely-not-a-real-program-xyz"), BOUND).await;
        assert!(matches!(outcome, CommandOutcome::LaunchFailed { .. }));
    }

    #[tokio::test]
    async fn hung_process_times_out() {
        let mut cmd = Command::new("sleep");
        cmd.arg("30");
        let bound = Duration::from_millis(200);
        let outcome = run_command(cmd, bound).await;
        assert_eq!(outcome, CommandOutcome::TimedOut { after: bound });
    }
}
