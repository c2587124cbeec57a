use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{ExecError, Result};
use crate::output::OutputPolicy;
use crate::request::ExecutionRequest;

/// Upper bound on command wall-clock time.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Normalized result of a successful execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub exit_code: i32,
}

/// Run a command through the host shell.
///
/// The output encoding policy is applied to the rendered command line before
/// spawning. On timeout the child process is killed, not merely abandoned.
pub async fn run(request: &ExecutionRequest, timeout: Duration) -> Result<ExecutionResult> {
    let line = request.to_command_line()?;
    let policy = OutputPolicy::detect(&line);
    let line = policy.apply(&line);
    execute(&line, policy, timeout).await
}

async fn execute(line: &str, policy: OutputPolicy, timeout: Duration) -> Result<ExecutionResult> {
    log::debug!("executing: {line}");

    let mut command = shell_command(line);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = command.spawn().map_err(ExecError::Spawn)?;

    // wait_with_output drains stdout and stderr concurrently; dropping the
    // future on timeout kills the child via kill_on_drop.
    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| ExecError::Timeout)?
        .map_err(ExecError::Spawn)?;

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        let stdout = if policy.wants_json() {
            minimize_json(stdout)
        } else {
            stdout.to_string()
        };
        Ok(ExecutionResult {
            stdout,
            exit_code: 0,
        })
    } else {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("Command failed with exit code {code}")
        } else {
            stderr
        };
        Err(ExecError::Failed { code, message })
    }
}

fn shell_command(line: &str) -> Command {
    if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", line]);
        command
    } else {
        let mut command = Command::new("sh");
        command.args(["-c", line]);
        command
    }
}

// Strip insignificant whitespace from valid JSON; anything that fails to
// parse is returned unchanged.
fn minimize_json(text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|_| text.to_string()),
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn successful_command_returns_trimmed_stdout() {
        let result = execute("echo '  hello  '", OutputPolicy::Explicit, DEFAULT_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(result.stdout, "hello");
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn json_mode_minimizes_valid_json() {
        let result = execute(
            r#"echo '{ "title" : "Tasks",  "count" : 2 }'"#,
            OutputPolicy::ExplicitJson,
            DEFAULT_TIMEOUT,
        )
        .await
        .unwrap();
        assert_eq!(result.stdout, r#"{"title":"Tasks","count":2}"#);
    }

    #[tokio::test]
    async fn json_mode_leaves_unparseable_output_unchanged() {
        let result = execute(
            "echo 'not json at all'",
            OutputPolicy::DefaultJson,
            DEFAULT_TIMEOUT,
        )
        .await
        .unwrap();
        assert_eq!(result.stdout, "not json at all");
    }

    #[test]
    fn minimize_is_idempotent_for_compact_json() {
        let compact = r#"{"a":[1,2,3],"b":null}"#;
        assert_eq!(minimize_json(compact), compact);
    }

    #[tokio::test]
    async fn failed_command_carries_stderr() {
        let err = execute(
            "echo 'boom' >&2; exit 2",
            OutputPolicy::Explicit,
            DEFAULT_TIMEOUT,
        )
        .await
        .unwrap_err();
        match err {
            ExecError::Failed { code, message } => {
                assert_eq!(code, 2);
                assert_eq!(message, "boom");
            }
            other => panic!("expected Failed, got {other}"),
        }
    }

    #[tokio::test]
    async fn failed_command_without_stderr_reports_exit_code() {
        let err = execute("exit 3", OutputPolicy::Explicit, DEFAULT_TIMEOUT)
            .await
            .unwrap_err();
        match err {
            ExecError::Failed { code, message } => {
                assert_eq!(code, 3);
                assert_eq!(message, "Command failed with exit code 3");
            }
            other => panic!("expected Failed, got {other}"),
        }
    }

    #[tokio::test]
    async fn timeout_is_distinct_from_failure() {
        let err = execute(
            "sleep 5",
            OutputPolicy::Explicit,
            Duration::from_millis(100),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExecError::Timeout));
    }

    #[tokio::test]
    async fn run_rejects_invalid_requests_before_spawning() {
        let request = ExecutionRequest::Line(String::new());
        let err = run(&request, DEFAULT_TIMEOUT).await.unwrap_err();
        assert!(matches!(err, ExecError::InvalidRequest(_)));
    }
}
