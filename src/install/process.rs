//! Bounded child-process execution
//!
//! Every external program the installer launches goes through [`run`]: stdin is
//! closed, output is captured, and the child is killed if it outlives its
//! budget.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use super::error::InstallError;

/// Trailing stderr lines carried into an [`InstallError::ExitStatus`].
const STDERR_TAIL_LINES: usize = 8;

/// Captured result of a finished child process.
#[derive(Debug)]
pub struct CommandOutput {
    pub program: String,
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Turn a non-zero exit into [`InstallError::ExitStatus`].
    pub fn require_success(self) -> Result<Self, InstallError> {
        if self.success() {
            return Ok(self);
        }

        let tail = stderr_tail(&self.stderr);
        Err(InstallError::ExitStatus {
            program: self.program,
            status: self.status.to_string(),
            detail: if tail.is_empty() {
                String::new()
            } else {
                format!(": {tail}")
            },
        })
    }
}

/// Prepare a command with closed stdin and captured output.
pub fn command(program: impl AsRef<OsStr>) -> Command {
    let mut command = Command::new(program);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    command
}

/// Put `dirs` in front of the inherited `PATH` of `command`.
pub fn prepend_path(command: &mut Command, dirs: &[PathBuf]) {
    if dirs.is_empty() {
        return;
    }

    let inherited = std::env::var_os("PATH").unwrap_or_default();
    let paths = dirs
        .iter()
        .cloned()
        .chain(std::env::split_paths(&inherited));
    match std::env::join_paths(paths) {
        Ok(joined) => {
            command.env("PATH", joined);
        }
        Err(error) => log::warn!("Cannot extend PATH with {dirs:?}: {error}"),
    }
}

/// Run `command` to completion within `budget`.
///
/// When the budget runs out the pending future is dropped, which kills the
/// direct child.
pub async fn run(
    mut command: Command,
    program: &str,
    budget: Duration,
) -> Result<CommandOutput, InstallError> {
    log::debug!("Running {:?} (budget {}s)", command.as_std(), budget.as_secs());

    let output = match timeout(budget, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => {
            return Err(InstallError::Spawn {
                program: program.to_string(),
                source,
            });
        }
        Err(_) => {
            return Err(InstallError::Timeout {
                program: program.to_string(),
                after: budget,
            });
        }
    };

    Ok(CommandOutput {
        program: program.to_string(),
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Display name for a program path.
pub fn program_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

fn stderr_tail(stderr: &str) -> String {
    let lines = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join(" | ")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_output() {
        let mut cmd = command("sh");
        cmd.args(["-c", "echo out; echo err >&2"]);

        let output = run(cmd, "sh", Duration::from_secs(10)).await.expect("runs");

        assert!(output.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn non_zero_exit_carries_stderr_tail() {
        let mut cmd = command("sh");
        cmd.args(["-c", "echo first >&2; echo 'disk full' >&2; exit 3"]);

        let output = run(cmd, "sh", Duration::from_secs(10)).await.expect("runs");
        let error = output.require_success().expect_err("exit 3 is a failure");

        let message = error.to_string();
        assert!(message.contains("first | disk full"), "{message}");
        assert!(matches!(error, InstallError::ExitStatus { .. }));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let cmd = command("/nonexistent/definitely-not-here");

        let error = run(cmd, "ghost", Duration::from_secs(5))
            .await
            .expect_err("cannot spawn");

        assert!(matches!(error, InstallError::Spawn { ref program, .. } if program == "ghost"));
    }

    #[tokio::test]
    async fn slow_program_times_out() {
        let mut cmd = command("sleep");
        cmd.arg("30");

        let error = run(cmd, "sleep", Duration::from_millis(200))
            .await
            .expect_err("budget exceeded");

        assert!(matches!(error, InstallError::Timeout { .. }));
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let stderr = (0..20).map(|n| format!("line {n}\n")).collect::<String>();

        let tail = stderr_tail(&stderr);

        assert!(tail.starts_with("line 12"));
        assert!(tail.ends_with("line 19"));
    }
}
