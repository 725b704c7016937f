//! Status fetcher — runs the external CLI and captures its report.

use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::CommandFailure;

/// Client for querying the external CLI's status report.
///
/// Runs `<command> status`, captures stdout, and bounds the wait with a
/// timeout. Stderr is consumed only for failure diagnostics.
pub struct StatusClient {
    command: String,
    timeout: Duration,
}

impl StatusClient {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    /// Name of the external command being queried
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run the status query and return its raw text output.
    ///
    /// Any [`CommandFailure`] means "no data available this cycle"; the
    /// caller must not treat it as fatal. A non-zero exit that still
    /// produced stdout is treated as usable output (the CLI reports some
    /// conditions on a non-zero exit) and only logged.
    pub async fn fetch_status(&self) -> Result<String, CommandFailure> {
        debug!("running `{} status`", self.command);

        let output = Command::new(&self.command)
            .arg("status")
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, output).await {
            Ok(result) => result.map_err(|source| CommandFailure::Spawn {
                command: self.command.clone(),
                source,
            })?,
            Err(_) => {
                warn!(
                    "`{} status` exceeded {}s timeout",
                    self.command,
                    self.timeout.as_secs()
                );
                return Err(CommandFailure::Timeout {
                    command: self.command.clone(),
                    timeout_secs: self.timeout.as_secs(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();

        if !output.status.success() {
            if stdout.trim().is_empty() {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                return Err(CommandFailure::Exit {
                    command: self.command.clone(),
                    code: output.status.code(),
                    stderr,
                });
            }
            warn!(
                "`{} status` exited with {:?} but produced output; using it",
                self.command,
                output.status.code()
            );
        }

        Ok(stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn fake_status_command(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-openclaw");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path.to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn test_fetch_missing_command_is_spawn_failure() {
        let client = StatusClient::new(
            "definitely-not-a-real-command-7c1f",
            Duration::from_secs(5),
        );
        let err = client.fetch_status().await.unwrap_err();
        assert!(matches!(err, CommandFailure::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let command = fake_status_command(
            dir.path(),
            "echo 'Tokens: 100/50'; echo 'Cost: $2.50'",
        );
        let client = StatusClient::new(command, Duration::from_secs(5));
        let text = client.fetch_status().await.unwrap();
        assert!(text.contains("Tokens: 100/50"));
        assert!(text.contains("Cost: $2.50"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let command = fake_status_command(dir.path(), "sleep 10");
        let client = StatusClient::new(command, Duration::from_millis(100));
        let err = client.fetch_status().await.unwrap_err();
        assert!(matches!(err, CommandFailure::Timeout { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_nonzero_exit_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let command = fake_status_command(dir.path(), "echo 'no session' >&2; exit 3");
        let client = StatusClient::new(command, Duration::from_secs(5));
        let err = client.fetch_status().await.unwrap_err();
        match err {
            CommandFailure::Exit { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "no session");
            }
            other => panic!("expected Exit failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_nonzero_exit_with_output_is_usable() {
        let dir = tempfile::tempdir().unwrap();
        let command = fake_status_command(dir.path(), "echo 'Tokens: 1/2'; exit 1");
        let client = StatusClient::new(command, Duration::from_secs(5));
        let text = client.fetch_status().await.unwrap();
        assert!(text.contains("Tokens: 1/2"));
    }
}
