//! Running a built command to completion.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use wt_types::{CommandSpec, LaunchError, ProcessOutput};

/// Runs one external job and hands back everything it printed.
///
/// Implementations wait for the process to exit; nothing is streamed.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, command: &CommandSpec) -> Result<ProcessOutput, LaunchError>;
}

/// [`JobRunner`] backed by a real child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl JobRunner for ProcessRunner {
    async fn run(&self, command: &CommandSpec) -> Result<ProcessOutput, LaunchError> {
        let program = command.program().ok_or(LaunchError::EmptyCommand)?;

        let mut cmd = Command::new(program);
        cmd.args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        // No timeout: a hung simulation holds the batch here.
        let output = cmd.output().await.map_err(|source| LaunchError::Spawn {
            program: program.to_string(),
            source,
        })?;

        debug!(
            program,
            exit_code = ?output.status.code(),
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "job finished"
        );

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_command_is_rejected() {
        let result = ProcessRunner::new().run(&CommandSpec::new(Vec::new(), None)).await;
        assert!(matches!(result, Err(LaunchError::EmptyCommand)));
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let spec = CommandSpec::new(vec!["/definitely/not/a/real/program".into()], None);
        match ProcessRunner::new().run(&spec).await {
            Err(LaunchError::Spawn { program, .. }) => {
                assert_eq!(program, "/definitely/not/a/real/program")
            }
            other => panic!("expected spawn error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_both_streams_and_exit_code() {
        let spec = CommandSpec::new(
            vec![
                "sh".into(),
                "-c".into(),
                "echo 'Total wall time: 0:00:03'; echo warn >&2; exit 3".into(),
            ],
            None,
        );
        let output = ProcessRunner::new().run(&spec).await.unwrap();
        assert_eq!(output.stdout, "Total wall time: 0:00:03\n");
        assert_eq!(output.stderr, "warn\n");
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let spec = CommandSpec::new(
            vec!["sh".into(), "-c".into(), "pwd".into()],
            Some(dir.path().to_path_buf()),
        );
        let output = ProcessRunner::new().run(&spec).await.unwrap();
        let reported = std::path::PathBuf::from(output.stdout.trim());
        assert_eq!(
            reported.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }
}
