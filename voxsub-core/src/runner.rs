//! External process runner. The transcoder and aligner steps go through [`CommandRunner`]
//! so tests can swap in canned exit codes instead of spawning processes.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// A fully resolved invocation: program, arguments, working directory and a deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            timeout,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    /// Shell-like rendering for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Last few lines of stderr, for error messages.
    pub fn stderr_tail(&self, lines: usize) -> String {
        let all: Vec<&str> = self.stderr.lines().collect();
        all[all.len().saturating_sub(lines)..].join("\n")
    }
}

/// Runs one external command to completion. Spawn failures and timeouts are `Err`;
/// a non-zero exit is a normal `Ok` output for the caller to judge.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput>;
}

/// Spawns real child processes with tokio. The child is killed if the deadline passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &spec.working_dir {
            cmd.current_dir(dir);
        }
        debug!(command = %spec.display(), "spawning");
        let child = cmd.spawn()?;

        let output = tokio::time::timeout(spec.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("{} timed out after {:?}", spec.program, spec.timeout),
                )
            })??;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &std::path::Path, body: &str) -> String {
        let path = dir.join("run.sh");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().to_string()
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn captures_output_and_args() {
        let dir = tempfile::tempdir().unwrap();
        let exe = script(dir.path(), "printf '%s|%s' \"$1\" \"$2\"; echo oops >&2");
        let spec = CommandSpec::new(exe, Duration::from_secs(5)).args(["a", "b c"]);
        let out = ProcessRunner.run(&spec).await.unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "a|b c");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn non_zero_exit_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let exe = script(dir.path(), "echo line1 >&2; echo line2 >&2; exit 3");
        let out = ProcessRunner
            .run(&CommandSpec::new(exe, Duration::from_secs(5)))
            .await
            .unwrap();
        assert!(!out.success());
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stderr_tail(1), "line2");
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn runs_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let exe = script(dir.path(), "pwd");
        let spec = CommandSpec::new(exe, Duration::from_secs(5))
            .current_dir(Some(dir.path().to_path_buf()));
        let out = ProcessRunner.run(&spec).await.unwrap();
        let reported = fs::canonicalize(out.stdout.trim()).unwrap();
        assert_eq!(reported, fs::canonicalize(dir.path()).unwrap());
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn timeout_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let exe = script(dir.path(), "sleep 5");
        let err = ProcessRunner
            .run(&CommandSpec::new(exe, Duration::from_millis(100)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let spec = CommandSpec::new("/definitely/not/here", Duration::from_secs(1));
        assert!(ProcessRunner.run(&spec).await.is_err());
    }

    #[test]
    fn display_joins_program_and_args() {
        let spec = CommandSpec::new("ffmpeg", Duration::from_secs(1)).args(["-i", "a.mp3"]);
        assert_eq!(spec.display(), "ffmpeg -i a.mp3");
    }
}
