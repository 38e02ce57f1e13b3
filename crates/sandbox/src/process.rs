// SPDX-License-Identifier: MIT

//! The real sandbox adapter: one working directory per session under a
//! configured root, commands run via `bash -c` in a child process.

use crate::adapter::{CommandOutput, SandboxAdapter};
use crate::error::SandboxError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;

pub struct ProcessSandboxAdapter {
    root: PathBuf,
}

impl ProcessSandboxAdapter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn session_dir(&self, session: &str) -> PathBuf {
        self.root.join(session)
    }
}

#[async_trait]
impl SandboxAdapter for ProcessSandboxAdapter {
    async fn run_in_session(&self, session: &str, cmd: &str) -> Result<CommandOutput, SandboxError> {
        let dir = self.session_dir(session);
        tokio::fs::create_dir_all(&dir).await?;

        let output = tokio::process::Command::new("bash")
            .arg("-c")
            .arg(cmd)
            .current_dir(&dir)
            .kill_on_drop(true)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SandboxError::Unreachable(format!("session {session:?}: {e}")))?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    async fn session_exists(&self, session: &str) -> Result<bool, SandboxError> {
        Ok(dir_exists(&self.session_dir(session)).await)
    }

    async fn delete_session(&self, session: &str) -> Result<(), SandboxError> {
        let dir = self.session_dir(session);
        if dir_exists(&dir).await {
            tokio::fs::remove_dir_all(&dir).await?;
        }
        Ok(())
    }
}

async fn dir_exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_in_session_creates_directory_and_captures_output() {
        let root = tempfile::tempdir().unwrap();
        let adapter = ProcessSandboxAdapter::new(root.path());
        let out = adapter.run_in_session("panic-a", "echo hello").await.unwrap();
        assert!(out.is_success());
        assert_eq!(out.stdout.trim(), "hello");
        assert!(adapter.session_exists("panic-a").await.unwrap());
    }

    #[tokio::test]
    async fn run_in_session_captures_nonzero_exit_without_erroring() {
        let root = tempfile::tempdir().unwrap();
        let adapter = ProcessSandboxAdapter::new(root.path());
        let out = adapter.run_in_session("panic-b", "exit 7").await.unwrap();
        assert_eq!(out.exit_code, 7);
        assert!(!out.is_success());
    }

    #[tokio::test]
    async fn run_in_session_captures_stderr() {
        let root = tempfile::tempdir().unwrap();
        let adapter = ProcessSandboxAdapter::new(root.path());
        let out = adapter.run_in_session("panic-c", "echo oops 1>&2").await.unwrap();
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn delete_session_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let adapter = ProcessSandboxAdapter::new(root.path());
        adapter.run_in_session("panic-d", "true").await.unwrap();
        assert!(adapter.session_exists("panic-d").await.unwrap());
        adapter.delete_session("panic-d").await.unwrap();
        assert!(!adapter.session_exists("panic-d").await.unwrap());
    }

    #[tokio::test]
    async fn delete_session_on_missing_session_is_a_noop() {
        let root = tempfile::tempdir().unwrap();
        let adapter = ProcessSandboxAdapter::new(root.path());
        adapter.delete_session("never-existed").await.unwrap();
    }

    #[tokio::test]
    async fn session_exists_false_before_first_use() {
        let root = tempfile::tempdir().unwrap();
        let adapter = ProcessSandboxAdapter::new(root.path());
        assert!(!adapter.session_exists("panic-e").await.unwrap());
    }
}
