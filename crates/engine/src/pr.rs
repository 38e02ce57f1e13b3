// SPDX-License-Identifier: MIT

//! The PR host: out of scope per the system's purpose (§1), specified only
//! by the interface the shipping handler consumes. The real implementation
//! shells `gh pr create` inside the panic's session; tests substitute a
//! scripted fake.

use async_trait::async_trait;
use bf_sandbox::SandboxAdapter;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrError {
    #[error("sandbox error: {0}")]
    Sandbox(#[from] bf_sandbox::SandboxError),

    #[error("pr creation failed (exit {exit_code}): {stderr}")]
    CommandFailed { exit_code: i32, stderr: String },

    #[error("pr creation succeeded but produced no url")]
    NoUrl,
}

/// Opens a draft pull request for a pushed branch and returns its URL.
#[async_trait]
pub trait PrCreator: Send + Sync {
    async fn create_pr(
        &self,
        session: &str,
        branch: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<String, PrError>;
}

/// Shells `gh pr create --draft` inside the session. The URL is the last
/// non-empty line of stdout, which is what `gh` prints on success.
pub struct ShellPrCreator<A: SandboxAdapter + ?Sized> {
    sandbox: std::sync::Arc<A>,
}

impl<A: SandboxAdapter + ?Sized> ShellPrCreator<A> {
    pub fn new(sandbox: std::sync::Arc<A>) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl<A: SandboxAdapter + ?Sized> PrCreator for ShellPrCreator<A> {
    async fn create_pr(
        &self,
        session: &str,
        branch: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<String, PrError> {
        let escaped_title = bf_core::escape::escape_single_quoted(title);
        let escaped_body = bf_core::escape::escape_single_quoted(body);
        let cmd = format!(
            "gh pr create --draft --base '{base}' --head '{branch}' --title '{escaped_title}' --body '{escaped_body}'"
        );
        let output = self.sandbox.run_in_session(session, &cmd).await?;
        if !output.is_success() {
            return Err(PrError::CommandFailed { exit_code: output.exit_code, stderr: output.stderr });
        }
        output
            .stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or(PrError::NoUrl)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;

    /// Scriptable PR creator for tests: by default returns a deterministic
    /// URL derived from the branch name; can be scripted to fail.
    pub struct FakePrCreator {
        fail: Mutex<Option<PrError>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl Default for FakePrCreator {
        fn default() -> Self {
            Self { fail: Mutex::new(None), calls: Mutex::new(Vec::new()) }
        }
    }

    impl FakePrCreator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_with(&self, err: PrError) {
            *self.fail.lock() = Some(err);
        }

        pub fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl PrCreator for FakePrCreator {
        async fn create_pr(
            &self,
            _session: &str,
            branch: &str,
            _base: &str,
            title: &str,
            _body: &str,
        ) -> Result<String, PrError> {
            self.calls.lock().push((branch.to_string(), title.to_string()));
            if let Some(err) = self.fail.lock().take() {
                return Err(err);
            }
            Ok(format!("https://github.com/example/repo/pull/{}", branch.len()))
        }
    }
}
