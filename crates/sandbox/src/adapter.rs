// SPDX-License-Identifier: MIT

use crate::error::SandboxError;
use async_trait::async_trait;

/// The captured result of running a shell command in a session. The
/// adapter does not interpret `cmd` — it is handed to a shell verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Isolated filesystem+process sessions that arbitrary shell commands run
/// inside. Implementations fail (return `Err`) only when the session
/// itself is unreachable — a non-zero exit from `cmd` is still `Ok`.
#[async_trait]
pub trait SandboxAdapter: Send + Sync {
    async fn run_in_session(&self, session: &str, cmd: &str) -> Result<CommandOutput, SandboxError>;

    async fn session_exists(&self, session: &str) -> Result<bool, SandboxError>;

    async fn delete_session(&self, session: &str) -> Result<(), SandboxError>;
}
