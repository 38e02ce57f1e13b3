// SPDX-License-Identifier: MIT

use bf_sandbox::SandboxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("sandbox error: {0}")]
    Sandbox(#[from] SandboxError),
}
