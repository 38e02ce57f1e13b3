// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors from sandbox session operations. Commands that run but exit
/// non-zero are not errors here — see [`crate::CommandOutput::exit_code`].
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("session {0:?} is unreachable")]
    Unreachable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
