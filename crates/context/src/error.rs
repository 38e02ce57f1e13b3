// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors from parsing or validating a `panic_context.md` document.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("no fenced json block found in context document")]
    NoFence,

    #[error("fenced json block is not valid json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("context data missing required fields for this phase: {0:?}")]
    MissingFields(Vec<String>),
}
