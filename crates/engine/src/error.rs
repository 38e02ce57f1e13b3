// SPDX-License-Identifier: MIT

use bf_storage::StoreError;
use thiserror::Error;

/// Errors that abort the current worker's handling of a panic outright,
/// rather than being folded into a `needs_human_review` transition. Only
/// durable-store failures during persistence reach this — every other
/// failure inside a phase handler is captured as a `HandlerOutcome`
/// escalation (see [`crate::types::HandlerOutcome`]).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
