// SPDX-License-Identifier: MIT

use crate::wal::WalError;
use thiserror::Error;

/// Errors from durable store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is not connected; call connect() first")]
    NotConnected,

    #[error("store is closed")]
    Closed,

    #[error("panic_location already exists: {0}")]
    AlreadyExists(String),

    #[error("panic_location not found: {0}")]
    NotFound(String),

    #[error("wal error: {0}")]
    Wal(#[from] WalError),
}
