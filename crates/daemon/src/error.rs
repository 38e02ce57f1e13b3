// SPDX-License-Identifier: MIT

//! The daemon's top-level error type. Composes every crate-boundary error
//! via `#[from]`; only surfaced through `anyhow` at the process boundary
//! (`main`, CLI argument handling) per §9.

use crate::config::ConfigError;
use bf_storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("engine error: {0}")]
    Engine(#[from] bf_engine::EngineError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
