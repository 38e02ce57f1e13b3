// SPDX-License-Identifier: MIT

//! Structured logging setup (§9): an `EnvFilter`-driven `tracing`
//! subscriber installed once at daemon startup, defaulting to `info`
//! when `RUST_LOG` is unset.

use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber. Safe to call exactly once; a
/// second call is a programmer error in this binary, not a recoverable
/// condition, so it panics like the rest of `tracing-subscriber`'s init
/// functions do.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}
