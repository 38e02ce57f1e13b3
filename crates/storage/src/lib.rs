// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable store for the bug-remediation orchestrator.
//!
//! Backed by an append-only write-ahead log of store events plus a
//! materialized in-memory index rebuilt by replaying the log on
//! [`Store::init_schema`]. SQL is deliberately not part of this contract —
//! a relational engine could sit behind [`Store`] without changing any
//! caller, but the WAL shape is what this codebase already uses for
//! crash-tolerant state (see `bf-daemon`'s startup sequence).

mod error;
mod store;
mod wal;

pub use error::StoreError;
pub use store::{StatusUpdate, Store};
pub use wal::{WalEntry, WalError};
