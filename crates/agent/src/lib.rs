// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Drives reasoning-agent subprocesses bound to sandbox sessions, with a
//! process-wide heartbeat tracker multiplexed by session name.

mod driver;
mod error;
mod ipc;
mod kind;

pub use driver::{AgentConfig, AgentDriver, AgentOutcome};
pub use error::AgentError;
pub use ipc::IpcServer;
pub use kind::AgentKind;
