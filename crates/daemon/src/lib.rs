// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `bugfixd`: the autonomous bug-remediation orchestrator daemon.
//!
//! Wires the real sandbox, agent, store, and PR-host adapters from
//! `bf-engine` into a running [`Scheduler`](bf_engine::Scheduler), and
//! owns everything this system needs to be a deployable binary rather
//! than just a library: configuration loading, CLI parsing, logging
//! setup, and the startup/shutdown lifecycle.

pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod lifecycle;
pub mod logging;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::DaemonError;
