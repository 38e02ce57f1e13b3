// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Sandbox sessions: opaque, per-panic isolated workspaces that shell
//! commands run inside.

mod adapter;
mod error;
mod process;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use adapter::{CommandOutput, SandboxAdapter};
pub use error::SandboxError;
pub use process::ProcessSandboxAdapter;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSandboxAdapter;
