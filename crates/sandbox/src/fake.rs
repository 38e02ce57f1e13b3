// SPDX-License-Identifier: MIT

//! Scripted fake sandbox, available to other crates' tests behind the
//! `test-support` feature.

use crate::adapter::{CommandOutput, SandboxAdapter};
use crate::error::SandboxError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// An in-memory sandbox whose command responses are configured up front.
/// Unscripted commands succeed with empty output by default, so tests only
/// need to script the commands whose result they care about.
pub struct FakeSandboxAdapter {
    responses: Mutex<HashMap<String, CommandOutput>>,
    delays: Mutex<HashMap<String, std::time::Duration>>,
    default_output: CommandOutput,
    sessions: Mutex<HashSet<String>>,
    calls: Mutex<Vec<(String, String)>>,
    unreachable_sessions: Mutex<HashSet<String>>,
}

impl Default for FakeSandboxAdapter {
    fn default() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            default_output: CommandOutput { stdout: String::new(), stderr: String::new(), exit_code: 0 },
            sessions: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            unreachable_sessions: Mutex::new(HashSet::new()),
        }
    }
}

impl FakeSandboxAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the exact-match response for `cmd`.
    pub fn script(&self, cmd: impl Into<String>, output: CommandOutput) {
        self.responses.lock().insert(cmd.into(), output);
    }

    /// Make `cmd` sleep for `delay` before returning its scripted (or
    /// default) response — used to exercise timeout-handling callers.
    pub fn script_delay(&self, cmd: impl Into<String>, delay: std::time::Duration) {
        self.delays.lock().insert(cmd.into(), delay);
    }

    /// Make `session` return [`SandboxError::Unreachable`] from every call.
    pub fn mark_unreachable(&self, session: impl Into<String>) {
        self.unreachable_sessions.lock().insert(session.into());
    }

    /// Every `(session, cmd)` pair passed to `run_in_session`, in order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, cmd: &str) -> usize {
        self.calls.lock().iter().filter(|(_, c)| c == cmd).count()
    }
}

#[async_trait]
impl SandboxAdapter for FakeSandboxAdapter {
    async fn run_in_session(&self, session: &str, cmd: &str) -> Result<CommandOutput, SandboxError> {
        if self.unreachable_sessions.lock().contains(session) {
            return Err(SandboxError::Unreachable(session.to_string()));
        }
        self.sessions.lock().insert(session.to_string());
        self.calls.lock().push((session.to_string(), cmd.to_string()));
        if let Some(delay) = self.delays.lock().get(cmd).copied() {
            tokio::time::sleep(delay).await;
        }
        Ok(self.responses.lock().get(cmd).cloned().unwrap_or_else(|| self.default_output.clone()))
    }

    async fn session_exists(&self, session: &str) -> Result<bool, SandboxError> {
        Ok(self.sessions.lock().contains(session))
    }

    async fn delete_session(&self, session: &str) -> Result<(), SandboxError> {
        self.sessions.lock().remove(session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unscripted_command_defaults_to_success() {
        let fake = FakeSandboxAdapter::new();
        let out = fake.run_in_session("s", "make").await.unwrap();
        assert!(out.is_success());
    }

    #[tokio::test]
    async fn scripted_command_returns_configured_output() {
        let fake = FakeSandboxAdapter::new();
        fake.script("make test", CommandOutput { stdout: String::new(), stderr: "boom".into(), exit_code: 1 });
        let out = fake.run_in_session("s", "make test").await.unwrap();
        assert_eq!(out.exit_code, 1);
        assert_eq!(out.stderr, "boom");
    }

    #[tokio::test]
    async fn unreachable_session_errors_on_every_call() {
        let fake = FakeSandboxAdapter::new();
        fake.mark_unreachable("gone");
        let err = fake.run_in_session("gone", "true").await.unwrap_err();
        assert!(matches!(err, SandboxError::Unreachable(_)));
    }

    #[tokio::test]
    async fn records_calls_in_order() {
        let fake = FakeSandboxAdapter::new();
        fake.run_in_session("s", "make").await.unwrap();
        fake.run_in_session("s", "make test").await.unwrap();
        assert_eq!(fake.calls(), vec![("s".to_string(), "make".to_string()), ("s".to_string(), "make test".to_string())]);
    }

    #[tokio::test]
    async fn session_lifecycle_tracks_existence() {
        let fake = FakeSandboxAdapter::new();
        assert!(!fake.session_exists("s").await.unwrap());
        fake.run_in_session("s", "true").await.unwrap();
        assert!(fake.session_exists("s").await.unwrap());
        fake.delete_session("s").await.unwrap();
        assert!(!fake.session_exists("s").await.unwrap());
    }
}
