// SPDX-License-Identifier: MIT

//! Drives a single reasoning-agent invocation bound to a sandbox session.

use crate::error::AgentError;
use crate::ipc::IpcServer;
use crate::kind::AgentKind;
use bf_sandbox::SandboxAdapter;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// The idempotent command run before every spawn to ensure the session's
/// MCP tools are configured. Safe to re-run against an already-configured
/// session — it only ensures state, it never resets it.
const MCP_SETUP_CMD: &str = "bugfix-mcp-setup --ensure";

/// Per-phase wall-clock deadlines, sourced from the daemon's configuration.
#[derive(Debug, Clone, Copy)]
pub struct AgentConfig {
    pub reproducer_timeout_ms: u64,
    pub fixer_timeout_ms: u64,
}

impl AgentConfig {
    fn timeout_ms(self, kind: AgentKind) -> u64 {
        match kind {
            AgentKind::Reproducer => self.reproducer_timeout_ms,
            AgentKind::Fixer => self.fixer_timeout_ms,
        }
    }
}

/// Result of one `spawn_agent` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOutcome {
    pub success: bool,
    pub timed_out: bool,
    pub exit_code: Option<i32>,
    /// Stderr truncated to at most 500 bytes, for logging.
    pub stderr: String,
    pub elapsed_ms: u64,
}

/// Single-use per invocation: no internal retries. Callers construct one
/// per phase handler call.
pub struct AgentDriver {
    sandbox: Arc<dyn SandboxAdapter>,
}

impl AgentDriver {
    pub fn new(sandbox: Arc<dyn SandboxAdapter>) -> Self {
        Self { sandbox }
    }

    pub async fn spawn_agent(
        &self,
        kind: AgentKind,
        session: &str,
        prompt_path: &Path,
        config: AgentConfig,
        ipc: &IpcServer,
    ) -> Result<AgentOutcome, AgentError> {
        self.sandbox.run_in_session(session, MCP_SETUP_CMD).await?;
        ipc.record_heartbeat(session, Utc::now());

        let cmd =
            format!("bugfix-agent --kind {} --session {} --prompt {}", kind.as_str(), session, prompt_path.display());
        let timeout = Duration::from_millis(config.timeout_ms(kind));
        let start = Instant::now();

        let outcome = match tokio::time::timeout(timeout, self.sandbox.run_in_session(session, &cmd)).await {
            Err(_elapsed) => AgentOutcome {
                success: false,
                timed_out: true,
                exit_code: None,
                stderr: String::new(),
                elapsed_ms: start.elapsed().as_millis() as u64,
            },
            Ok(result) => {
                let output = result?;
                AgentOutcome {
                    success: output.is_success(),
                    timed_out: false,
                    exit_code: Some(output.exit_code),
                    stderr: truncate_bytes(&output.stderr, 500),
                    elapsed_ms: start.elapsed().as_millis() as u64,
                }
            }
        };

        ipc.record_heartbeat(session, Utc::now());
        Ok(outcome)
    }
}

/// Truncate `s` to at most `max_bytes`, never splitting a UTF-8 char.
fn truncate_bytes(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}
