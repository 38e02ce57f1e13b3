// SPDX-License-Identifier: MIT

//! Runtime configuration consumed by the workflow engine and scheduler.
//!
//! This is the engine's view of configuration: the subset of `bf-daemon`'s
//! enumerated config (§6) that phase handlers and the scheduler actually
//! need. The daemon owns loading, validation, and rejecting unknown keys;
//! by the time a caller builds one of these, that's already settled.

/// Per-phase timeouts, pool sizing, and the handful of settings phase
/// handlers read directly.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub reproducer_timeout_ms: u64,
    pub fixer_timeout_ms: u64,
    pub worker_pool_size: usize,
    pub poll_interval_ms: u64,
    pub pr_remote: String,
    pub pr_base: String,
    /// When true, newly claimed panics enter at `repo_setup` rather than
    /// `preflight` — the boot option from §9's open question, deciding
    /// whether preflight is a once-per-process or once-per-panic check.
    pub skip_preflight: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reproducer_timeout_ms: 10 * 60 * 1000,
            fixer_timeout_ms: 20 * 60 * 1000,
            worker_pool_size: 4,
            poll_interval_ms: 2_000,
            pr_remote: "origin".to_string(),
            pr_base: "main".to_string(),
            skip_preflight: false,
        }
    }
}
