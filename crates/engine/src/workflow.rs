// SPDX-License-Identifier: MIT

//! The workflow engine (§4.F): dispatches a panic to the handler for its
//! current status, applies the returned transition, and persists it. This
//! is the only place that writes a panic's `status`/`branch_name`/`pr_url`
//! — handlers never touch the store's panic-mutating methods directly.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::handlers;
use crate::pr::PrCreator;
use crate::types::HandlerContext;
use bf_agent::{AgentDriver, IpcServer};
use bf_core::slug::{branch_name, slugify};
use bf_core::{Clock, LogEvent, LogLevel, Phase, WorkflowError};
use bf_sandbox::SandboxAdapter;
use bf_storage::{StatusUpdate, Store};
use std::sync::Arc;
use tracing::{info, warn};

/// Drives one panic through exactly one phase handler call and persists
/// its outcome. Constructing one per worker keeps every dependency
/// explicit and cheap to clone (everything behind it is an `Arc`).
pub struct Workflow<C: Clock> {
    store: Arc<Store<C>>,
    sandbox: Arc<dyn SandboxAdapter>,
    agent: Arc<AgentDriver>,
    ipc: Arc<IpcServer>,
    pr_creator: Arc<dyn PrCreator>,
    config: EngineConfig,
    clock: C,
}

impl<C: Clock> Workflow<C> {
    pub fn new(
        store: Arc<Store<C>>,
        sandbox: Arc<dyn SandboxAdapter>,
        agent: Arc<AgentDriver>,
        ipc: Arc<IpcServer>,
        pr_creator: Arc<dyn PrCreator>,
        config: EngineConfig,
        clock: C,
    ) -> Self {
        Self { store, sandbox, agent, ipc, pr_creator, config, clock }
    }

    /// Run the handler matching `location`'s current status, apply and
    /// persist the transition, and return the resulting status. A no-op
    /// returning the current status if it's already terminal.
    pub async fn step(&self, location: &str) -> Result<Phase, EngineError> {
        let panic = match self.store.get_panic_fix(location).await? {
            Some(p) => p,
            None => return Err(EngineError::Store(bf_storage::StoreError::NotFound(location.to_string()))),
        };
        if panic.status.is_terminal() {
            return Ok(panic.status);
        }

        let session_name = slugify(location);
        let branch = panic.branch_name.clone().unwrap_or_else(|| branch_name(location));
        let ctx = HandlerContext::new(
            &panic,
            &session_name,
            &branch,
            &self.config,
            self.sandbox.as_ref(),
            self.agent.as_ref(),
            self.ipc.as_ref(),
            self.pr_creator.as_ref(),
            self.store.as_ref(),
        );

        let outcome = match panic.status {
            Phase::Preflight => handlers::preflight::run(&ctx).await,
            Phase::RepoSetup => handlers::repo_setup::run(&ctx).await,
            Phase::Reproducing => handlers::reproducing::run(&ctx).await,
            Phase::Fixing => handlers::fixing::run(&ctx).await,
            Phase::Shipping => handlers::shipping::run(&ctx).await,
            Phase::Pending | Phase::PrOpen | Phase::NeedsHumanReview => {
                return Ok(panic.status);
            }
        };

        let Some(next) = outcome.next_status else {
            warn!(panic_location = %location, "handler returned no next status; treating as stuck");
            return Ok(panic.status);
        };

        if !panic.status.can_transition_to(next) {
            warn!(
                panic_location = %location,
                from = %panic.status,
                to = %next,
                "handler requested an illegal transition; escalating instead"
            );
            return self.escalate(location, panic.status, "internal error: illegal phase transition").await;
        }

        if next == Phase::NeedsHumanReview {
            let error = outcome.error.unwrap_or_else(|| "unspecified failure".to_string());
            self.escalate(location, panic.status, &error).await
        } else {
            let updated = self
                .store
                .update_panic_status(
                    location,
                    next,
                    StatusUpdate { branch_name: outcome.branch_name, pr_url: outcome.pr_url },
                )
                .await?;
            self.store.reset_retry_count(location).await?;
            self.log(location, Some(next), LogLevel::Info, format!("{} -> {}", panic.status, next)).await;
            Ok(updated.status)
        }
    }

    async fn escalate(&self, location: &str, phase: Phase, error: &str) -> Result<Phase, EngineError> {
        let workflow_error = WorkflowError { phase, error: error.to_string(), timestamp: self.clock.now() };
        let updated = self.store.mark_needs_human_review(location, workflow_error).await?;
        self.log(location, Some(phase), LogLevel::Error, error.to_string()).await;
        info!(panic_location = %location, phase = %phase, "escalated to needs_human_review");
        Ok(updated.status)
    }

    async fn log(&self, location: &str, phase: Option<Phase>, level: LogLevel, message: String) {
        let mut event = LogEvent::new(level, message, self.clock.now());
        if let Some(phase) = phase {
            event = event.for_panic(location, phase);
        }
        let _ = self.store.insert_log(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::fake::FakePrCreator;
    use crate::test_support::memory_store;
    use bf_core::{FakeClock, PanicFix};
    use bf_sandbox::FakeSandboxAdapter;
    use chrono::Utc;

    async fn workflow() -> (Workflow<FakeClock>, Arc<Store<FakeClock>>, Arc<FakeSandboxAdapter>) {
        let clock = FakeClock::new(Utc::now());
        let store = Arc::new(memory_store(clock.clone()).await);
        let sandbox = Arc::new(FakeSandboxAdapter::new());
        let agent = Arc::new(AgentDriver::new(sandbox.clone()));
        let ipc = Arc::new(IpcServer::new());
        let pr = Arc::new(FakePrCreator::new());
        let config = EngineConfig::default();
        let workflow = Workflow::new(store.clone(), sandbox.clone(), agent, ipc, pr, config, clock);
        (workflow, store, sandbox)
    }

    #[tokio::test]
    async fn happy_path_drives_pending_to_pr_open() {
        let (workflow, store, _sandbox) = workflow().await;
        let location = "src/vdbe.c:1234";
        store
            .create_panic_fix(location, "assertion failed", &["CREATE TABLE t1(a INTEGER);".to_string()])
            .await
            .unwrap();
        store.update_panic_status(location, Phase::Preflight, StatusUpdate::default()).await.unwrap();

        let mut status = Phase::Preflight;
        for _ in 0..6 {
            status = workflow.step(location).await.unwrap();
            if status.is_terminal() {
                break;
            }
        }

        assert_eq!(status, Phase::PrOpen);
        let record = store.get_panic_fix(location).await.unwrap().unwrap();
        assert_eq!(record.branch_name.as_deref(), Some("fix/panic-src-vdbe-c-1234"));
        assert!(record.pr_url.is_some());
    }

    #[tokio::test]
    async fn preflight_failure_sets_workflow_error() {
        let (workflow, store, sandbox) = workflow().await;
        sandbox.script(
            "make",
            bf_sandbox::CommandOutput { stdout: String::new(), stderr: "compile error".into(), exit_code: 1 },
        );
        let location = "src/vdbe.c:1234";
        store.create_panic_fix(location, "assertion failed", &[]).await.unwrap();
        store.update_panic_status(location, Phase::Preflight, StatusUpdate::default()).await.unwrap();

        let status = workflow.step(location).await.unwrap();

        assert_eq!(status, Phase::NeedsHumanReview);
        let record = store.get_panic_fix(location).await.unwrap().unwrap();
        let err = record.workflow_error.unwrap();
        assert_eq!(err.phase, Phase::Preflight);
        assert!(err.error.starts_with("Build failed:"));
    }

    #[tokio::test]
    async fn terminal_status_is_a_noop() {
        let (workflow, store, _sandbox) = workflow().await;
        let location = "src/vdbe.c:1234";
        store.create_panic_fix(location, "msg", &[]).await.unwrap();
        store
            .mark_needs_human_review(
                location,
                WorkflowError { phase: Phase::Preflight, error: "boom".into(), timestamp: Utc::now() },
            )
            .await
            .unwrap();

        let status = workflow.step(location).await.unwrap();
        assert_eq!(status, Phase::NeedsHumanReview);
    }
}
