// SPDX-License-Identifier: MIT

//! `preflight`: environment gating, run once per panic before any branch
//! work begins. Builds and tests the target program as-is; a failure here
//! means the environment itself is broken, not the panic under repair.

use crate::types::{HandlerContext, HandlerOutcome};
use bf_core::{Clock, Phase};

pub async fn run<C: Clock>(ctx: &HandlerContext<'_, C>) -> HandlerOutcome {
    let make = match ctx.sandbox.run_in_session(ctx.session_name, "make").await {
        Ok(out) => out,
        Err(e) => return HandlerOutcome::escalate(format!("sandbox unreachable: {e}")),
    };
    if !make.is_success() {
        return HandlerOutcome::escalate(format!("Build failed: {}", make.stderr));
    }

    let test = match ctx.sandbox.run_in_session(ctx.session_name, "make test").await {
        Ok(out) => out,
        Err(e) => return HandlerOutcome::escalate(format!("sandbox unreachable: {e}")),
    };
    if !test.is_success() {
        return HandlerOutcome::escalate(format!("Tests failed: {}", test.stderr));
    }

    HandlerOutcome::advance(Phase::RepoSetup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::test_support::memory_store;
    use bf_agent::{AgentDriver, IpcServer};
    use bf_core::{FakeClock, PanicFix};
    use bf_sandbox::{CommandOutput, FakeSandboxAdapter};
    use chrono::Utc;
    use std::sync::Arc;

    fn panic() -> PanicFix {
        PanicFix::new("src/vdbe.c:1234", "assertion failed", vec!["SELECT 1;".into()], Utc::now())
    }

    #[tokio::test]
    async fn make_failure_escalates_with_build_failed_prefix() {
        let sandbox = Arc::new(FakeSandboxAdapter::new());
        sandbox.script("make", CommandOutput { stdout: String::new(), stderr: "compile error".into(), exit_code: 1 });
        let agent = AgentDriver::new(sandbox.clone());
        let ipc = IpcServer::new();
        let config = EngineConfig::default();
        let store = memory_store(FakeClock::new(Utc::now())).await;
        let panic = panic();
        let pr = crate::pr::fake::FakePrCreator::new();
        let ctx = HandlerContext::new(&panic, "s", "branch", &config, sandbox.as_ref(), &agent, &ipc, &pr, &store);

        let outcome = run(&ctx).await;
        assert_eq!(outcome.next_status, Some(bf_core::Phase::NeedsHumanReview));
        assert!(outcome.error.unwrap().starts_with("Build failed:"));
    }

    #[tokio::test]
    async fn test_failure_escalates_with_tests_failed_prefix() {
        let sandbox = Arc::new(FakeSandboxAdapter::new());
        sandbox.script("make test", CommandOutput { stdout: String::new(), stderr: "assertion mismatch".into(), exit_code: 1 });
        let agent = AgentDriver::new(sandbox.clone());
        let ipc = IpcServer::new();
        let config = EngineConfig::default();
        let store = memory_store(FakeClock::new(Utc::now())).await;
        let panic = panic();
        let pr = crate::pr::fake::FakePrCreator::new();
        let ctx = HandlerContext::new(&panic, "s", "branch", &config, sandbox.as_ref(), &agent, &ipc, &pr, &store);

        let outcome = run(&ctx).await;
        assert_eq!(outcome.next_status, Some(bf_core::Phase::NeedsHumanReview));
        assert!(outcome.error.unwrap().starts_with("Tests failed:"));
    }

    #[tokio::test]
    async fn success_advances_to_repo_setup() {
        let sandbox = Arc::new(FakeSandboxAdapter::new());
        let agent = AgentDriver::new(sandbox.clone());
        let ipc = IpcServer::new();
        let config = EngineConfig::default();
        let store = memory_store(FakeClock::new(Utc::now())).await;
        let panic = panic();
        let pr = crate::pr::fake::FakePrCreator::new();
        let ctx = HandlerContext::new(&panic, "s", "branch", &config, sandbox.as_ref(), &agent, &ipc, &pr, &store);

        let outcome = run(&ctx).await;
        assert_eq!(outcome.next_status, Some(bf_core::Phase::RepoSetup));
        assert!(outcome.error.is_none());
    }
}
