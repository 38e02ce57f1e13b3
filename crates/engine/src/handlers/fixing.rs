// SPDX-License-Identifier: MIT

//! `fixing`: spawns the fixer agent, then lints, formats, and commits
//! whatever it changed. Lint/format failures are warnings, not escalations
//! — they don't block the fix from shipping, just get logged for a human
//! to notice later.

use crate::types::{HandlerContext, HandlerOutcome};
use bf_agent::{AgentConfig, AgentKind};
use bf_core::{Clock, LogEvent, LogLevel, Phase};
use std::path::Path;

const PROMPT_PATH: &str = "prompts/fixer.md";

async fn log_warning<C: Clock>(ctx: &HandlerContext<'_, C>, message: impl Into<String>) {
    let event = LogEvent::new(LogLevel::Warn, message, ctx_now())
        .for_panic(&ctx.panic.panic_location, Phase::Fixing);
    let _ = ctx.store.insert_log(event).await;
}

// A handler-local clock read; logging timestamps don't need to come from
// the engine's injected clock, matching the "purely observational" status
// of LogEvent (§3).
fn ctx_now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}

pub async fn run<C: Clock>(ctx: &HandlerContext<'_, C>) -> HandlerOutcome {
    let session = ctx.session_name;
    let agent_config =
        AgentConfig { reproducer_timeout_ms: ctx.config.reproducer_timeout_ms, fixer_timeout_ms: ctx.config.fixer_timeout_ms };

    let outcome = match ctx
        .agent
        .spawn_agent(AgentKind::Fixer, session, Path::new(PROMPT_PATH), agent_config, ctx.ipc)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => return HandlerOutcome::escalate(format!("agent driver error: {e}")),
    };

    if outcome.timed_out {
        return HandlerOutcome::escalate(format!(
            "Fixer agent timed out after {}ms (limit {}ms)",
            outcome.elapsed_ms, ctx.config.fixer_timeout_ms
        ));
    }
    if !outcome.success {
        return HandlerOutcome::escalate(format!("Fixer agent failed (exit {:?}): {}", outcome.exit_code, outcome.stderr));
    }

    match ctx.sandbox.run_in_session(session, "cargo clippy --fix --allow-dirty --all-features").await {
        Ok(out) if !out.is_success() => log_warning(ctx, format!("cargo clippy --fix failed: {}", out.stderr)).await,
        Ok(_) => {}
        Err(e) => log_warning(ctx, format!("cargo clippy --fix errored: {e}")).await,
    }
    match ctx.sandbox.run_in_session(session, "cargo fmt").await {
        Ok(out) if !out.is_success() => log_warning(ctx, format!("cargo fmt failed: {}", out.stderr)).await,
        Ok(_) => {}
        Err(e) => log_warning(ctx, format!("cargo fmt errored: {e}")).await,
    }

    let add = match ctx.sandbox.run_in_session(session, "git add -A").await {
        Ok(out) => out,
        Err(e) => return HandlerOutcome::escalate(format!("sandbox unreachable: {e}")),
    };
    if !add.is_success() {
        return HandlerOutcome::escalate(format!("git add -A failed: {}", add.stderr));
    }

    let commit_msg = format!("fix: {}", ctx.panic.panic_location);
    let escaped = bf_core::escape::escape_single_quoted(&commit_msg);
    let commit = match ctx.sandbox.run_in_session(session, &format!("git commit -m '{escaped}'")).await {
        Ok(out) => out,
        Err(e) => return HandlerOutcome::escalate(format!("sandbox unreachable: {e}")),
    };
    if !commit.is_success() {
        let combined = format!("{}{}", commit.stdout, commit.stderr);
        if combined.contains("nothing to commit") {
            log_warning(ctx, "fixer produced no changes to commit".to_string()).await;
        } else {
            return HandlerOutcome::escalate(format!("git commit failed: {}", commit.stderr));
        }
    }

    HandlerOutcome::advance(Phase::Shipping)
}
