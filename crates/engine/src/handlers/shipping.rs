// SPDX-License-Identifier: MIT

//! `shipping`: the final gate. Validates the accumulated context document,
//! strips it from the branch, squashes the fix into one commit, pushes,
//! and opens the draft pull request.

use crate::types::{HandlerContext, HandlerOutcome};
use bf_context::{parse_and_validate, PanicContextData, ValidationPhase};
use bf_core::{Clock, LogEvent, LogLevel, Phase};

async fn log_warning<C: Clock>(ctx: &HandlerContext<'_, C>, message: impl Into<String>) {
    let event = LogEvent::new(LogLevel::Warn, message, chrono::Utc::now())
        .for_panic(&ctx.panic.panic_location, Phase::Shipping);
    let _ = ctx.store.insert_log(event).await;
}

fn commit_message(panic_message: &str, data: &PanicContextData) -> String {
    format!(
        "fix: {panic_message}\n\n\
         Location: {}\n\
         Bug: {}\n\
         Fix: {}\n\
         Failing seed: {}\n\
         Simulator: {}\n",
        data.panic_location.clone().unwrap_or_default(),
        data.bug_description.clone().unwrap_or_default(),
        data.fix_description.clone().unwrap_or_default(),
        data.failing_seed.clone().unwrap_or_default(),
        data.simulator_changes.clone().unwrap_or_default(),
    )
}

pub async fn run<C: Clock>(ctx: &HandlerContext<'_, C>) -> HandlerOutcome {
    let session = ctx.session_name;

    let cat = match ctx.sandbox.run_in_session(session, "cat panic_context.md").await {
        Ok(out) => out,
        Err(e) => return HandlerOutcome::escalate(format!("sandbox unreachable: {e}")),
    };
    if !cat.is_success() {
        return HandlerOutcome::escalate(format!("could not read panic_context.md: {}", cat.stderr));
    }
    let data = match parse_and_validate(&cat.stdout, ValidationPhase::Ship) {
        Ok(data) => data,
        Err(e) => return HandlerOutcome::escalate(format!("context document invalid: {e}")),
    };

    match ctx.sandbox.run_in_session(session, "rm panic_context.md").await {
        Ok(out) if !out.is_success() => log_warning(ctx, format!("rm panic_context.md failed: {}", out.stderr)).await,
        Ok(_) => {}
        Err(e) => log_warning(ctx, format!("rm panic_context.md errored: {e}")).await,
    }
    match ctx.sandbox.run_in_session(session, "git add -A").await {
        Ok(out) if !out.is_success() => log_warning(ctx, format!("git add -A failed: {}", out.stderr)).await,
        Ok(_) => {}
        Err(e) => log_warning(ctx, format!("git add -A errored: {e}")).await,
    }

    let reset_cmd = format!("git reset --soft $(git merge-base HEAD {})", ctx.config.pr_base);
    let reset = match ctx.sandbox.run_in_session(session, &reset_cmd).await {
        Ok(out) => out,
        Err(e) => return HandlerOutcome::escalate(format!("sandbox unreachable: {e}")),
    };
    if !reset.is_success() {
        return HandlerOutcome::escalate(format!("git reset --soft failed: {}", reset.stderr));
    }

    let message = commit_message(&ctx.panic.panic_message, &data);
    let escaped = bf_core::escape::escape_single_quoted(&message);
    let squash_commit = match ctx.sandbox.run_in_session(session, &format!("git commit -m '{escaped}'")).await {
        Ok(out) => out,
        Err(e) => return HandlerOutcome::escalate(format!("sandbox unreachable: {e}")),
    };
    if !squash_commit.is_success() {
        return HandlerOutcome::escalate(format!("squash commit failed: {}", squash_commit.stderr));
    }

    let push_cmd = format!("git push -u {} {}", ctx.config.pr_remote, ctx.branch_name);
    let push = match ctx.sandbox.run_in_session(session, &push_cmd).await {
        Ok(out) => out,
        Err(e) => return HandlerOutcome::escalate(format!("sandbox unreachable: {e}")),
    };
    if !push.is_success() {
        return HandlerOutcome::escalate(format!("git push failed: {}", push.stderr));
    }

    let title = format!("fix: {}", ctx.panic.panic_message);
    let body = message;
    let pr_url = match ctx.pr_creator.create_pr(session, ctx.branch_name, &ctx.config.pr_base, &title, &body).await {
        Ok(url) => url,
        Err(e) => return HandlerOutcome::escalate(format!("pr creation failed: {e}")),
    };

    HandlerOutcome::advance_with_pr_url(Phase::PrOpen, pr_url)
}
