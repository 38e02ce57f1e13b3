// SPDX-License-Identifier: MIT

//! `repo_setup`: creates the fix branch, synthesizes the reproducing TCL
//! test, writes the initial context document, and commits the lot.

use super::heredoc_write_cmd;
use crate::tcl::generate_tcl_test;
use crate::types::{HandlerContext, HandlerOutcome};
use bf_core::slug::tcl_test_path;
use bf_core::{Clock, Phase};

pub async fn run<C: Clock>(ctx: &HandlerContext<'_, C>) -> HandlerOutcome {
    let session = ctx.session_name;

    let checkout = match ctx.sandbox.run_in_session(session, &format!("git checkout -b {}", ctx.branch_name)).await {
        Ok(out) => out,
        Err(e) => return HandlerOutcome::escalate(format!("sandbox unreachable: {e}")),
    };
    if !checkout.is_success() {
        return HandlerOutcome::escalate(format!("git checkout -b failed: {}", checkout.stderr));
    }

    let tcl_path = tcl_test_path(&ctx.panic.panic_location);
    let tcl_body = generate_tcl_test(&ctx.panic.panic_location, &ctx.panic.sql_statements);
    let write_tcl = match ctx.sandbox.run_in_session(session, &heredoc_write_cmd(&tcl_path, &tcl_body)).await {
        Ok(out) => out,
        Err(e) => return HandlerOutcome::escalate(format!("sandbox unreachable: {e}")),
    };
    if !write_tcl.is_success() {
        return HandlerOutcome::escalate(format!("writing {tcl_path} failed: {}", write_tcl.stderr));
    }

    let context_doc = bf_context::generate_initial(
        &ctx.panic.panic_location,
        &ctx.panic.panic_message,
        &ctx.panic.sql_statements,
        &tcl_path,
    );
    let write_context =
        match ctx.sandbox.run_in_session(session, &heredoc_write_cmd("panic_context.md", &context_doc)).await {
            Ok(out) => out,
            Err(e) => return HandlerOutcome::escalate(format!("sandbox unreachable: {e}")),
        };
    if !write_context.is_success() {
        return HandlerOutcome::escalate(format!("writing panic_context.md failed: {}", write_context.stderr));
    }

    let add = match ctx.sandbox.run_in_session(session, "git add -A").await {
        Ok(out) => out,
        Err(e) => return HandlerOutcome::escalate(format!("sandbox unreachable: {e}")),
    };
    if !add.is_success() {
        return HandlerOutcome::escalate(format!("git add -A failed: {}", add.stderr));
    }

    let commit_msg = format!("setup: {}", ctx.panic.panic_location);
    let escaped = bf_core::escape::escape_single_quoted(&commit_msg);
    let commit = match ctx.sandbox.run_in_session(session, &format!("git commit -m '{escaped}'")).await {
        Ok(out) => out,
        Err(e) => return HandlerOutcome::escalate(format!("sandbox unreachable: {e}")),
    };
    if !commit.is_success() {
        return HandlerOutcome::escalate(format!("git commit failed: {}", commit.stderr));
    }

    HandlerOutcome::advance_with_branch(Phase::Reproducing, ctx.branch_name)
}
