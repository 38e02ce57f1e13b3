// SPDX-License-Identifier: MIT

//! `reproducing`: spawns the reproducer agent, which is expected to commit
//! its own changes filling in `failing_seed`, `why_simulator_missed`, and
//! `simulator_changes` in `panic_context.md`. This handler does not verify
//! that document — the final check happens in `shipping`.

use crate::types::{HandlerContext, HandlerOutcome};
use bf_agent::{AgentConfig, AgentKind};
use bf_core::{Clock, Phase};
use std::path::Path;

const PROMPT_PATH: &str = "prompts/reproducer.md";

pub async fn run<C: Clock>(ctx: &HandlerContext<'_, C>) -> HandlerOutcome {
    let agent_config =
        AgentConfig { reproducer_timeout_ms: ctx.config.reproducer_timeout_ms, fixer_timeout_ms: ctx.config.fixer_timeout_ms };

    let outcome = match ctx
        .agent
        .spawn_agent(AgentKind::Reproducer, ctx.session_name, Path::new(PROMPT_PATH), agent_config, ctx.ipc)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => return HandlerOutcome::escalate(format!("agent driver error: {e}")),
    };

    if outcome.timed_out {
        return HandlerOutcome::escalate(format!(
            "Reproducer agent timed out after {}ms (limit {}ms)",
            outcome.elapsed_ms, ctx.config.reproducer_timeout_ms
        ));
    }
    if !outcome.success {
        return HandlerOutcome::escalate(format!(
            "Reproducer agent failed (exit {:?}): {}",
            outcome.exit_code, outcome.stderr
        ));
    }

    HandlerOutcome::advance(Phase::Fixing)
}
