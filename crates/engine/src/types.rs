// SPDX-License-Identifier: MIT

//! The shapes phase handlers take as input and hand back as output.

use crate::config::EngineConfig;
use crate::pr::PrCreator;
use bf_agent::{AgentDriver, IpcServer};
use bf_core::{Clock, PanicFix, Phase};
use bf_sandbox::SandboxAdapter;
use bf_storage::Store;
use std::sync::Arc;

/// Everything a phase handler needs, threaded in by the workflow engine.
/// Handlers retain none of this between calls — see the crate-level design
/// note on cross-subprocess state.
pub struct HandlerContext<'a, C: Clock> {
    pub panic: &'a PanicFix,
    pub session_name: &'a str,
    pub branch_name: &'a str,
    pub config: &'a EngineConfig,
    pub sandbox: &'a (dyn SandboxAdapter + 'static),
    pub agent: &'a AgentDriver,
    pub ipc: &'a IpcServer,
    pub pr_creator: &'a (dyn PrCreator + 'static),
    pub store: &'a Store<C>,
}

impl<'a, C: Clock> HandlerContext<'a, C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        panic: &'a PanicFix,
        session_name: &'a str,
        branch_name: &'a str,
        config: &'a EngineConfig,
        sandbox: &'a (dyn SandboxAdapter + 'static),
        agent: &'a AgentDriver,
        ipc: &'a IpcServer,
        pr_creator: &'a (dyn PrCreator + 'static),
        store: &'a Store<C>,
    ) -> Self {
        Self { panic, session_name, branch_name, config, sandbox, agent, ipc, pr_creator, store }
    }
}

/// What a phase handler decides next: the outgoing status, plus whichever
/// optional fields it produced along the way.
#[derive(Debug, Clone, Default)]
pub struct HandlerOutcome {
    pub next_status: Option<Phase>,
    pub error: Option<String>,
    pub branch_name: Option<String>,
    pub pr_url: Option<String>,
}

impl HandlerOutcome {
    pub fn advance(next: Phase) -> Self {
        Self { next_status: Some(next), ..Default::default() }
    }

    pub fn advance_with_branch(next: Phase, branch_name: impl Into<String>) -> Self {
        Self { next_status: Some(next), branch_name: Some(branch_name.into()), ..Default::default() }
    }

    pub fn advance_with_pr_url(next: Phase, pr_url: impl Into<String>) -> Self {
        Self { next_status: Some(next), pr_url: Some(pr_url.into()), ..Default::default() }
    }

    pub fn escalate(error: impl Into<String>) -> Self {
        Self { next_status: Some(Phase::NeedsHumanReview), error: Some(error.into()), ..Default::default() }
    }
}
