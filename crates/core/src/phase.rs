// SPDX-License-Identifier: MIT

//! The fixed set of workflow phases and the edges allowed between them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A panic's position in the workflow. Doubles as the durable `status`
/// column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Pending,
    Preflight,
    RepoSetup,
    Reproducing,
    Fixing,
    Shipping,
    PrOpen,
    NeedsHumanReview,
}

impl Phase {
    /// True if no handler will ever be dispatched for this phase again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::PrOpen | Phase::NeedsHumanReview)
    }

    /// True if `self -> next` is a member of the allowed edge set.
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Pending, Preflight)
                | (Pending, RepoSetup) // skipPreflight boot option
                | (Preflight, RepoSetup)
                | (Preflight, NeedsHumanReview)
                | (RepoSetup, Reproducing)
                | (RepoSetup, NeedsHumanReview)
                | (Reproducing, Fixing)
                | (Reproducing, NeedsHumanReview)
                | (Fixing, Shipping)
                | (Fixing, NeedsHumanReview)
                | (Shipping, PrOpen)
                | (Shipping, NeedsHumanReview)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Pending => "pending",
            Phase::Preflight => "preflight",
            Phase::RepoSetup => "repo_setup",
            Phase::Reproducing => "reproducing",
            Phase::Fixing => "fixing",
            Phase::Shipping => "shipping",
            Phase::PrOpen => "pr_open",
            Phase::NeedsHumanReview => "needs_human_review",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid phase: {0}")]
pub struct ParsePhaseError(String);

impl std::str::FromStr for Phase {
    type Err = ParsePhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pending" => Phase::Pending,
            "preflight" => Phase::Preflight,
            "repo_setup" => Phase::RepoSetup,
            "reproducing" => Phase::Reproducing,
            "fixing" => Phase::Fixing,
            "shipping" => Phase::Shipping,
            "pr_open" => Phase::PrOpen,
            "needs_human_review" => Phase::NeedsHumanReview,
            other => return Err(ParsePhaseError(other.to_string())),
        })
    }
}
