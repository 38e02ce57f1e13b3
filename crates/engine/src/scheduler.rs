// SPDX-License-Identifier: MIT

//! The bounded worker pool (§4.G): polls the store for `pending` panics,
//! claims them, and drives each through [`Workflow::step`] until it
//! reaches a terminal status. Shutdown is cooperative — in-flight workers
//! finish their current phase handler call before the pool drains.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::workflow::Workflow;
use bf_core::{Clock, Phase};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Polls for pending panics and drives claimed ones to completion with at
/// most `worker_pool_size` running concurrently.
pub struct Scheduler<C: Clock> {
    workflow: Arc<Workflow<C>>,
    store: Arc<bf_storage::Store<C>>,
    config: EngineConfig,
    shutdown: CancellationToken,
}

impl<C: Clock + 'static> Scheduler<C> {
    pub fn new(workflow: Arc<Workflow<C>>, store: Arc<bf_storage::Store<C>>, config: EngineConfig) -> Self {
        Self { workflow, store, config, shutdown: CancellationToken::new() }
    }

    /// A token that, when cancelled, tells [`Scheduler::run`] to stop
    /// claiming new panics and return once in-flight work has drained.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Poll-claim-dispatch loop. Returns once `shutdown_token` is
    /// cancelled and every in-flight worker has finished its current
    /// handler call.
    pub async fn run(&self) -> Result<(), EngineError> {
        let semaphore = Arc::new(Semaphore::new(self.config.worker_pool_size.max(1)));
        let mut workers: JoinSet<()> = JoinSet::new();
        let entry_phase = if self.config.skip_preflight { Phase::RepoSetup } else { Phase::Preflight };

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            let pending = match self.store.get_pending_panics(self.config.worker_pool_size).await {
                Ok(p) => p,
                Err(e) => {
                    error!(error = %e, "failed to poll for pending panics");
                    Vec::new()
                }
            };

            for panic in pending {
                let Ok(permit) = semaphore.clone().try_acquire_owned() else {
                    break;
                };
                let claimed = match self.store.try_claim(&panic.panic_location, Phase::Pending, entry_phase).await {
                    Ok(Some(p)) => p,
                    Ok(None) => {
                        drop(permit);
                        continue;
                    }
                    Err(e) => {
                        error!(error = %e, panic_location = %panic.panic_location, "failed to claim panic");
                        drop(permit);
                        continue;
                    }
                };
                info!(panic_location = %claimed.panic_location, phase = %entry_phase, "claimed panic");

                let workflow = self.workflow.clone();
                let location = claimed.panic_location.clone();
                let shutdown = self.shutdown.clone();
                workers.spawn(async move {
                    let _permit = permit;
                    drive_to_terminal(&workflow, &location, &shutdown).await;
                });
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(std::time::Duration::from_millis(self.config.poll_interval_ms)) => {}
                Some(result) = workers.join_next(), if !workers.is_empty() => {
                    if let Err(e) = result {
                        warn!(error = %e, "worker task panicked");
                    }
                }
            }
        }

        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "worker task panicked during drain");
            }
        }
        Ok(())
    }
}

/// Drive one claimed panic through handler calls until it reaches a
/// terminal phase, or `shutdown` is cancelled. Each call is independently
/// durable — a crash (or a cooperative release at a phase boundary)
/// between calls just leaves the panic at whatever status the last
/// successful call persisted, ready to resume from there (§5). There is
/// no mid-handler interrupt: a cancellation observed between calls lets
/// the worker release only after the handler call in flight has returned
/// and been persisted (§4.G).
async fn drive_to_terminal<C: Clock>(workflow: &Workflow<C>, location: &str, shutdown: &CancellationToken) {
    loop {
        match workflow.step(location).await {
            Ok(phase) if phase.is_terminal() => {
                info!(panic_location = %location, phase = %phase, "panic reached terminal phase");
                return;
            }
            Ok(phase) => {
                if shutdown.is_cancelled() {
                    info!(
                        panic_location = %location,
                        phase = %phase,
                        "shutdown in progress; releasing worker at phase boundary"
                    );
                    return;
                }
                continue;
            }
            Err(e) => {
                error!(error = %e, panic_location = %location, "workflow step failed; abandoning for this poll cycle");
                return;
            }
        }
    }
}
