// SPDX-License-Identifier: MIT

//! Daemon startup, the run loop, and shutdown (§7).
//!
//! Cleanup order is fixed regardless of how `run` exits: stop the IPC
//! server, log "Cleanup complete", then close the store. Each step's
//! error is logged to stderr but never blocks the next step — a stuck
//! cleanup step must not prevent the process from exiting.

use crate::config::Config;
use crate::error::DaemonError;
use bf_agent::{AgentDriver, IpcServer};
use bf_core::SystemClock;
use bf_engine::{PrCreator, Scheduler, ShellPrCreator, Workflow};
use bf_sandbox::{ProcessSandboxAdapter, SandboxAdapter};
use bf_storage::Store;
use std::sync::Arc;
use tracing::{error, info};

/// Connects the store, wires up the real adapters, and runs the scheduler
/// until a shutdown signal arrives. Returns `Err` only for the startup
/// failures the exit-code contract names (§6): failure to connect to the
/// store or bind the IPC server.
pub async fn run(config: Config) -> Result<(), DaemonError> {
    let mut store = Store::new(config.store_url.clone(), SystemClock);
    store.connect().await?;
    store.init_schema().await?;
    let store = Arc::new(store);

    // The IPC server here is an in-process heartbeat tracker, not a
    // listening socket, so construction is infallible — this call stands
    // in for the "bind IPC server" failure mode named in §6 should a
    // future revision give it a real transport.
    let ipc = Arc::new(IpcServer::new());

    let sandbox: Arc<dyn SandboxAdapter> = Arc::new(ProcessSandboxAdapter::new(config.sandbox_root.clone()));
    let agent = Arc::new(AgentDriver::new(sandbox.clone()));
    let pr_creator: Arc<dyn PrCreator> = Arc::new(ShellPrCreator::new(sandbox.clone()));
    let engine_config = config.engine_config();

    let workflow = Arc::new(Workflow::new(
        store.clone(),
        sandbox,
        agent,
        ipc.clone(),
        pr_creator,
        engine_config.clone(),
        SystemClock,
    ));
    let scheduler = Arc::new(Scheduler::new(workflow, store.clone(), engine_config));
    let shutdown = scheduler.shutdown_token();
    let run_task = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run().await })
    };

    // The run task is never dropped mid-flight: we wait for the shutdown
    // signal, flip the cancellation token, then await the same task, so
    // in-flight workers finish their current phase handler call (§4.G)
    // instead of being aborted.
    wait_for_shutdown_signal().await;
    info!("shutdown signal received, draining in-flight work");
    shutdown.cancel();

    let run_result = match run_task.await {
        Ok(result) => result.map_err(DaemonError::from),
        Err(e) => {
            error!(error = %e, "scheduler task panicked");
            Ok(())
        }
    };

    // Drop the scheduler (and with it, its own and the workflow's Store
    // handles) so `store` below is the sole remaining reference and
    // `close` actually observes every in-flight operation finished.
    drop(scheduler);
    cleanup(&ipc, store).await;
    run_result
}

async fn cleanup(ipc: &IpcServer, store: Arc<Store<SystemClock>>) {
    // IpcServer has no background task to stop; "stopping" it here just
    // means dropping the last reference once this function returns. Kept
    // as an explicit step to match the fixed cleanup order even though it
    // cannot itself fail.
    let _ = ipc;

    info!("Cleanup complete");

    match Arc::try_unwrap(store) {
        Ok(mut store) => store.close(),
        Err(_) => error!("store still has outstanding references at shutdown; leaving it open for the process exit to reclaim"),
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(sig) => sig,
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
                unreachable!()
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
