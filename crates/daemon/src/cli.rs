// SPDX-License-Identifier: MIT

//! `bugfixd`'s command line surface (§9): run the scheduler until
//! shutdown, or seed a panic directly via `ingest` without a separate
//! ingestion service.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "bugfixd", about = "Autonomous bug-remediation orchestrator daemon")]
pub struct Cli {
    /// Path to an optional TOML config file overlaying built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the scheduler until SIGINT/SIGTERM (the default when no
    /// subcommand is given).
    Run {
        #[arg(long)]
        worker_pool_size: Option<usize>,
        #[arg(long)]
        poll_interval_ms: Option<u64>,
        #[arg(long = "store")]
        store_url: Option<String>,
        #[arg(long)]
        skip_preflight: bool,
    },
    /// Seed a panic directly against the configured store.
    Ingest {
        /// Panic location, e.g. `src/vdbe.c:1234`.
        location: String,
        /// Panic message as reported by the target program.
        message: String,
        /// Path to a file of newline-separated SQL statements that
        /// trigger the panic.
        sql_file: PathBuf,
    },
}
