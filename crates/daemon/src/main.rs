// SPDX-License-Identifier: MIT

use bf_daemon::{cli::Command, logging, Cli, Config};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Run {
        worker_pool_size: None,
        poll_interval_ms: None,
        store_url: None,
        skip_preflight: false,
    }) {
        Command::Run { worker_pool_size, poll_interval_ms, store_url, skip_preflight } => {
            if let Some(v) = worker_pool_size {
                config.worker_pool_size = v;
            }
            if let Some(v) = poll_interval_ms {
                config.poll_interval_ms = v;
            }
            if let Some(v) = store_url {
                config.store_url = v;
            }
            if skip_preflight {
                config.skip_preflight = true;
            }
            bf_daemon::lifecycle::run(config).await?;
        }
        Command::Ingest { location, message, sql_file } => {
            bf_daemon::ingest::run(&config.store_url, &location, &message, &sql_file).await?;
        }
    }

    Ok(())
}
