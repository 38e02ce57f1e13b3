// SPDX-License-Identifier: MIT

//! The `ingest` subcommand: seed a panic directly against the configured
//! store, for use without a separate ingestion service (§9).

use crate::error::DaemonError;
use bf_core::SystemClock;
use bf_storage::Store;
use std::path::Path;

pub async fn run(store_url: &str, location: &str, message: &str, sql_file: &Path) -> Result<(), DaemonError> {
    let sql_statements: Vec<String> = std::fs::read_to_string(sql_file)?
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    let mut store = Store::new(store_url, SystemClock);
    store.connect().await?;
    store.init_schema().await?;
    store.create_panic_fix(location, message, &sql_statements).await?;
    store.close();

    tracing::info!(panic_location = %location, statements = sql_statements.len(), "ingested panic");
    Ok(())
}
