// SPDX-License-Identifier: MIT

//! Append-only write-ahead log of store mutations.
//!
//! Each mutating [`Store`](crate::Store) call appends one JSON line before
//! the in-memory index is updated. On restart, `Wal::replay` reads every
//! line back in order and the caller folds them into a fresh index —
//! the same snapshot-free recovery shape as replaying a single-relation
//! changelog.

use bf_core::{LogEvent, Phase, WorkflowError};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt wal entry at line {line}: {source}")]
    Corrupt { line: usize, #[source] source: serde_json::Error },
}

/// One durable mutation, in the order it was applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum WalEntry {
    PanicCreated { panic_location: String, panic_message: String, sql_statements: Vec<String>, created_at: chrono::DateTime<chrono::Utc> },
    StatusUpdated { panic_location: String, status: Phase, branch_name: Option<String>, pr_url: Option<String>, updated_at: chrono::DateTime<chrono::Utc> },
    RetryIncremented { panic_location: String, updated_at: chrono::DateTime<chrono::Utc> },
    RetryReset { panic_location: String, updated_at: chrono::DateTime<chrono::Utc> },
    NeedsHumanReview { panic_location: String, workflow_error: WorkflowError, updated_at: chrono::DateTime<chrono::Utc> },
    LogInserted { event: LogEvent },
}

/// A handle to the on-disk log, or `None` when running in `:memory:` mode.
pub struct Wal {
    file: Option<File>,
    path: Option<PathBuf>,
}

impl Wal {
    /// Open (creating if absent) the WAL file at `path`, or construct an
    /// in-memory-only WAL when `path` is `None`.
    pub fn open(path: Option<&Path>) -> Result<Self, WalError> {
        match path {
            None => Ok(Self { file: None, path: None }),
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Ok(Self { file: Some(file), path: Some(path.to_path_buf()) })
            }
        }
    }

    /// Append one entry, flushing to disk before returning. No-op for
    /// `:memory:` WALs.
    pub fn append(&mut self, entry: &WalEntry) -> Result<(), WalError> {
        let Some(file) = self.file.as_mut() else { return Ok(()) };
        let line = serde_json::to_string(entry).map_err(|source| WalError::Corrupt { line: 0, source })?;
        writeln!(file, "{line}")?;
        file.flush()?;
        Ok(())
    }

    /// Replay every entry previously appended, in order. Empty for
    /// `:memory:` WALs or a WAL file that doesn't exist yet.
    pub fn replay(&self) -> Result<Vec<WalEntry>, WalError> {
        let Some(path) = self.path.as_ref() else { return Ok(Vec::new()) };
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(path)?);
        let mut entries = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: WalEntry = serde_json::from_str(&line)
                .map_err(|source| WalError::Corrupt { line: idx + 1, source })?;
            entries.push(entry);
        }
        Ok(entries)
    }
}
