// SPDX-License-Identifier: MIT

use crate::error::StoreError;
use crate::wal::{Wal, WalEntry};
use bf_core::{Clock, LogEvent, PanicFix, Phase, WorkflowError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Optional fields set alongside a status transition.
#[derive(Debug, Clone, Default)]
pub struct StatusUpdate {
    pub branch_name: Option<String>,
    pub pr_url: Option<String>,
}

enum Connection {
    Disconnected,
    Closed,
    Connected(Mutex<Inner>),
}

struct Inner {
    wal: Wal,
    panics: HashMap<String, PanicFix>,
    logs: Vec<LogEvent>,
}

/// The durable store. `url` is either `:memory:` or a filesystem path to
/// the WAL file backing this store.
pub struct Store<C: Clock> {
    url: String,
    clock: C,
    conn: Connection,
}

impl<C: Clock> Store<C> {
    pub fn new(url: impl Into<String>, clock: C) -> Self {
        Self { url: url.into(), clock, conn: Connection::Disconnected }
    }

    fn wal_path(&self) -> Option<PathBuf> {
        if self.url == ":memory:" {
            None
        } else {
            Some(PathBuf::from(&self.url))
        }
    }

    /// Open the backing WAL. Must be called before [`Store::init_schema`]
    /// and any other operation.
    pub async fn connect(&mut self) -> Result<(), StoreError> {
        let wal = Wal::open(self.wal_path().as_deref())?;
        self.conn = Connection::Connected(Mutex::new(Inner { wal, panics: HashMap::new(), logs: Vec::new() }));
        Ok(())
    }

    /// Replay the WAL into a fresh in-memory index. Idempotent: calling
    /// this twice just replays the same entries into a freshly-zeroed map.
    pub async fn init_schema(&mut self) -> Result<(), StoreError> {
        let inner = self.connected()?;
        let mut guard = inner.lock();
        let entries = guard.wal.replay()?;
        guard.panics.clear();
        guard.logs.clear();
        for entry in entries {
            apply(&mut guard, entry);
        }
        debug!(panics = guard.panics.len(), logs = guard.logs.len(), "store schema initialized");
        Ok(())
    }

    /// Release the store handle. Every operation after this fails with
    /// [`StoreError::Closed`].
    pub fn close(&mut self) {
        self.conn = Connection::Closed;
    }

    fn connected(&self) -> Result<&Mutex<Inner>, StoreError> {
        match &self.conn {
            Connection::Disconnected => Err(StoreError::NotConnected),
            Connection::Closed => Err(StoreError::Closed),
            Connection::Connected(inner) => Ok(inner),
        }
    }

    pub async fn create_panic_fix(
        &self,
        location: &str,
        message: &str,
        sql: &[String],
    ) -> Result<PanicFix, StoreError> {
        let inner = self.connected()?;
        let mut guard = inner.lock();
        if guard.panics.contains_key(location) {
            return Err(StoreError::AlreadyExists(location.to_string()));
        }
        let now = self.clock.now();
        let entry = WalEntry::PanicCreated {
            panic_location: location.to_string(),
            panic_message: message.to_string(),
            sql_statements: sql.to_vec(),
            created_at: now,
        };
        guard.wal.append(&entry)?;
        match apply(&mut guard, entry) {
            Some(p) => Ok(p),
            None => Err(StoreError::NotFound(location.to_string())),
        }
    }

    pub async fn get_panic_fix(&self, location: &str) -> Result<Option<PanicFix>, StoreError> {
        let inner = self.connected()?;
        Ok(inner.lock().panics.get(location).cloned())
    }

    /// At most `limit` `pending` panics, oldest `created_at` first.
    pub async fn get_pending_panics(&self, limit: usize) -> Result<Vec<PanicFix>, StoreError> {
        let inner = self.connected()?;
        let guard = inner.lock();
        let mut pending: Vec<PanicFix> =
            guard.panics.values().filter(|p| p.status == Phase::Pending).cloned().collect();
        pending.sort_by_key(|p| p.created_at);
        pending.truncate(limit);
        Ok(pending)
    }

    /// Atomically set `status` and the optional `branch_name`/`pr_url`
    /// fields. Fails with [`StoreError::NotFound`] if the panic doesn't
    /// exist; the caller is responsible for checking the transition is
    /// legal via [`Phase::can_transition_to`] before calling this.
    pub async fn update_panic_status(
        &self,
        location: &str,
        status: Phase,
        fields: StatusUpdate,
    ) -> Result<PanicFix, StoreError> {
        let inner = self.connected()?;
        let mut guard = inner.lock();
        if !guard.panics.contains_key(location) {
            return Err(StoreError::NotFound(location.to_string()));
        }
        let now = self.clock.now();
        let entry = WalEntry::StatusUpdated {
            panic_location: location.to_string(),
            status,
            branch_name: fields.branch_name,
            pr_url: fields.pr_url,
            updated_at: now,
        };
        guard.wal.append(&entry)?;
        match apply(&mut guard, entry) {
            Some(p) => Ok(p),
            None => Err(StoreError::NotFound(location.to_string())),
        }
    }

    /// Attempt `status -> status` transition only if `from` still matches
    /// the currently-persisted status. Used by the scheduler to claim a
    /// pending panic without a worker racing another worker onto the same
    /// row — the write itself is already serialized by the inner lock, so
    /// this just adds the compare-and-swap semantics on top.
    pub async fn try_claim(
        &self,
        location: &str,
        from: Phase,
        to: Phase,
    ) -> Result<Option<PanicFix>, StoreError> {
        let inner = self.connected()?;
        let mut guard = inner.lock();
        match guard.panics.get(location) {
            Some(p) if p.status == from => {}
            _ => return Ok(None),
        }
        let now = self.clock.now();
        let entry = WalEntry::StatusUpdated {
            panic_location: location.to_string(),
            status: to,
            branch_name: None,
            pr_url: None,
            updated_at: now,
        };
        guard.wal.append(&entry)?;
        Ok(apply(&mut guard, entry))
    }

    pub async fn increment_retry_count(&self, location: &str) -> Result<PanicFix, StoreError> {
        let inner = self.connected()?;
        let mut guard = inner.lock();
        if !guard.panics.contains_key(location) {
            return Err(StoreError::NotFound(location.to_string()));
        }
        let now = self.clock.now();
        let entry = WalEntry::RetryIncremented { panic_location: location.to_string(), updated_at: now };
        guard.wal.append(&entry)?;
        match apply(&mut guard, entry) {
            Some(p) => Ok(p),
            None => Err(StoreError::NotFound(location.to_string())),
        }
    }

    pub async fn reset_retry_count(&self, location: &str) -> Result<PanicFix, StoreError> {
        let inner = self.connected()?;
        let mut guard = inner.lock();
        if !guard.panics.contains_key(location) {
            return Err(StoreError::NotFound(location.to_string()));
        }
        let now = self.clock.now();
        let entry = WalEntry::RetryReset { panic_location: location.to_string(), updated_at: now };
        guard.wal.append(&entry)?;
        match apply(&mut guard, entry) {
            Some(p) => Ok(p),
            None => Err(StoreError::NotFound(location.to_string())),
        }
    }

    pub async fn mark_needs_human_review(
        &self,
        location: &str,
        workflow_error: WorkflowError,
    ) -> Result<PanicFix, StoreError> {
        let inner = self.connected()?;
        let mut guard = inner.lock();
        if !guard.panics.contains_key(location) {
            return Err(StoreError::NotFound(location.to_string()));
        }
        let now = self.clock.now();
        let entry = WalEntry::NeedsHumanReview {
            panic_location: location.to_string(),
            workflow_error,
            updated_at: now,
        };
        guard.wal.append(&entry)?;
        match apply(&mut guard, entry) {
            Some(p) => Ok(p),
            None => Err(StoreError::NotFound(location.to_string())),
        }
    }

    pub async fn insert_log(&self, event: LogEvent) -> Result<(), StoreError> {
        let inner = self.connected()?;
        let mut guard = inner.lock();
        let entry = WalEntry::LogInserted { event };
        guard.wal.append(&entry)?;
        apply(&mut guard, entry);
        Ok(())
    }

    /// The most recent `limit` log events, newest first.
    pub async fn get_logs(&self, limit: usize) -> Result<Vec<LogEvent>, StoreError> {
        let inner = self.connected()?;
        let guard = inner.lock();
        Ok(guard.logs.iter().rev().take(limit).cloned().collect())
    }

    pub async fn get_logs_by_panic_location(
        &self,
        location: &str,
    ) -> Result<Vec<LogEvent>, StoreError> {
        let inner = self.connected()?;
        let guard = inner.lock();
        Ok(guard
            .logs
            .iter()
            .filter(|e| e.panic_location.as_deref() == Some(location))
            .cloned()
            .collect())
    }
}

/// Apply a WAL entry to the in-memory index, returning the affected
/// panic's post-apply state. `None` for entries that touch no panic
/// record (`LogInserted`) or that target a location no longer in the
/// index (a replay race that `init_schema` already tolerates).
fn apply(inner: &mut Inner, entry: WalEntry) -> Option<PanicFix> {
    match entry {
        WalEntry::PanicCreated { panic_location, panic_message, sql_statements, created_at } => {
            let record = PanicFix::new(panic_location.clone(), panic_message, sql_statements, created_at);
            inner.panics.insert(panic_location, record.clone());
            Some(record)
        }
        WalEntry::StatusUpdated { panic_location, status, branch_name, pr_url, updated_at } => {
            let p = inner.panics.get_mut(&panic_location)?;
            p.status = status;
            if branch_name.is_some() {
                p.branch_name = branch_name;
            }
            if pr_url.is_some() {
                p.pr_url = pr_url;
            }
            p.updated_at = updated_at;
            Some(p.clone())
        }
        WalEntry::RetryIncremented { panic_location, updated_at } => {
            let p = inner.panics.get_mut(&panic_location)?;
            p.retry_count += 1;
            p.updated_at = updated_at;
            Some(p.clone())
        }
        WalEntry::RetryReset { panic_location, updated_at } => {
            let p = inner.panics.get_mut(&panic_location)?;
            p.retry_count = 0;
            p.updated_at = updated_at;
            Some(p.clone())
        }
        WalEntry::NeedsHumanReview { panic_location, workflow_error, updated_at } => {
            let p = inner.panics.get_mut(&panic_location)?;
            p.status = Phase::NeedsHumanReview;
            p.workflow_error = Some(workflow_error);
            p.updated_at = updated_at;
            Some(p.clone())
        }
        WalEntry::LogInserted { event } => {
            inner.logs.push(event);
            None
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
