// SPDX-License-Identifier: MIT

//! Process-wide heartbeat tracker agents report to during a run.
//!
//! Purely observational: the engine never reads this to decide whether a
//! phase finished — completion is always the subprocess's own exit or the
//! wall-clock deadline (see [`crate::driver`]).

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

/// One instance is shared across every concurrent agent spawn; heartbeats
/// are keyed by session name so agents on distinct sessions never collide.
#[derive(Default)]
pub struct IpcServer {
    last_seen: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl IpcServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_heartbeat(&self, session: &str, at: DateTime<Utc>) {
        self.last_seen.lock().insert(session.to_string(), at);
    }

    pub fn last_seen(&self, session: &str) -> Option<DateTime<Utc>> {
        self.last_seen.lock().get(session).copied()
    }

    pub fn forget(&self, session: &str) {
        self.last_seen.lock().remove(session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heartbeats_are_scoped_per_session() {
        let ipc = IpcServer::new();
        let t1 = Utc::now();
        ipc.record_heartbeat("session-a", t1);
        assert_eq!(ipc.last_seen("session-a"), Some(t1));
        assert_eq!(ipc.last_seen("session-b"), None);
    }

    #[test]
    fn later_heartbeat_overwrites_earlier_one() {
        let ipc = IpcServer::new();
        let t1 = Utc::now();
        let t2 = t1 + chrono::Duration::seconds(5);
        ipc.record_heartbeat("session-a", t1);
        ipc.record_heartbeat("session-a", t2);
        assert_eq!(ipc.last_seen("session-a"), Some(t2));
    }

    #[test]
    fn forget_clears_last_seen() {
        let ipc = IpcServer::new();
        ipc.record_heartbeat("session-a", Utc::now());
        ipc.forget("session-a");
        assert_eq!(ipc.last_seen("session-a"), None);
    }
}
