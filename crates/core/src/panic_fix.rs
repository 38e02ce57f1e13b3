// SPDX-License-Identifier: MIT

//! The `PanicFix` durable entity and its append-only `LogEvent` companion.

use crate::phase::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A structured record of why a panic was escalated to a human.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowError {
    pub phase: Phase,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// The primary durable entity: one row per reported panic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanicFix {
    pub panic_location: String,
    pub panic_message: String,
    pub sql_statements: Vec<String>,
    pub status: Phase,
    pub retry_count: u32,
    pub branch_name: Option<String>,
    pub pr_url: Option<String>,
    pub workflow_error: Option<WorkflowError>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PanicFix {
    /// Construct a freshly-ingested panic (`status = pending`).
    pub fn new(
        panic_location: impl Into<String>,
        panic_message: impl Into<String>,
        sql_statements: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            panic_location: panic_location.into(),
            panic_message: panic_message.into(),
            sql_statements,
            status: Phase::Pending,
            retry_count: 0,
            branch_name: None,
            pr_url: None,
            workflow_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// `sql_statements` joined by newline, as stored/passed to handlers.
    pub fn sql_statements_joined(&self) -> String {
        self.sql_statements.join("\n")
    }
}

/// Severity of a [`LogEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    System,
}

/// An append-only, purely observational log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub id: uuid::Uuid,
    pub panic_location: Option<String>,
    pub phase: Option<Phase>,
    pub level: LogLevel,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl LogEvent {
    pub fn new(level: LogLevel, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            panic_location: None,
            phase: None,
            level,
            message: message.into(),
            details: None,
            timestamp,
        }
    }

    pub fn for_panic(mut self, panic_location: impl Into<String>, phase: Phase) -> Self {
        self.panic_location = Some(panic_location.into());
        self.phase = Some(phase);
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_panic_fix_starts_pending() {
        let now = Utc::now();
        let fix = PanicFix::new("loc", "msg", vec!["a".into(), "b".into()], now);
        assert_eq!(fix.status, Phase::Pending);
        assert_eq!(fix.retry_count, 0);
        assert!(fix.branch_name.is_none());
        assert!(fix.pr_url.is_none());
        assert!(fix.workflow_error.is_none());
        assert_eq!(fix.created_at, fix.updated_at);
    }

    #[test]
    fn sql_statements_joined_by_newline() {
        let fix = PanicFix::new("loc", "msg", vec!["a".into(), "b".into()], Utc::now());
        assert_eq!(fix.sql_statements_joined(), "a\nb");
    }

    #[test]
    fn log_event_for_panic_sets_location_and_phase() {
        let event = LogEvent::new(LogLevel::Info, "hello", Utc::now())
            .for_panic("loc", Phase::Fixing);
        assert_eq!(event.panic_location.as_deref(), Some("loc"));
        assert_eq!(event.phase, Some(Phase::Fixing));
    }

    #[test]
    fn log_event_serde_round_trip() {
        let event = LogEvent::new(LogLevel::Warn, "oops", Utc::now())
            .for_panic("loc", Phase::Shipping)
            .with_details(serde_json::json!({"k": "v"}));
        let json = serde_json::to_string(&event).unwrap();
        let parsed: LogEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.message, "oops");
        assert_eq!(parsed.phase, Some(Phase::Shipping));
    }
}
