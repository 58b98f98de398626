// src/models/outcome.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Nothing relevant changed; no notification, no write.
    Unchanged,
    /// Notification delivered and snapshot stored.
    Notified,
    /// Changes found but side effects were skipped on request.
    DryRun,
}

/// Record of one run, for logs and the invoking platform. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub page_url: String,
    pub status: RunStatus,
    pub known: Vec<String>,
    pub current: Vec<String>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunOutcome {
    pub fn changed(&self) -> bool {
        self.status != RunStatus::Unchanged
    }

    /// Wall-clock duration of the run in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
