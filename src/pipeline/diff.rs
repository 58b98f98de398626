//! Diff calculation between the known snapshot and the current crawl.
//!
//! Membership is decided by exact string equality. Output order follows the
//! iteration order of the source slice, so sorted inputs give sorted output.
//! Repeated entries are reported once.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::DiffMode;

/// URLs that disappeared from and appeared on the watched page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlDiff {
    /// In `known` but not in `current`
    pub removed: Vec<String>,
    /// In `current` but not in `known`
    pub added: Vec<String>,
}

impl UrlDiff {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len()
    }
}

/// Calculator for computing diffs between snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffCalculator {
    mode: DiffMode,
}

impl DiffCalculator {
    /// Create a calculator reporting both additions and removals.
    pub fn new() -> Self {
        Self::with_mode(DiffMode::Symmetric)
    }

    /// Create a diff calculator that only reports additions.
    pub fn additions_only() -> Self {
        Self::with_mode(DiffMode::AdditionsOnly)
    }

    pub fn with_mode(mode: DiffMode) -> Self {
        Self { mode }
    }

    /// Calculate the diff between the known and current URL lists.
    ///
    /// In additions-only mode `removed` is always empty.
    pub fn calculate(&self, known: &[String], current: &[String]) -> UrlDiff {
        let added = missing_from(current, known);
        let removed = match self.mode {
            DiffMode::Symmetric => missing_from(known, current),
            DiffMode::AdditionsOnly => Vec::new(),
        };

        UrlDiff { removed, added }
    }
}

/// Entries of `source` absent from `other`, each at most once.
fn missing_from(source: &[String], other: &[String]) -> Vec<String> {
    let other: HashSet<&str> = other.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();

    source
        .iter()
        .filter(|url| !other.contains(url.as_str()) && seen.insert(url.as_str()))
        .cloned()
        .collect()
}

/// Convenience function for a full symmetric diff.
pub fn calculate_diff(known: &[String], current: &[String]) -> UrlDiff {
    DiffCalculator::new().calculate(known, current)
}
