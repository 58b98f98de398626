// src/pipeline/watch.rs

//! One watch run: load known URLs, crawl, diff, then notify and persist.
//!
//! The snapshot is written only after the notification was accepted, so a
//! failed run leaves the baseline untouched and the next invocation
//! recomputes the same diff.

use std::collections::BTreeSet;

use chrono::Utc;

use crate::error::{Result, Stage};
use crate::models::{BaselinePolicy, Config, RunOutcome, RunStatus};
use crate::pipeline::DiffCalculator;
use crate::services::{LinkSource, Notifier};
use crate::storage::SnapshotStore;

/// Switches for a single run.
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchOptions {
    /// Compute the diff but skip notification and persistence.
    pub dry_run: bool,
}

/// Run the watcher once.
pub async fn run_watch(
    config: &Config,
    store: &dyn SnapshotStore,
    source: &dyn LinkSource,
    notifier: &dyn Notifier,
    options: WatchOptions,
) -> Result<RunOutcome> {
    let started_at = Utc::now();
    let page_url = config.page_url.as_str();
    log::info!("Watching {} (snapshot: {})", page_url, store.location());

    let known = store.load().await.map_err(|e| e.at(Stage::FetchKnown))?;
    let current = source
        .extract(page_url)
        .await
        .map_err(|e| e.at(Stage::Crawl))?;
    log::info!("Known {} urls, found {} on page", known.len(), current.len());

    let diff = DiffCalculator::with_mode(config.policy.diff_mode).calculate(&known, &current);

    let status = if !diff.has_changes() {
        log::info!("No change");
        RunStatus::Unchanged
    } else if options.dry_run {
        log::info!(
            "Dry run: {} added / {} removed, skipping notify and persist",
            diff.added.len(),
            diff.removed.len()
        );
        RunStatus::DryRun
    } else {
        notifier
            .notify(page_url, &diff)
            .await
            .map_err(|e| e.at(Stage::Notify))?;

        let baseline = next_baseline(config.policy.baseline, &known, &current);
        if let Err(e) = store.save(&baseline).await {
            log::error!(
                "Notification was sent but {} was not updated; fix it by hand or expect a repeat: {}",
                store.location(),
                e
            );
            return Err(e.at(Stage::Persist));
        }
        RunStatus::Notified
    };

    let outcome = RunOutcome {
        page_url: page_url.to_string(),
        status,
        known,
        current,
        added: diff.added,
        removed: diff.removed,
        started_at,
        finished_at: Utc::now(),
    };

    match serde_json::to_string(&outcome) {
        Ok(json) => log::info!("result: {}", json),
        Err(e) => log::warn!("Could not serialize run outcome: {}", e),
    }

    Ok(outcome)
}

/// Snapshot to store after a notified change.
pub fn next_baseline(policy: BaselinePolicy, known: &[String], current: &[String]) -> Vec<String> {
    match policy {
        BaselinePolicy::Replace => current.to_vec(),
        BaselinePolicy::Accumulate => known
            .iter()
            .chain(current)
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    }
}
