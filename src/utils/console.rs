// src/utils/console.rs

//! Human-readable console output for the CLI.
//!
//! Library code logs through `log`; this module only formats the end-of-run
//! report a person reads in a terminal.

use chrono::Local;

use crate::models::{RunOutcome, RunStatus};

fn stamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Print a header block.
pub fn header(title: &str) {
    let border = "═".repeat(60);
    println!("[{}] {}", stamp(), border);
    println!("[{}]   {}", stamp(), title);
    println!("[{}] {}", stamp(), border);
}

/// Print a summary section.
pub fn summary(title: &str, items: &[(&str, String)]) {
    println!("[{}] [SUMMARY] {}", stamp(), title);
    for (key, value) in items {
        println!("    {}: {}", key, value);
    }
}

/// Print a labelled bullet list, skipped when empty.
pub fn url_list(label: &str, urls: &[String]) {
    if urls.is_empty() {
        return;
    }
    println!("    {} ({}):", label, urls.len());
    for url in urls {
        println!("      - {}", url);
    }
}

pub fn status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Unchanged => "no change",
        RunStatus::Notified => "notified",
        RunStatus::DryRun => "changes found (dry run)",
    }
}

/// Print the full report for a finished run.
pub fn report(outcome: &RunOutcome) {
    summary(
        &outcome.page_url,
        &[
            ("Status", status_label(outcome.status).to_string()),
            ("Known", outcome.known.len().to_string()),
            ("Current", outcome.current.len().to_string()),
            ("Elapsed", format!("{}ms", outcome.elapsed_ms())),
        ],
    );
    url_list("Removed", &outcome.removed);
    url_list("Added", &outcome.added);
}
