// src/models/mod.rs

//! Domain models for the watcher.
//!
//! Everything here is plain data: configuration, secret values and the
//! record of a finished run.

mod config;
mod outcome;
mod secret;

pub use config::{
    BaselinePolicy, Config, CrawlerConfig, DiffMode, NotifyConfig, PolicyConfig, SnapshotConfig,
    SnapshotLocation,
};
pub use outcome::{RunOutcome, RunStatus};
pub use secret::{SecretKind, SecretValue};
