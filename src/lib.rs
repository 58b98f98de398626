// src/lib.rs

//! Storefront watcher library.
//!
//! Crawls one page, diffs its item links against the last stored snapshot,
//! posts a chat message when something changed and stores the new snapshot.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod runner;
pub mod services;
pub mod storage;
pub mod utils;
