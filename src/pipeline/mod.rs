//! Pipeline entry points.
//!
//! - `diff`: known vs. current URL comparison
//! - `watch`: one full run wiring store, extractor and notifier

pub mod diff;
pub mod watch;

pub use diff::{DiffCalculator, UrlDiff, calculate_diff};
pub use watch::{WatchOptions, next_baseline, run_watch};
