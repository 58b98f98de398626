//! Utility functions and helpers.

pub mod console;
pub mod http;

/// Build an item URL by appending `href` to the page URL.
///
/// This is plain concatenation, not RFC 3986 resolution, so stored
/// snapshots keep matching whatever form the page URL was configured in.
pub fn join_item_url(base_url: &str, href: &str) -> String {
    format!("{base_url}{href}")
}
