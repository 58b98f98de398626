// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};

use crate::error::{AppError, Result};
use crate::models::{CrawlerConfig, NotifyConfig};

/// Create the client used to fetch the watched page.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Create the client used to deliver webhook notifications.
pub fn create_notify_client(config: &NotifyConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Headers that ask every cache on the way to hand over a fresh copy.
fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

/// Fetch a page bypassing caches and return its body.
///
/// A non-2xx status is an error; the caller never sees an error page's body.
pub async fn fetch_fresh_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .headers(no_cache_headers())
        .send()
        .await
        .map_err(|e| AppError::crawl(url, e))?;

    let status = response.status();
    log::debug!(
        "GET {} -> {} (headers: {:?})",
        url,
        status,
        response.headers()
    );

    if !status.is_success() {
        return Err(AppError::crawl(url, format!("unexpected status {status}")));
    }

    response.text().await.map_err(|e| AppError::crawl(url, e))
}
