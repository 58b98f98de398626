// src/services/extractor.rs

//! Page extractor service.
//!
//! Fetches the watched page and collects the item links on it.

use std::collections::BTreeSet;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::utils::http::{create_async_client, fetch_fresh_text};
use crate::utils::join_item_url;

const LINK_SELECTOR: &str = "a[href]";

/// Anything that can produce the current item URLs of a page.
#[async_trait]
pub trait LinkSource: Send + Sync {
    /// Return the page's item URLs, deduplicated and sorted.
    ///
    /// Fails if the page cannot be retrieved; never returns a partial list.
    async fn extract(&self, page_url: &str) -> Result<Vec<String>>;
}

/// Extracts item links from a live page over HTTP.
pub struct PageExtractor {
    client: Client,
    item_prefix: String,
}

impl PageExtractor {
    /// Create an extractor with its own client built from the crawler settings.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = create_async_client(config)?;
        Ok(Self::with_client(client, &config.item_prefix))
    }

    pub fn with_client(client: Client, item_prefix: impl Into<String>) -> Self {
        Self {
            client,
            item_prefix: item_prefix.into(),
        }
    }
}

#[async_trait]
impl LinkSource for PageExtractor {
    async fn extract(&self, page_url: &str) -> Result<Vec<String>> {
        let html = fetch_fresh_text(&self.client, page_url).await?;
        let urls = extract_item_urls(&html, page_url, &self.item_prefix)?;
        log::debug!("Extracted {} item urls from {}", urls.len(), page_url);
        Ok(urls)
    }
}

/// Collect item URLs from an HTML document.
///
/// Keeps anchors whose `href` starts with `item_prefix`, appends each to
/// `page_url`, and returns the distinct results in lexicographic order.
pub fn extract_item_urls(html: &str, page_url: &str, item_prefix: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let selector = parse_selector(LINK_SELECTOR)?;

    let unique: BTreeSet<String> = item_hrefs(&document, &selector, item_prefix)
        .map(|href| join_item_url(page_url, href))
        .collect();

    Ok(unique.into_iter().collect())
}

/// Lazily yield matching hrefs in document order.
fn item_hrefs<'a>(
    document: &'a Html,
    selector: &'a Selector,
    item_prefix: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    document
        .select(selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(move |href| href.starts_with(item_prefix))
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::crawl("selector", format!("{s}: {e:?}")))
}
