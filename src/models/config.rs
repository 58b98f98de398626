//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::SecretValue;

/// Root configuration for one watch run.
///
/// Built once at start-up (file and/or environment) and then only read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Page whose item links are watched
    #[serde(default)]
    pub page_url: String,

    /// HTTP and link-matching settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Where the known-URL snapshot lives
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Chat notification settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Diff and baseline behavior
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Build configuration purely from the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay process environment variables onto this configuration.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Overlay variables from an arbitrary lookup. Empty values are ignored.
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(*name))
                .find(|value| !value.trim().is_empty())
        };

        if let Some(page_url) = var(&["PAGE_URL", "BOOTH_URL"]) {
            self.page_url = page_url;
        }
        if let Some(prefix) = var(&["ITEM_PATH_PREFIX"]) {
            self.crawler.item_prefix = prefix;
        }
        if let Some(secs) = var(&["HTTP_TIMEOUT_SECS"]) {
            let secs = parse_var("HTTP_TIMEOUT_SECS", &secs)?;
            self.crawler.timeout_secs = secs;
            self.notify.timeout_secs = secs;
        }

        if let Some(bucket) = var(&["S3_BUCKET"]) {
            self.snapshot.bucket = Some(bucket);
        }
        if let Some(key) = var(&["S3_KEY"]) {
            self.snapshot.key = key;
        }
        if let Some(path) = var(&["SNAPSHOT_PATH"]) {
            self.snapshot.path = Some(PathBuf::from(path));
        }

        // Encrypted values win over plain ones.
        if let Some(v) = var(&["ENCRYPTED_WEBHOOK_URL", "ENCRYPTED_SLACK_URL"]) {
            self.notify.webhook_url = Some(SecretValue::Encrypted(v));
        } else if let Some(v) = var(&["WEBHOOK_URL", "SLACK_URL"]) {
            self.notify.webhook_url = Some(SecretValue::Plain(v));
        }
        if let Some(v) = var(&["ENCRYPTED_CHANNEL_NAME", "ENCRYPTED_SLACK_CHANNEL"]) {
            self.notify.channel = Some(SecretValue::Encrypted(v));
        } else if let Some(v) = var(&["CHANNEL_NAME", "SLACK_CHANNEL"]) {
            self.notify.channel = Some(SecretValue::Plain(v));
        }

        if let Some(mode) = var(&["DIFF_MODE"]) {
            self.policy.diff_mode = mode.parse()?;
        }
        if let Some(baseline) = var(&["BASELINE_POLICY"]) {
            self.policy.baseline = baseline.parse()?;
        }

        Ok(())
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let page = Url::parse(&self.page_url)
            .map_err(|e| AppError::config(format!("page_url {:?}: {e}", self.page_url)))?;
        if !matches!(page.scheme(), "http" | "https") {
            return Err(AppError::config("page_url must be an http(s) URL"));
        }
        if !self.crawler.item_prefix.starts_with('/') {
            return Err(AppError::config(
                "crawler.item_prefix must be a path starting with '/'",
            ));
        }
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::config("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::config("crawler.timeout_secs must be > 0"));
        }
        if self.notify.timeout_secs == 0 {
            return Err(AppError::config("notify.timeout_secs must be > 0"));
        }
        match &self.notify.webhook_url {
            Some(v) if !v.is_empty() => {}
            _ => return Err(AppError::config("notify.webhook_url is not set")),
        }
        match &self.notify.channel {
            Some(v) if !v.is_empty() => {}
            _ => return Err(AppError::config("notify.channel is not set")),
        }
        self.snapshot.location()?;
        Ok(())
    }
}

/// HTTP client and link-matching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Page fetch timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Only hrefs starting with this path count as items
    #[serde(default = "defaults::item_prefix")]
    pub item_prefix: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            item_prefix: defaults::item_prefix(),
        }
    }
}

/// Snapshot location: an S3 bucket/key pair or a local file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default)]
    pub bucket: Option<String>,

    #[serde(default = "defaults::snapshot_key")]
    pub key: String,

    /// Local file used when no bucket is configured
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            key: defaults::snapshot_key(),
            path: None,
        }
    }
}

/// Resolved snapshot location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotLocation {
    S3 { bucket: String, key: String },
    Local(PathBuf),
}

impl SnapshotConfig {
    /// A configured bucket takes precedence over a local path.
    pub fn location(&self) -> Result<SnapshotLocation> {
        match (&self.bucket, &self.path) {
            (Some(bucket), _) => {
                if self.key.trim().is_empty() {
                    return Err(AppError::config("snapshot.key is empty"));
                }
                Ok(SnapshotLocation::S3 {
                    bucket: bucket.clone(),
                    key: self.key.clone(),
                })
            }
            (None, Some(path)) => Ok(SnapshotLocation::Local(path.clone())),
            (None, None) => Err(AppError::config(
                "no snapshot location: set snapshot.bucket or snapshot.path",
            )),
        }
    }
}

/// Chat notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub webhook_url: Option<SecretValue>,

    #[serde(default)]
    pub channel: Option<SecretValue>,

    /// Webhook request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl NotifyConfig {
    /// Whether any value needs the decryption service.
    pub fn needs_decryption(&self) -> bool {
        [&self.webhook_url, &self.channel]
            .into_iter()
            .flatten()
            .any(SecretValue::is_encrypted)
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            channel: None,
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Diff and baseline behavior.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub diff_mode: DiffMode,

    #[serde(default)]
    pub baseline: BaselinePolicy,
}

/// Which changes count as worth a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffMode {
    /// Only new items notify; removals are ignored.
    AdditionsOnly,
    /// Both new and removed items notify.
    #[default]
    Symmetric,
}

impl FromStr for DiffMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "additions_only" | "additions-only" | "additions" => Ok(DiffMode::AdditionsOnly),
            "symmetric" | "full" => Ok(DiffMode::Symmetric),
            other => Err(AppError::config(format!("unknown diff mode {other:?}"))),
        }
    }
}

/// What the stored snapshot becomes after a change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselinePolicy {
    /// Snapshot is replaced by the current crawl.
    #[default]
    Replace,
    /// Snapshot keeps every URL ever seen.
    Accumulate,
}

impl FromStr for BaselinePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(BaselinePolicy::Replace),
            "accumulate" => Ok(BaselinePolicy::Accumulate),
            other => Err(AppError::config(format!("unknown baseline policy {other:?}"))),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::config(format!("{name}={value:?}: {e}")))
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; storefront-watch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn item_prefix() -> String {
        "/items/".into()
    }
    pub fn snapshot_key() -> String {
        "known_urls.json".into()
    }
}
