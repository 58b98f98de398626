//! Full runs against mock page and webhook servers with a file snapshot.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

use storefront_watch::error::{AppError, Result, Stage};
use storefront_watch::models::{Config, RunStatus, SecretKind, SecretValue};
use storefront_watch::pipeline::{UrlDiff, WatchOptions, run_watch};
use storefront_watch::runner::run_configured;
use storefront_watch::services::{
    Decrypter, PageExtractor, SecretResolver, WebhookNotifier, format_message,
};
use storefront_watch::storage::LocalSnapshotStore;

const PAGE: &str = r#"
<html><body>
  <nav><a href="/about">About</a></nav>
  <ul>
    <li><a href="/items/2"><img src="2.png"></a><a href="/items/2">Two</a></li>
    <li><a href="/items/10">Ten</a></li>
  </ul>
</body></html>
"#;

fn config_for(page: &MockServer, hook: &MockServer, tmp: &TempDir) -> Config {
    let mut config = Config {
        page_url: page.base_url(),
        ..Config::default()
    };
    config.snapshot.path = Some(tmp.path().join("known.json"));
    config.notify.webhook_url = Some(SecretValue::Plain(hook.url("/hook")));
    config.notify.channel = Some(SecretValue::Plain("#drops".into()));
    config
}

#[tokio::test]
async fn first_run_notifies_then_second_run_is_quiet() {
    let page = MockServer::start_async().await;
    let hook = MockServer::start_async().await;
    let tmp = TempDir::new().unwrap();

    page.mock_async(|when, then| {
        when.method(GET).path("/");
        then.status(200).body(PAGE);
    })
    .await;

    let base = page.base_url();
    let expected_urls = vec![format!("{base}/items/10"), format!("{base}/items/2")];
    let expected_text = format_message(
        &base,
        &UrlDiff {
            removed: vec![],
            added: expected_urls.clone(),
        },
    );
    let webhook = hook
        .mock_async(|when, then| {
            when.method(POST)
                .path("/hook")
                .json_body(json!({ "text": expected_text, "channelName": "#drops" }));
            then.status(200).body("ok");
        })
        .await;

    let config = config_for(&page, &hook, &tmp);

    let first = run_configured(&config, WatchOptions::default()).await.unwrap();
    assert_eq!(first.status, RunStatus::Notified);
    assert_eq!(first.added, expected_urls);

    let stored = std::fs::read_to_string(tmp.path().join("known.json")).unwrap();
    let stored: Vec<String> = serde_json::from_str(&stored).unwrap();
    assert_eq!(stored, expected_urls);

    let second = run_configured(&config, WatchOptions::default()).await.unwrap();
    assert_eq!(second.status, RunStatus::Unchanged);

    // Exactly one delivery across both runs.
    webhook.assert_async().await;
}

#[tokio::test]
async fn rejected_notification_leaves_snapshot_untouched() {
    let page = MockServer::start_async().await;
    let hook = MockServer::start_async().await;
    let tmp = TempDir::new().unwrap();

    page.mock_async(|when, then| {
        when.method(GET).path("/");
        then.status(200).body(PAGE);
    })
    .await;
    hook.mock_async(|when, then| {
        when.method(POST).path("/hook");
        then.status(500);
    })
    .await;

    let config = config_for(&page, &hook, &tmp);
    let err = run_configured(&config, WatchOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Notify));
    assert!(!tmp.path().join("known.json").exists());
}

#[tokio::test]
async fn unreachable_page_fails_before_notifying() {
    let page = MockServer::start_async().await;
    let hook = MockServer::start_async().await;
    let tmp = TempDir::new().unwrap();

    page.mock_async(|when, then| {
        when.method(GET).path("/");
        then.status(404);
    })
    .await;
    hook.mock_async(|when, then| {
        when.method(POST).path("/hook");
        then.status(200);
    })
    .await;

    let config = config_for(&page, &hook, &tmp);
    let err = run_configured(&config, WatchOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Crawl));
    assert!(!tmp.path().join("known.json").exists());
}

struct DenyingDecrypter;

#[async_trait]
impl Decrypter for DenyingDecrypter {
    async fn decrypt(&self, kind: SecretKind, _ciphertext: Vec<u8>) -> Result<Vec<u8>> {
        Err(AppError::decrypt(kind, "AccessDeniedException"))
    }
}

#[tokio::test]
async fn decryption_failure_aborts_before_posting() {
    let page = MockServer::start_async().await;
    let hook = MockServer::start_async().await;
    let tmp = TempDir::new().unwrap();

    page.mock_async(|when, then| {
        when.method(GET).path("/");
        then.status(200).body(PAGE);
    })
    .await;
    // Any delivery would be accepted and make the run succeed.
    hook.mock_async(|when, then| {
        when.method(POST);
        then.status(200).body("ok");
    })
    .await;

    let mut config = config_for(&page, &hook, &tmp);
    config.notify.webhook_url = Some(SecretValue::Encrypted("AQID".into()));
    config.notify.channel = Some(SecretValue::Encrypted("BAUG".into()));

    let store = LocalSnapshotStore::new(tmp.path().join("known.json"));
    let extractor = PageExtractor::new(&config.crawler).unwrap();
    let resolver = SecretResolver::with_decrypter(Arc::new(DenyingDecrypter));
    let notifier = WebhookNotifier::from_config(&config.notify, resolver).unwrap();

    let err = run_watch(
        &config,
        &store,
        &extractor,
        &notifier,
        WatchOptions::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Notify));
    assert!(matches!(err.source_error(), AppError::Decrypt { .. }));
    assert!(!tmp.path().join("known.json").exists());
}

#[tokio::test]
async fn hung_page_times_out_as_crawl_error() {
    let page = MockServer::start_async().await;
    let hook = MockServer::start_async().await;
    let tmp = TempDir::new().unwrap();

    page.mock_async(|when, then| {
        when.method(GET).path("/");
        then.status(200).body(PAGE).delay(Duration::from_secs(3));
    })
    .await;

    let mut config = config_for(&page, &hook, &tmp);
    config.crawler.timeout_secs = 1;

    let err = run_configured(&config, WatchOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Crawl));
    assert!(matches!(err.source_error(), AppError::Crawl { .. }));
    assert!(!tmp.path().join("known.json").exists());
}

#[tokio::test]
async fn hung_webhook_times_out_as_notify_error() {
    let page = MockServer::start_async().await;
    let hook = MockServer::start_async().await;
    let tmp = TempDir::new().unwrap();

    page.mock_async(|when, then| {
        when.method(GET).path("/");
        then.status(200).body(PAGE);
    })
    .await;
    hook.mock_async(|when, then| {
        when.method(POST).path("/hook");
        then.status(200).body("ok").delay(Duration::from_secs(3));
    })
    .await;

    let mut config = config_for(&page, &hook, &tmp);
    config.notify.timeout_secs = 1;

    let err = run_configured(&config, WatchOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Notify));
    assert!(matches!(err.source_error(), AppError::Notify(_)));
    assert!(!tmp.path().join("known.json").exists());
}
