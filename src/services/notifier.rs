// src/services/notifier.rs

//! Chat notification over an incoming-webhook endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{NotifyConfig, SecretKind, SecretValue};
use crate::pipeline::UrlDiff;
use crate::services::SecretResolver;
use crate::utils::http::create_notify_client;

/// Delivers a change report somewhere a human will read it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, page_url: &str, diff: &UrlDiff) -> Result<()>;
}

/// Request body understood by the chat endpoint.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
    #[serde(rename = "channelName")]
    channel_name: &'a str,
}

/// Posts change reports as JSON to a webhook.
pub struct WebhookNotifier {
    client: Client,
    resolver: SecretResolver,
    webhook_url: SecretValue,
    channel: SecretValue,
}

impl WebhookNotifier {
    pub fn new(
        client: Client,
        resolver: SecretResolver,
        webhook_url: SecretValue,
        channel: SecretValue,
    ) -> Self {
        Self {
            client,
            resolver,
            webhook_url,
            channel,
        }
    }

    /// Build a notifier from configuration.
    pub fn from_config(config: &NotifyConfig, resolver: SecretResolver) -> Result<Self> {
        let webhook_url = config
            .webhook_url
            .clone()
            .ok_or_else(|| AppError::config("notify.webhook_url is not set"))?;
        let channel = config
            .channel
            .clone()
            .ok_or_else(|| AppError::config("notify.channel is not set"))?;
        let client = create_notify_client(config)?;
        Ok(Self::new(client, resolver, webhook_url, channel))
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, page_url: &str, diff: &UrlDiff) -> Result<()> {
        let channel = self.resolver.resolve(SecretKind::Channel, &self.channel).await?;
        let endpoint = self
            .resolver
            .resolve(SecretKind::WebhookUrl, &self.webhook_url)
            .await?;

        let text = format_message(page_url, diff);
        let payload = WebhookPayload {
            text: &text,
            channel_name: &channel,
        };

        let response = self
            .client
            .post(&endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Notify(format!("post: {}", e.without_url())))?;

        let status = response.status();
        // Drain the body so a broken response surfaces as an error.
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Notify(format!("read response body: {}", e.without_url())))?;

        if status != StatusCode::OK {
            log::debug!("Webhook rejected notification: {} {}", status, body);
            return Err(AppError::Notify(format!("unexpected status {status}")));
        }

        log::info!(
            "Notified {} added / {} removed for {}",
            diff.added.len(),
            diff.removed.len(),
            page_url
        );
        Ok(())
    }
}

/// Render the chat message for a diff.
///
/// Sections without entries are left out.
pub fn format_message(page_url: &str, diff: &UrlDiff) -> String {
    let mut lines = vec![
        "# Store updated!".to_string(),
        "## Store URL".to_string(),
        page_url.to_string(),
    ];

    for (heading, urls) in [
        ("## Removed item URLs", &diff.removed),
        ("## New item URLs", &diff.added),
    ] {
        if !urls.is_empty() {
            lines.push(heading.to_string());
            lines.extend(urls.iter().map(|url| format!("- {url}")));
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn diff(removed: &[&str], added: &[&str]) -> UrlDiff {
        UrlDiff {
            removed: removed.iter().map(|s| s.to_string()).collect(),
            added: added.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn notifier_for(endpoint: String) -> WebhookNotifier {
        let config = NotifyConfig {
            webhook_url: Some(SecretValue::Plain(endpoint)),
            channel: Some(SecretValue::Plain("#drops".into())),
            ..NotifyConfig::default()
        };
        WebhookNotifier::from_config(&config, SecretResolver::plaintext()).unwrap()
    }

    #[test]
    fn test_format_message_added_only() {
        let text = format_message("https://x", &diff(&[], &["https://x/items/1"]));
        assert_eq!(
            text,
            "# Store updated!\n## Store URL\nhttps://x\n## New item URLs\n- https://x/items/1\n"
        );
    }

    #[test]
    fn test_format_message_both_sections() {
        let text = format_message("https://x", &diff(&["A", "B"], &["C"]));
        assert_eq!(
            text,
            "# Store updated!\n## Store URL\nhttps://x\n## Removed item URLs\n- A\n- B\n## New item URLs\n- C\n"
        );
    }

    #[test]
    fn test_format_message_removed_before_added() {
        let text = format_message("https://x", &diff(&["A"], &["C"]));
        let removed = text.find("## Removed item URLs\n- A\n").unwrap();
        let added = text.find("## New item URLs\n- C\n").unwrap();
        assert!(removed < added);
    }

    #[tokio::test]
    async fn test_notify_posts_json_payload() {
        let server = MockServer::start_async().await;
        let expected = format_message("https://x", &diff(&[], &["https://x/items/1"]));
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/hook")
                    .header("content-type", "application/json")
                    .json_body(json!({ "text": expected, "channelName": "#drops" }));
                then.status(200).body("ok");
            })
            .await;

        let notifier = notifier_for(server.url("/hook"));
        notifier
            .notify("https://x", &diff(&[], &["https://x/items/1"]))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_notify_rejects_non_200() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/hook");
                then.status(500).body("boom");
            })
            .await;

        let notifier = notifier_for(server.url("/hook"));
        let err = notifier
            .notify("https://x", &diff(&[], &["https://x/items/1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Notify(_)));
    }

    #[tokio::test]
    async fn test_notify_treats_other_2xx_as_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/hook");
                then.status(204);
            })
            .await;

        let notifier = notifier_for(server.url("/hook"));
        let result = notifier.notify("https://x", &diff(&["A"], &[])).await;
        assert!(matches!(result, Err(AppError::Notify(_))));
    }

    #[test]
    fn test_from_config_requires_channel() {
        let config = NotifyConfig {
            webhook_url: Some(SecretValue::Plain("https://hooks.example.com".into())),
            ..NotifyConfig::default()
        };
        let result = WebhookNotifier::from_config(&config, SecretResolver::plaintext());
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
