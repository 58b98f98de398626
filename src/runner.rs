// src/runner.rs

//! Wires the real adapters together for one run.
//!
//! Both binaries go through [`run_configured`]; tests use
//! [`crate::pipeline::run_watch`] with their own adapters.

use crate::error::Result;
use crate::models::{Config, RunOutcome};
use crate::pipeline::{WatchOptions, run_watch};
use crate::services::{PageExtractor, SecretResolver, WebhookNotifier};
use crate::storage::open_store;

/// Pick a secret resolver able to handle the configured values.
pub async fn secret_resolver(config: &Config) -> Result<SecretResolver> {
    if config.notify.needs_decryption() {
        decrypting_resolver().await
    } else {
        Ok(SecretResolver::plaintext())
    }
}

#[cfg(feature = "aws")]
async fn decrypting_resolver() -> Result<SecretResolver> {
    use std::sync::Arc;

    use crate::services::KmsDecrypter;

    let decrypter = KmsDecrypter::from_env().await;
    Ok(SecretResolver::with_decrypter(Arc::new(decrypter)))
}

#[cfg(not(feature = "aws"))]
async fn decrypting_resolver() -> Result<SecretResolver> {
    Err(crate::error::AppError::config(
        "encrypted notification settings require the `aws` feature",
    ))
}

/// Validate the configuration, build the adapters and run once.
pub async fn run_configured(config: &Config, options: WatchOptions) -> Result<RunOutcome> {
    config.validate()?;

    let store = open_store(config).await?;
    let extractor = PageExtractor::new(&config.crawler)?;
    let resolver = secret_resolver(config).await?;
    let notifier = WebhookNotifier::from_config(&config.notify, resolver)?;

    run_watch(config, store.as_ref(), &extractor, &notifier, options).await
}
