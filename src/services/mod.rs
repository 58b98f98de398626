//! Service layer for the watcher.
//!
//! - Item link extraction (`PageExtractor`)
//! - Chat notification (`WebhookNotifier`)
//! - Secret resolution (`SecretResolver`)

mod extractor;
mod notifier;
mod secrets;

pub use extractor::{LinkSource, PageExtractor, extract_item_urls};
pub use notifier::{Notifier, WebhookNotifier, format_message};
#[cfg(feature = "aws")]
pub use secrets::KmsDecrypter;
pub use secrets::{Decrypter, SecretResolver, decode_ciphertext};
