// src/services/secrets.rs

//! Secret resolution.
//!
//! Configuration values may arrive as plain text or as base64 ciphertext
//! that an external service decrypts on demand.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{AppError, Result};
use crate::models::{SecretKind, SecretValue};

/// External decryption service.
#[async_trait]
pub trait Decrypter: Send + Sync {
    /// Turn raw ciphertext into plaintext bytes.
    ///
    /// Failures should be [`AppError::Decrypt`] naming `kind`.
    async fn decrypt(&self, kind: SecretKind, ciphertext: Vec<u8>) -> Result<Vec<u8>>;
}

/// Resolves configured secrets to their plaintext.
#[derive(Clone, Default)]
pub struct SecretResolver {
    decrypter: Option<Arc<dyn Decrypter>>,
}

impl SecretResolver {
    /// A resolver that only accepts plain values.
    pub fn plaintext() -> Self {
        Self { decrypter: None }
    }

    pub fn with_decrypter(decrypter: Arc<dyn Decrypter>) -> Self {
        Self {
            decrypter: Some(decrypter),
        }
    }

    /// Resolve one secret value.
    ///
    /// Bad base64 is reported as [`AppError::SecretEncoding`]; a failure of the
    /// decryption service as [`AppError::Decrypt`]. Both name the secret.
    pub async fn resolve(&self, kind: SecretKind, value: &SecretValue) -> Result<String> {
        let encoded = match value {
            SecretValue::Plain(plain) => return Ok(plain.clone()),
            SecretValue::Encrypted(encoded) => encoded,
        };

        let ciphertext = decode_ciphertext(kind, encoded)?;
        let decrypter = self.decrypter.as_ref().ok_or_else(|| {
            AppError::config(format!(
                "{kind} is encrypted but no decryption service is configured"
            ))
        })?;

        let plaintext = decrypter.decrypt(kind, ciphertext).await?;

        String::from_utf8(plaintext)
            .map_err(|e| AppError::decrypt(kind, format!("plaintext is not UTF-8: {e}")))
    }
}

/// Decode standard base64 ciphertext.
pub fn decode_ciphertext(kind: SecretKind, encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|source| AppError::SecretEncoding {
            secret: kind,
            source,
        })
}

#[cfg(feature = "aws")]
pub use kms::KmsDecrypter;

#[cfg(feature = "aws")]
mod kms {
    use aws_sdk_kms::Client;
    use aws_sdk_kms::primitives::Blob;

    use super::*;

    /// Decrypts with AWS KMS. The key is identified by the ciphertext itself.
    #[derive(Clone)]
    pub struct KmsDecrypter {
        client: Client,
    }

    impl KmsDecrypter {
        pub fn new(client: Client) -> Self {
            Self { client }
        }

        /// Create a KMS decrypter from the ambient AWS configuration.
        pub async fn from_env() -> Self {
            let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            Self::new(Client::new(&config))
        }
    }

    #[async_trait]
    impl Decrypter for KmsDecrypter {
        async fn decrypt(&self, kind: SecretKind, ciphertext: Vec<u8>) -> Result<Vec<u8>> {
            let output = self
                .client
                .decrypt()
                .ciphertext_blob(Blob::new(ciphertext))
                .send()
                .await
                .map_err(|e| AppError::decrypt(kind, e.into_service_error()))?;

            output
                .plaintext
                .map(Blob::into_inner)
                .ok_or_else(|| AppError::decrypt(kind, "KMS returned no plaintext"))
        }
    }
}
