// src/models/secret.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which configured secret a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    WebhookUrl,
    Channel,
}

impl fmt::Display for SecretKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretKind::WebhookUrl => f.write_str("webhook URL"),
            SecretKind::Channel => f.write_str("channel name"),
        }
    }
}

/// A configuration value that is either usable as-is or encrypted at rest.
///
/// In TOML this reads as `{ plain = "..." }` or `{ encrypted = "<base64>" }`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretValue {
    Plain(String),
    /// Base64 ciphertext, decrypted on demand.
    Encrypted(String),
}

impl SecretValue {
    pub fn is_encrypted(&self) -> bool {
        matches!(self, SecretValue::Encrypted(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SecretValue::Plain(v) | SecretValue::Encrypted(v) => v.trim().is_empty(),
        }
    }
}

// Never print secret material into logs.
impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretValue::Plain(_) => f.write_str("Plain(<redacted>)"),
            SecretValue::Encrypted(_) => f.write_str("Encrypted(<redacted>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let value = SecretValue::Plain("https://hooks.example.com/T000/B000".into());
        assert_eq!(format!("{value:?}"), "Plain(<redacted>)");
    }

    #[test]
    fn deserializes_from_toml_table() {
        #[derive(Deserialize)]
        struct Wrapper {
            channel: SecretValue,
        }
        let parsed: Wrapper = toml::from_str(r#"channel = { encrypted = "AQID" }"#).unwrap();
        assert_eq!(parsed.channel, SecretValue::Encrypted("AQID".into()));
    }
}
