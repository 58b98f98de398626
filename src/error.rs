// src/error.rs

//! Unified error handling for the watcher.

use std::fmt;

use thiserror::Error;

use crate::models::SecretKind;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// A step of a watch run, used to tag failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchKnown,
    Crawl,
    Notify,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::FetchKnown => "fetch known urls",
            Stage::Crawl => "crawl page",
            Stage::Notify => "notify",
            Stage::Persist => "persist snapshot",
        };
        f.write_str(name)
    }
}

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A secret was not valid base64
    #[error("{secret} is not valid base64: {source}")]
    SecretEncoding {
        secret: SecretKind,
        #[source]
        source: base64::DecodeError,
    },

    /// The decryption service rejected a secret
    #[error("failed to decrypt {secret}: {message}")]
    Decrypt { secret: SecretKind, message: String },

    /// Snapshot could not be read (anything other than "not found")
    #[error("Snapshot read error at {location}: {message}")]
    SnapshotRead { location: String, message: String },

    /// Snapshot could not be written
    #[error("Snapshot write error at {location}: {message}")]
    SnapshotWrite { location: String, message: String },

    /// Crawling error
    #[error("Crawl error for {context}: {message}")]
    Crawl { context: String, message: String },

    /// Notification was not accepted by the endpoint
    #[error("Notification failed: {0}")]
    Notify(String),

    /// A step of the run failed
    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a crawl error with context.
    pub fn crawl(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Crawl {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a decryption error for the given secret.
    pub fn decrypt(secret: SecretKind, message: impl fmt::Display) -> Self {
        Self::Decrypt {
            secret,
            message: message.to_string(),
        }
    }

    /// Create a snapshot read error.
    pub fn snapshot_read(location: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::SnapshotRead {
            location: location.into(),
            message: message.to_string(),
        }
    }

    /// Create a snapshot write error.
    pub fn snapshot_write(location: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::SnapshotWrite {
            location: location.into(),
            message: message.to_string(),
        }
    }

    /// Tag this error with the run step it came from.
    pub fn at(self, stage: Stage) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The run step this error was tagged with, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The underlying error, with any stage tag removed.
    pub fn source_error(&self) -> &AppError {
        match self {
            Self::Stage { source, .. } => source.source_error(),
            other => other,
        }
    }

    /// True when the notification went out but the snapshot was not stored.
    ///
    /// The next run will report the same diff again unless the snapshot is
    /// fixed by hand.
    pub fn needs_reconciliation(&self) -> bool {
        self.stage() == Some(Stage::Persist)
    }
}
