//! Error types for the GDELT ingestion pipeline
//!
//! Only checksum mismatches are recoverable, and those are reported through
//! [`crate::verify::Verification`] rather than this type. Every variant here
//! ends the run.

use gdelt_common::GdeltError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    /// Local manifest override does not exist
    #[error("'{}' does not exist", .0.display())]
    NotFound(PathBuf),

    /// Connection failure, non-success status, or interrupted body
    #[error("Transfer of '{url}' failed: {reason}")]
    Transfer { url: String, reason: String },

    /// Manifest body or archive entry is not UTF-8 text
    #[error("'{entry}' is not valid UTF-8 text: {source}")]
    Decode {
        entry: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Entry name is absolute or climbs out of the output directory
    #[error("Archive entry '{0}' would be written outside the working directory")]
    UnsafeEntry(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] GdeltError),
}

impl IngestError {
    /// Create a transfer error for a URL
    pub fn transfer(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Transfer {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a decode error for a named manifest or archive entry
    pub fn decode(entry: impl Into<String>, source: std::string::FromUtf8Error) -> Self {
        Self::Decode {
            entry: entry.into(),
            source,
        }
    }
}
