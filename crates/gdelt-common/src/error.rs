//! Error types shared across the GDELT loader

use thiserror::Error;

/// Result type alias for GDELT operations
pub type Result<T> = std::result::Result<T, GdeltError>;

/// Main error type for GDELT shared utilities
#[derive(Error, Debug)]
pub enum GdeltError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Checksum mismatch for '{file}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("Manifest line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Invalid URL '{0}': no file name after the last '/'")]
    InvalidUrl(String),
}

impl GdeltError {
    /// Create a manifest parse error for a 1-based line number
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }

    /// Create a checksum mismatch error
    pub fn checksum_mismatch(
        file: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ChecksumMismatch {
            file: file.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
