//! GDELT Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the GDELT loader.
//!
//! # Overview
//!
//! - **Error Handling**: [`GdeltError`] and the crate [`Result`] alias
//! - **Checksums**: MD5 verification of downloaded archives
//! - **Logging**: `tracing` subscriber setup shared by every binary
//! - **Types**: manifest entries and download records
//!
//! # Example
//!
//! ```no_run
//! use gdelt_common::checksum::{verify_file_md5, ChecksumVerdict};
//!
//! fn check(path: &str, expected: &str) -> gdelt_common::Result<bool> {
//!     let verdict = verify_file_md5(path, expected)?;
//!     Ok(matches!(verdict, ChecksumVerdict::Match))
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{GdeltError, Result};
pub use types::{DownloadRecord, ManifestEntry};
