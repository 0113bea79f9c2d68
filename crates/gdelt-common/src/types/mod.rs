//! Domain types shared across the GDELT loader

use crate::error::{GdeltError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One archive listed in a GDELT manifest
///
/// Manifest lines have the form `<size> <md5> <url>`, separated by any
/// whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Declared archive size in bytes
    pub size: u64,

    /// Declared hex MD5 of the archive
    pub checksum: String,

    /// Remote location of the archive
    pub url: String,
}

impl ManifestEntry {
    /// Parse one manifest line.
    ///
    /// Returns `Ok(None)` for blank lines. `line_number` is 1-based and only
    /// used for error reporting.
    pub fn parse_line(line: &str, line_number: usize) -> Result<Option<Self>> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [] => Ok(None),
            [size, checksum, url] => {
                let size = size.parse::<u64>().map_err(|e| {
                    GdeltError::parse(line_number, format!("invalid size '{}': {}", size, e))
                })?;
                Ok(Some(Self {
                    size,
                    checksum: (*checksum).to_string(),
                    url: (*url).to_string(),
                }))
            },
            other => Err(GdeltError::parse(
                line_number,
                format!("expected 3 fields (size, checksum, url), found {}", other.len()),
            )),
        }
    }

    /// File name the archive is stored under locally
    pub fn local_name(&self) -> Result<&str> {
        local_path(&self.url)
    }
}

/// Final `/`-delimited segment of a URL.
///
/// Query strings and fragments are not stripped.
pub fn local_path(url: &str) -> Result<&str> {
    match url.rsplit('/').next() {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(GdeltError::InvalidUrl(url.to_string())),
    }
}

/// Metadata stored for every verified archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// Ingestion time
    pub timestamp: DateTime<Utc>,

    pub remote_url: String,

    /// Local file name, relative to the working directory
    pub local_path: String,

    pub size: u64,

    pub checksum: String,
}

impl DownloadRecord {
    /// Build the record for a verified manifest entry
    pub fn for_entry(entry: &ManifestEntry, local_path: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            remote_url: entry.url.clone(),
            local_path: local_path.into(),
            size: entry.size,
            checksum: entry.checksum.clone(),
        }
    }
}
