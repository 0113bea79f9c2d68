//! Configuration management
//!
//! [`IngestConfig`] is built once from the parsed command line and passed to
//! every stage through [`crate::IngestContext`].

use crate::error::{IngestError, Result};
use crate::manifest::ManifestKind;
use crate::progress::ProgressMode;
use crate::Cli;
use std::path::PathBuf;

// ============================================================================
// Defaults
// ============================================================================

/// Default MongoDB connection string.
pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";

/// Full list of every GDELT 2.0 archive.
pub const DEFAULT_MASTER_URL: &str = "http://data.gdeltproject.org/gdeltv2/masterfilelist.txt";

/// Archives published in the latest 15 minute update.
pub const DEFAULT_INCREMENTAL_URL: &str = "http://data.gdeltproject.org/gdeltv2/lastupdate.txt";

pub const DEFAULT_DATABASE: &str = "GDELT";

/// Collection holding GDELT event documents.
pub const DEFAULT_COLLECTION: &str = "events";

/// Directory that receives manifests, archives, and extracted files.
pub const DEFAULT_WORKDIR: &str = ".";

/// Characters MongoDB rejects in database names
const INVALID_DATABASE_CHARS: &[char] = &['/', '\\', '.', ' ', '"', '$'];

/// Where the manifest comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    /// Existing file, used as-is without network access
    Local(PathBuf),
    /// Fetched and saved under a timestamped name
    Remote { kind: ManifestKind, url: String },
}

/// MongoDB connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
    pub events_collection: String,
}

/// Settings for one loader invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub database: DatabaseConfig,
    pub manifest: ManifestSource,
    pub work_dir: PathBuf,
    /// Re-download archives that already exist locally
    pub overwrite: bool,
    /// Run the fetch/verify/extract/record cycle after resolving the manifest
    pub download: bool,
    /// Run the geo reshape instead of anything else
    pub map_geo: bool,
    pub progress: ProgressMode,
}

impl IngestConfig {
    /// Build and validate the configuration from command-line arguments
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let manifest = match &cli.local {
            Some(path) => ManifestSource::Local(path.clone()),
            None => {
                let url = match cli.ziplist {
                    ManifestKind::Master => cli.master.clone(),
                    ManifestKind::Incremental => cli.incremental.clone(),
                };
                ManifestSource::Remote {
                    kind: cli.ziplist,
                    url,
                }
            },
        };

        let config = Self {
            database: DatabaseConfig {
                uri: cli.mongodb.clone(),
                name: cli.database.clone(),
                events_collection: cli.collection.clone(),
            },
            manifest,
            work_dir: cli.workdir.clone(),
            overwrite: cli.overwrite,
            download: cli.download,
            map_geo: cli.mapgeo,
            progress: cli.progress,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let uri = &self.database.uri;
        if !(uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://")) {
            return Err(IngestError::config(format!(
                "MongoDB URI '{}' must start with mongodb:// or mongodb+srv://",
                uri
            )));
        }

        let name = &self.database.name;
        if name.is_empty() || name.contains(INVALID_DATABASE_CHARS) {
            return Err(IngestError::config(format!("Invalid database name '{}'", name)));
        }

        let collection = &self.database.events_collection;
        if collection.is_empty() || collection.contains('$') || collection.starts_with("system.") {
            return Err(IngestError::config(format!(
                "Invalid collection name '{}'",
                collection
            )));
        }

        if let ManifestSource::Remote { url, .. } = &self.manifest {
            let parsed = url::Url::parse(url).map_err(|e| {
                IngestError::config(format!("Invalid manifest URL '{}': {}", url, e))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(IngestError::config(format!(
                    "Manifest URL '{}' must use http or https",
                    url
                )));
            }
        }

        Ok(())
    }
}
