//! Persistence for download metadata and event reshaping
//!
//! [`IngestStore`] is the seam between the pipeline and the database.
//! [`MongoStore`] is used in production; [`MemoryStore`] backs tests and
//! dry runs.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use crate::error::Result;
use crate::geo::GeoReshape;
use async_trait::async_trait;
use gdelt_common::DownloadRecord;
use mongodb::bson::{doc, DateTime, Document};

/// Collection holding one document per verified archive
pub const FILES_COLLECTION: &str = "files";

/// Name of the unique `(remote, md5)` index on [`FILES_COLLECTION`]
pub const FILES_UNIQUE_INDEX: &str = "remote_md5_unique";

/// Result of recording a download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Inserted,
    /// A document with the same remote URL and checksum already exists
    AlreadyRecorded,
}

/// Storage backend for the loader.
///
/// Implementations must be `Send + Sync`.
#[async_trait]
pub trait IngestStore: Send + Sync {
    /// Create the indexes the loader relies on. Safe to call repeatedly.
    async fn ensure_indexes(&self) -> Result<()>;

    /// Insert one download record into [`FILES_COLLECTION`].
    async fn record_download(&self, record: &DownloadRecord) -> Result<RecordOutcome>;

    /// Replace `reshape.target` with the geo-annotated copies of the
    /// qualifying documents in `reshape.source`. Returns the number of
    /// documents written.
    async fn reshape_geo(&self, reshape: &GeoReshape) -> Result<u64>;
}

/// Document layout of a download record
///
/// Sizes beyond `i64::MAX` are clamped since BSON has no unsigned integers.
/// The checksum is stored in lower case so the unique index matches the
/// case-insensitive verification.
pub fn download_document(record: &DownloadRecord) -> Document {
    doc! {
        "ts": DateTime::from_millis(record.timestamp.timestamp_millis()),
        "remote": record.remote_url.clone(),
        "local": record.local_path.clone(),
        "size": i64::try_from(record.size).unwrap_or(i64::MAX),
        "md5": record.checksum.to_ascii_lowercase(),
    }
}
