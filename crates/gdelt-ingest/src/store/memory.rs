use crate::error::Result;
use crate::geo::GeoReshape;
use crate::store::{download_document, IngestStore, RecordOutcome, FILES_COLLECTION};
use async_trait::async_trait;
use gdelt_common::DownloadRecord;
use mongodb::bson::Document;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// In-memory [`IngestStore`] holding documents per collection name.
///
/// The `(remote, md5)` uniqueness of [`FILES_COLLECTION`] is always
/// enforced, whether or not `ensure_indexes` was called.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an event document into `collection`.
    pub async fn insert_event(&self, collection: &str, document: Document) {
        self.collections
            .lock()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    /// Snapshot of the documents in `collection`, in insertion order.
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .lock()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }
}

fn same_download(a: &Document, b: &Document) -> bool {
    a.get("remote") == b.get("remote") && a.get("md5") == b.get("md5")
}

#[async_trait]
impl IngestStore for MemoryStore {
    async fn ensure_indexes(&self) -> Result<()> {
        Ok(())
    }

    async fn record_download(&self, record: &DownloadRecord) -> Result<RecordOutcome> {
        let document = download_document(record);
        let mut collections = self.collections.lock().await;
        let files = collections.entry(FILES_COLLECTION.to_string()).or_default();

        if files.iter().any(|existing| same_download(existing, &document)) {
            return Ok(RecordOutcome::AlreadyRecorded);
        }
        files.push(document);
        Ok(RecordOutcome::Inserted)
    }

    async fn reshape_geo(&self, reshape: &GeoReshape) -> Result<u64> {
        let mut collections = self.collections.lock().await;
        let reshaped: Vec<Document> = collections
            .get(&reshape.source)
            .map(|docs| docs.iter().filter_map(|d| reshape.reshape_document(d)).collect())
            .unwrap_or_default();

        let written = reshaped.len() as u64;
        // $out semantics: the target is replaced wholesale
        collections.insert(reshape.target.clone(), reshaped);
        Ok(written)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use gdelt_common::ManifestEntry;
    use mongodb::bson::doc;

    fn record(url: &str, md5: &str) -> DownloadRecord {
        let entry = ManifestEntry {
            size: 10,
            checksum: md5.to_string(),
            url: url.to_string(),
        };
        DownloadRecord::for_entry(&entry, "a.zip")
    }

    #[tokio::test]
    async fn duplicate_remote_and_md5_is_already_recorded() {
        let store = MemoryStore::new();
        let first = store.record_download(&record("http://h/a.zip", "aa")).await.unwrap();
        let second = store.record_download(&record("http://h/a.zip", "aa")).await.unwrap();

        assert_eq!(first, RecordOutcome::Inserted);
        assert_eq!(second, RecordOutcome::AlreadyRecorded);
        assert_eq!(store.documents(FILES_COLLECTION).await.len(), 1);
    }

    #[tokio::test]
    async fn same_remote_new_checksum_is_inserted() {
        let store = MemoryStore::new();
        store.record_download(&record("http://h/a.zip", "aa")).await.unwrap();
        let outcome = store.record_download(&record("http://h/a.zip", "bb")).await.unwrap();

        assert_eq!(outcome, RecordOutcome::Inserted);
        assert_eq!(store.documents(FILES_COLLECTION).await.len(), 2);
    }

    #[tokio::test]
    async fn reshape_replaces_target() {
        let store = MemoryStore::new();
        let reshape = GeoReshape::for_collection("events");
        store.insert_event(&reshape.target, doc! { "stale": true }).await;

        let written = store.reshape_geo(&reshape).await.unwrap();
        assert_eq!(written, 0);
        assert!(store.documents(&reshape.target).await.is_empty());
    }

    #[tokio::test]
    async fn checksum_case_does_not_create_second_record() {
        let store = MemoryStore::new();
        store
            .record_download(&record("http://h/a.zip", "297a16b493de7cf6ca809a7cc31d0b93"))
            .await
            .unwrap();
        let outcome = store
            .record_download(&record("http://h/a.zip", "297A16B493DE7CF6CA809A7CC31D0B93"))
            .await
            .unwrap();

        assert_eq!(outcome, RecordOutcome::AlreadyRecorded);
        assert_eq!(store.documents(FILES_COLLECTION).await.len(), 1);
    }
}
