use crate::config::DatabaseConfig;
use crate::error::{IngestError, Result};
use crate::geo::GeoReshape;
use crate::store::{
    download_document, IngestStore, RecordOutcome, FILES_COLLECTION, FILES_UNIQUE_INDEX,
};
use async_trait::async_trait;
use gdelt_common::DownloadRecord;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use tracing::{debug, info};

/// Server error code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB-backed implementation of [`IngestStore`].
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Connect and ping the server so a bad URI fails before any work starts.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.uri).await?;
        let database = client.database(&config.name);
        database.run_command(doc! { "ping": 1 }).await?;

        info!(database = %config.name, "Connected to MongoDB");
        Ok(Self { database })
    }

    fn files(&self) -> Collection<Document> {
        self.database.collection(FILES_COLLECTION)
    }
}

/// Inserts report duplicates as write errors, index builds as command errors
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(ref e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

#[async_trait]
impl IngestStore for MongoStore {
    async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "remote": 1, "md5": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name(FILES_UNIQUE_INDEX.to_string())
                    .build(),
            )
            .build();

        match self.files().create_index(index).await {
            Ok(_) => {},
            Err(e) if is_duplicate_key(&e) => {
                return Err(IngestError::config(format!(
                    "Cannot build unique index '{}': collection '{}' already holds documents \
                     with the same remote and md5; remove the duplicates and rerun",
                    FILES_UNIQUE_INDEX, FILES_COLLECTION
                )));
            },
            Err(e) => return Err(e.into()),
        }
        debug!(collection = FILES_COLLECTION, index = FILES_UNIQUE_INDEX, "Index ready");
        Ok(())
    }

    async fn record_download(&self, record: &DownloadRecord) -> Result<RecordOutcome> {
        match self.files().insert_one(download_document(record)).await {
            Ok(result) => {
                debug!(id = %result.inserted_id, local = %record.local_path, "Recorded download");
                Ok(RecordOutcome::Inserted)
            },
            Err(e) if is_duplicate_key(&e) => Ok(RecordOutcome::AlreadyRecorded),
            Err(e) => Err(e.into()),
        }
    }

    async fn reshape_geo(&self, reshape: &GeoReshape) -> Result<u64> {
        let source: Collection<Document> = self.database.collection(&reshape.source);
        // $out only materializes once the cursor is drained
        let mut cursor = source.aggregate(reshape.pipeline()).await?;
        while cursor.advance().await? {}

        let target: Collection<Document> = self.database.collection(&reshape.target);
        Ok(target.count_documents(doc! {}).await?)
    }
}
