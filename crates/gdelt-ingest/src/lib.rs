//! GDELT Ingest Library
//!
//! Fetches GDELT 2.0 manifests, downloads and verifies the archives they
//! list, extracts them, and records each verified download in MongoDB.
//! Separately, reshapes event coordinates into GeoJSON points.
//!
//! # Example
//!
//! ```no_run
//! use clap::Parser;
//! use gdelt_ingest::{run, Cli, IngestConfig};
//!
//! #[tokio::main]
//! async fn main() -> gdelt_ingest::Result<()> {
//!     let cli = Cli::parse_from(["gdeltloader", "--ziplist", "incremental", "--download"]);
//!     let outcome = run(IngestConfig::from_cli(&cli)?).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod geo;
pub mod manifest;
pub mod pipeline;
pub mod progress;
pub mod store;
pub mod verify;

pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use pipeline::IngestSummary;

use crate::config::{
    DEFAULT_COLLECTION, DEFAULT_DATABASE, DEFAULT_INCREMENTAL_URL, DEFAULT_MASTER_URL,
    DEFAULT_MONGODB_URI, DEFAULT_WORKDIR,
};
use crate::geo::GeoReshape;
use crate::manifest::ManifestKind;
use crate::progress::ProgressMode;
use crate::store::{IngestStore, MongoStore};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// User agent sent with every HTTP request
pub const USER_AGENT: &str = concat!("gdeltloader/", env!("CARGO_PKG_VERSION"));

#[derive(Parser, Debug, Clone)]
#[command(name = "gdeltloader")]
#[command(author, version, about = "Download and ingest GDELT 2.0 event archives")]
pub struct Cli {
    /// MongoDB connection string
    #[arg(long, env = "GDELT_MONGODB_URI", default_value = DEFAULT_MONGODB_URI)]
    pub mongodb: String,

    /// Which remote manifest to fetch
    #[arg(long, value_enum, env = "GDELT_ZIPLIST", default_value_t = ManifestKind::Incremental)]
    pub ziplist: ManifestKind,

    /// URL of the master file list
    #[arg(long, env = "GDELT_MASTER_URL", default_value = DEFAULT_MASTER_URL)]
    pub master: String,

    /// URL of the latest update list
    #[arg(long, env = "GDELT_INCREMENTAL_URL", default_value = DEFAULT_INCREMENTAL_URL)]
    pub incremental: String,

    /// Database name
    #[arg(long, env = "GDELT_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Events collection name
    #[arg(long, env = "GDELT_COLLECTION", default_value = DEFAULT_COLLECTION)]
    pub collection: String,

    /// Use a local manifest instead of fetching one
    #[arg(long, env = "GDELT_LOCAL_MANIFEST")]
    pub local: Option<PathBuf>,

    /// Re-download archives that already exist locally
    #[arg(long)]
    pub overwrite: bool,

    /// Download, verify, extract, and record the listed archives
    #[arg(long)]
    pub download: bool,

    /// Map lat/lon fields of the events collection to GeoJSON points
    #[arg(long, conflicts_with = "download")]
    pub mapgeo: bool,

    /// Directory for manifests, archives, and extracted files
    #[arg(long, env = "GDELT_WORKDIR", default_value = DEFAULT_WORKDIR)]
    pub workdir: PathBuf,

    /// Download progress style
    #[arg(long, value_enum, env = "GDELT_PROGRESS", default_value_t = ProgressMode::Dots)]
    pub progress: ProgressMode,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration and HTTP client shared by every stage
#[derive(Debug, Clone)]
pub struct IngestContext {
    pub config: IngestConfig,
    pub http: reqwest::Client,
}

impl IngestContext {
    pub fn new(config: IngestConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| IngestError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }
}

/// What a run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Geo reshape finished with this many documents in the target
    GeoMapped { documents: u64 },
    /// Manifest resolved without `--download`
    ManifestOnly { manifest: PathBuf },
    Ingested {
        manifest: PathBuf,
        summary: IngestSummary,
    },
}

/// Run one invocation against MongoDB
///
/// The database is only contacted by the geo reshape and after the manifest
/// has been resolved for a download run.
pub async fn run(config: IngestConfig) -> Result<RunOutcome> {
    let ctx = IngestContext::new(config)?;

    if ctx.config.map_geo {
        let store = MongoStore::connect(&ctx.config.database).await?;
        return map_events(&ctx, &store).await;
    }

    let manifest = prepare_manifest(&ctx).await?;
    if !ctx.config.download {
        return Ok(RunOutcome::ManifestOnly { manifest });
    }

    let store = MongoStore::connect(&ctx.config.database).await?;
    ingest_manifest(&ctx, &store, manifest).await
}

/// Run one invocation against an already-open store
pub async fn run_with_store(ctx: &IngestContext, store: &dyn IngestStore) -> Result<RunOutcome> {
    if ctx.config.map_geo {
        return map_events(ctx, store).await;
    }

    let manifest = prepare_manifest(ctx).await?;
    if !ctx.config.download {
        return Ok(RunOutcome::ManifestOnly { manifest });
    }

    ingest_manifest(ctx, store, manifest).await
}

async fn map_events(ctx: &IngestContext, store: &dyn IngestStore) -> Result<RunOutcome> {
    let reshape = GeoReshape::for_collection(&ctx.config.database.events_collection);
    let documents = geo::map_geo(store, &reshape).await?;
    Ok(RunOutcome::GeoMapped { documents })
}

async fn prepare_manifest(ctx: &IngestContext) -> Result<PathBuf> {
    tokio::fs::create_dir_all(&ctx.config.work_dir).await?;
    manifest::resolve(ctx).await
}

async fn ingest_manifest(
    ctx: &IngestContext,
    store: &dyn IngestStore,
    manifest: PathBuf,
) -> Result<RunOutcome> {
    store.ensure_indexes().await?;
    info!(manifest = %manifest.display(), "Processing manifest");
    let summary = pipeline::run_downloads(ctx, store, &manifest).await?;
    Ok(RunOutcome::Ingested { manifest, summary })
}
