//! Manifest resolution and parsing
//!
//! GDELT publishes two manifests: `masterfilelist.txt` with every archive
//! since 2015, and `lastupdate.txt` with the archives from the latest
//! 15 minute update. Both use the `<size> <md5> <url>` line format.

use crate::config::ManifestSource;
use crate::error::{IngestError, Result};
use crate::IngestContext;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use gdelt_common::ManifestEntry;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use tracing::info;

/// Which remote manifest to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ManifestKind {
    /// Every archive published since the start of GDELT 2.0
    Master,
    /// Archives from the latest update only
    #[default]
    Incremental,
}

impl std::fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestKind::Master => write!(f, "master"),
            ManifestKind::Incremental => write!(f, "incremental"),
        }
    }
}

/// Local name for a fetched manifest, e.g. `gdelt_master-file-01-31-2024-23-15-00.txt`
pub fn manifest_file_name(kind: ManifestKind, fetched_at: DateTime<Utc>) -> String {
    format!("gdelt_{}-file-{}.txt", kind, fetched_at.format("%m-%d-%Y-%H-%M-%S"))
}

/// Return the path of the manifest to ingest, fetching it when remote
pub async fn resolve(ctx: &IngestContext) -> Result<PathBuf> {
    match &ctx.config.manifest {
        ManifestSource::Local(path) => resolve_local(path),
        ManifestSource::Remote { kind, url } => {
            fetch_remote(&ctx.http, *kind, url, &ctx.config.work_dir).await
        },
    }
}

/// Accept a local manifest only if it is an existing file
pub fn resolve_local(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        info!(path = %path.display(), "Using local manifest");
        Ok(path.to_path_buf())
    } else {
        Err(IngestError::NotFound(path.to_path_buf()))
    }
}

/// Download a manifest and save it under its timestamped name in `work_dir`
pub async fn fetch_remote(
    client: &reqwest::Client,
    kind: ManifestKind,
    url: &str,
    work_dir: &Path,
) -> Result<PathBuf> {
    info!(%kind, %url, "Fetching manifest");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| IngestError::transfer(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(IngestError::transfer(url, format!("HTTP status {}", status)));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| IngestError::transfer(url, e))?;
    let text = String::from_utf8(body.to_vec()).map_err(|e| IngestError::decode(url, e))?;

    let path = work_dir.join(manifest_file_name(kind, Utc::now()));
    tokio::fs::write(&path, text.as_bytes()).await?;

    info!(path = %path.display(), lines = text.lines().count(), "Created local manifest file");
    Ok(path)
}

/// Lazy iterator over the entries of a manifest
///
/// Blank lines are skipped; the first malformed line yields an error.
pub struct ManifestReader<R> {
    lines: Lines<R>,
    line_number: usize,
}

impl ManifestReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ManifestReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for ManifestReader<R> {
    type Item = Result<ManifestEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_number += 1;

            match ManifestEntry::parse_line(&line, self.line_number) {
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
