//! Per-entry download pipeline
//!
//! Entries are processed one at a time in manifest order:
//! fetch, verify, extract, record. A checksum mismatch skips the entry;
//! any other failure ends the run.

use crate::error::Result;
use crate::extract::extract_archive;
use crate::fetch::ArchiveFetcher;
use crate::manifest::ManifestReader;
use crate::store::{IngestStore, RecordOutcome};
use crate::verify::{verify_archive, Verification};
use crate::IngestContext;
use gdelt_common::{DownloadRecord, GdeltError, ManifestEntry};
use std::path::Path;
use tracing::{info, warn};

/// Counts for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub entries: usize,
    pub downloaded: usize,
    pub reused: usize,
    pub recorded: usize,
    pub already_recorded: usize,
    pub checksum_mismatches: usize,
    pub files_extracted: usize,
}

impl IngestSummary {
    fn add(&mut self, report: &EntryReport) {
        self.entries += 1;
        if report.downloaded {
            self.downloaded += 1;
        } else {
            self.reused += 1;
        }
        match &report.outcome {
            EntryOutcome::Recorded { extracted } => {
                self.recorded += 1;
                self.files_extracted += extracted.len();
            },
            EntryOutcome::AlreadyRecorded { extracted } => {
                self.already_recorded += 1;
                self.files_extracted += extracted.len();
            },
            EntryOutcome::ChecksumMismatch { .. } => self.checksum_mismatches += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    /// Archive file name inside the working directory
    pub local_path: String,
    pub downloaded: bool,
    pub outcome: EntryOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Recorded { extracted: Vec<String> },
    AlreadyRecorded { extracted: Vec<String> },
    /// Archive left on disk, not extracted or recorded
    ChecksumMismatch { expected: String, actual: String },
}

/// Process every entry of `manifest`
pub async fn run_downloads(
    ctx: &IngestContext,
    store: &dyn IngestStore,
    manifest: &Path,
) -> Result<IngestSummary> {
    let config = &ctx.config;
    let fetcher = ArchiveFetcher::new(
        ctx.http.clone(),
        &config.work_dir,
        config.overwrite,
        config.progress,
    );

    let mut summary = IngestSummary::default();
    for entry in ManifestReader::open(manifest)? {
        let report = process_entry(&fetcher, store, &entry?, &config.work_dir).await?;
        summary.add(&report);
    }

    info!(
        entries = summary.entries,
        downloaded = summary.downloaded,
        reused = summary.reused,
        recorded = summary.recorded,
        already_recorded = summary.already_recorded,
        checksum_mismatches = summary.checksum_mismatches,
        files_extracted = summary.files_extracted,
        "Ingestion complete"
    );
    Ok(summary)
}

/// Run fetch, verify, extract, and record for one entry
pub async fn process_entry(
    fetcher: &ArchiveFetcher,
    store: &dyn IngestStore,
    entry: &ManifestEntry,
    work_dir: &Path,
) -> Result<EntryReport> {
    let archive = fetcher.fetch(entry).await?;

    let outcome = match verify_archive(&archive.path, entry).await? {
        Verification::Mismatch { expected, actual, .. } => {
            let mismatch = GdeltError::checksum_mismatch(&entry.url, &expected, &actual);
            warn!("{}; skipping entry", mismatch);
            EntryOutcome::ChecksumMismatch { expected, actual }
        },
        Verification::Verified(path) => {
            let extracted = extract_archive(&path, work_dir)?;
            for name in &extracted {
                info!(file = %name, "Extracted");
            }

            let record = DownloadRecord::for_entry(entry, archive.local_name.clone());
            match store.record_download(&record).await? {
                RecordOutcome::Inserted => {
                    info!(remote = %record.remote_url, md5 = %record.checksum, "Recorded download");
                    EntryOutcome::Recorded { extracted }
                },
                RecordOutcome::AlreadyRecorded => {
                    info!(
                        remote = %record.remote_url,
                        md5 = %record.checksum,
                        "Download already recorded"
                    );
                    EntryOutcome::AlreadyRecorded { extracted }
                },
            }
        },
    };

    Ok(EntryReport {
        local_path: archive.local_name,
        downloaded: archive.downloaded,
        outcome,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_outcomes() {
        let mut summary = IngestSummary::default();
        summary.add(&EntryReport {
            local_path: "a.zip".to_string(),
            downloaded: true,
            outcome: EntryOutcome::Recorded {
                extracted: vec!["a.CSV".to_string(), "b.CSV".to_string()],
            },
        });
        summary.add(&EntryReport {
            local_path: "b.zip".to_string(),
            downloaded: false,
            outcome: EntryOutcome::ChecksumMismatch {
                expected: "aa".to_string(),
                actual: "bb".to_string(),
            },
        });

        assert_eq!(
            summary,
            IngestSummary {
                entries: 2,
                downloaded: 1,
                reused: 1,
                recorded: 1,
                already_recorded: 0,
                checksum_mismatches: 1,
                files_extracted: 2,
            }
        );
    }
}
