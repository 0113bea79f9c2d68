//! Archive verification against manifest checksums

use crate::error::Result;
use gdelt_common::checksum::{verify_file_md5, ChecksumVerdict};
use gdelt_common::ManifestEntry;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified(PathBuf),
    Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified(_))
    }
}

/// Compare the MD5 of `path` with the entry's checksum
///
/// A size difference is logged but only the checksum decides the verdict.
pub async fn verify_archive(path: &Path, entry: &ManifestEntry) -> Result<Verification> {
    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() != entry.size {
        warn!(
            path = %path.display(),
            expected = entry.size,
            actual = metadata.len(),
            "Archive size differs from manifest"
        );
    }

    let verdict = verify_file_md5(path, &entry.checksum)?;

    Ok(match verdict {
        ChecksumVerdict::Match => {
            debug!(path = %path.display(), "Checksum verified");
            Verification::Verified(path.to_path_buf())
        },
        ChecksumVerdict::Mismatch { expected, actual } => Verification::Mismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use gdelt_common::checksum::compute_md5;

    fn entry_for(data: &[u8], checksum: String) -> ManifestEntry {
        ManifestEntry {
            size: data.len() as u64,
            checksum,
            url: "http://data.gdeltproject.org/gdeltv2/a.zip".to_string(),
        }
    }

    #[tokio::test]
    async fn test_verified_ignores_checksum_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.zip");
        std::fs::write(&path, b"archive bytes").unwrap();

        let entry = entry_for(b"archive bytes", compute_md5(b"archive bytes").to_uppercase());
        let verification = verify_archive(&path, &entry).await.unwrap();
        assert!(verification.is_verified());
    }

    #[tokio::test]
    async fn test_mismatch_reports_both_digests() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.zip");
        std::fs::write(&path, b"tampered").unwrap();

        let expected = compute_md5(b"original");
        let entry = entry_for(b"original", expected.clone());
        match verify_archive(&path, &entry).await.unwrap() {
            Verification::Mismatch { expected: e, actual, .. } => {
                assert_eq!(e, expected);
                assert_eq!(actual, compute_md5(b"tampered"));
            },
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_archive_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let entry = entry_for(b"", compute_md5(b""));
        assert!(verify_archive(&dir.path().join("gone.zip"), &entry).await.is_err());
    }
}
