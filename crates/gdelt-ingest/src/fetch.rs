//! Archive fetching
//!
//! Archives land in the working directory under the last segment of their
//! URL. Existing files are reused unless overwrite is requested.

use crate::error::{IngestError, Result};
use crate::progress::ProgressMode;
use futures::TryStreamExt;
use gdelt_common::ManifestEntry;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio_util::io::StreamReader;
use tracing::{debug, info};

/// Bytes read from the response body per write
pub const DOWNLOAD_CHUNK_SIZE: usize = 8 * 1024;

/// A local archive ready for verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArchive {
    pub path: PathBuf,
    /// File name relative to the working directory
    pub local_name: String,
    /// False when an existing file was reused
    pub downloaded: bool,
}

pub struct ArchiveFetcher {
    client: reqwest::Client,
    work_dir: PathBuf,
    overwrite: bool,
    progress: ProgressMode,
}

impl ArchiveFetcher {
    pub fn new(
        client: reqwest::Client,
        work_dir: impl Into<PathBuf>,
        overwrite: bool,
        progress: ProgressMode,
    ) -> Self {
        Self {
            client,
            work_dir: work_dir.into(),
            overwrite,
            progress,
        }
    }

    /// Ensure the entry's archive exists locally
    pub async fn fetch(&self, entry: &ManifestEntry) -> Result<FetchedArchive> {
        let local_name = entry.local_name()?.to_string();
        let path = self.work_dir.join(&local_name);

        if !self.overwrite && tokio::fs::try_exists(&path).await? {
            info!(path = %path.display(), "Archive exists locally");
            return Ok(FetchedArchive {
                path,
                local_name,
                downloaded: false,
            });
        }

        info!(url = %entry.url, size = entry.size, md5 = %entry.checksum, "Downloading archive");
        let written = self.download(&entry.url, &local_name, &path).await?;
        info!(path = %path.display(), bytes = written, "Created archive");

        Ok(FetchedArchive {
            path,
            local_name,
            downloaded: true,
        })
    }

    /// Stream the body to `path` chunk by chunk; returns the bytes written
    async fn download(&self, url: &str, name: &str, path: &Path) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IngestError::transfer(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::transfer(url, format!("HTTP status {}", status)));
        }

        let total = response.content_length();
        let mut body = Box::pin(StreamReader::new(
            response.bytes_stream().map_err(std::io::Error::other),
        ));

        let mut file = tokio::fs::File::create(path).await?;
        let mut progress = self.progress.reporter();
        progress.begin(name, total);

        let mut buffer = vec![0u8; DOWNLOAD_CHUNK_SIZE];
        let mut written = 0u64;
        loop {
            let len = read_chunk(&mut body, &mut buffer)
                .await
                .map_err(|e| IngestError::transfer(url, e))?;
            if len == 0 {
                break;
            }
            file.write_all(&buffer[..len]).await?;
            written += len as u64;
            progress.advance(len);
        }

        file.flush().await?;
        progress.finish();
        debug!(url, bytes = written, expected = ?total, "Transfer complete");

        Ok(written)
    }
}

/// Fill `buffer` from `reader`, stopping early only at end of stream
async fn read_chunk<R: AsyncRead + Unpin>(
    reader: &mut R,
    buffer: &mut [u8],
) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        let read = reader.read(&mut buffer[filled..]).await?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(filled)
}
