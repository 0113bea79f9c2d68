//! Archive extraction
//!
//! GDELT archives hold tab-separated text. Each member is decoded as UTF-8
//! and written next to the archive.

use crate::error::{IngestError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Upper bound on the buffer reserved from a member's declared size
const MAX_PREALLOCATION: u64 = 1024 * 1024;

/// Extract every file member of `archive` into `output_dir`
///
/// Returns the member names in archive order. Directory members are
/// skipped and nested paths get their parent directories created.
pub fn extract_archive(archive: &Path, output_dir: &Path) -> Result<Vec<String>> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;
    let mut extracted = Vec::with_capacity(zip.len());

    for i in 0..zip.len() {
        let mut member = zip.by_index(i)?;
        if member.is_dir() {
            continue;
        }

        let name = member.name().to_string();
        let relative = member
            .enclosed_name()
            .ok_or_else(|| IngestError::UnsafeEntry(name.clone()))?;

        let declared = member.size();
        let raw = read_member(&mut member, declared)?;
        let text = String::from_utf8(raw).map_err(|e| IngestError::decode(&name, e))?;

        let target = output_dir.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, text.as_bytes())?;

        debug!(member = %name, bytes = text.len(), "Extracted archive member");
        extracted.push(name);
    }

    info!(archive = %archive.display(), files = extracted.len(), "Extracted archive");
    Ok(extracted)
}

/// Read a member to the end; the header's size only sizes the initial buffer
fn read_member<R: Read>(reader: &mut R, declared_size: u64) -> std::io::Result<Vec<u8>> {
    let reserve = usize::try_from(declared_size.min(MAX_PREALLOCATION)).unwrap_or(0);
    let mut raw = Vec::with_capacity(reserve);
    reader.read_to_end(&mut raw)?;
    Ok(raw)
}
