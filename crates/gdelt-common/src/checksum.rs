//! MD5 checksum utilities for archive verification
//!
//! GDELT manifests publish lowercase hex MD5 digests. Comparison is
//! case-insensitive so manifests produced by other tools still verify.

use crate::error::Result;
use std::io::Read;
use std::path::Path;

const READ_BUFFER_SIZE: usize = 8192;

/// Result of comparing a computed digest with the declared one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumVerdict {
    Match,
    Mismatch { expected: String, actual: String },
}

/// Compute the MD5 checksum of bytes
pub fn compute_md5(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

/// Compute the MD5 checksum of any readable source
pub fn compute_checksum<R: Read>(reader: &mut R) -> Result<String> {
    let mut context = md5::Context::new();
    let mut buffer = [0u8; READ_BUFFER_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        context.consume(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", context.compute()))
}

/// Compute the MD5 checksum of a file
pub fn compute_file_md5(path: impl AsRef<Path>) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    compute_checksum(&mut file)
}

/// Hex digests are equal ignoring ASCII case
pub fn checksums_match(actual: &str, expected: &str) -> bool {
    actual.eq_ignore_ascii_case(expected.trim())
}

/// Verify a file against an expected MD5 checksum
pub fn verify_file_md5(path: impl AsRef<Path>, expected: &str) -> Result<ChecksumVerdict> {
    let actual = compute_file_md5(path)?;
    if checksums_match(&actual, expected) {
        Ok(ChecksumVerdict::Match)
    } else {
        Ok(ChecksumVerdict::Mismatch {
            expected: expected.to_string(),
            actual,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_compute_md5() {
        assert_eq!(compute_md5(b"hello"), "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(compute_md5(b""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let data = vec![7u8; READ_BUFFER_SIZE * 3 + 17];
        let mut cursor = Cursor::new(&data);
        assert_eq!(compute_checksum(&mut cursor).unwrap(), compute_md5(&data));
    }

    #[test]
    fn test_verify_file_case_insensitive() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"test").unwrap();
        temp_file.flush().unwrap();

        let lowercase = "098f6bcd4621d373cade4e832627b4f6";
        let uppercase = "098F6BCD4621D373CADE4E832627B4F6";
        assert_eq!(verify_file_md5(temp_file.path(), lowercase).unwrap(), ChecksumVerdict::Match);
        assert_eq!(verify_file_md5(temp_file.path(), uppercase).unwrap(), ChecksumVerdict::Match);
    }

    #[test]
    fn test_verify_file_single_character_difference() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"test").unwrap();
        temp_file.flush().unwrap();

        let off_by_one = "098f6bcd4621d373cade4e832627b4f7";
        let verdict = verify_file_md5(temp_file.path(), off_by_one).unwrap();
        assert_eq!(
            verdict,
            ChecksumVerdict::Mismatch {
                expected: off_by_one.to_string(),
                actual: "098f6bcd4621d373cade4e832627b4f6".to_string(),
            }
        );
    }

    #[test]
    fn test_verify_missing_file() {
        assert!(verify_file_md5("/nonexistent/archive.zip", "00").is_err());
    }
}
