// relsync-io/src/checksum.rs
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use relsync_common::error::Result;
use sha2::{Digest, Sha256};
use tracing::debug;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Streams `path` through SHA-256 and returns the lowercase hex digest.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let mut hasher = Sha256::new();
    let bytes_copied = io::copy(&mut reader, &mut hasher)?;
    let digest = hex::encode(hasher.finalize());
    debug!(
        "Calculated SHA256 for {}: {} ({} bytes read)",
        path.display(),
        digest,
        bytes_copied
    );
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_known_digest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, b"hello world").unwrap();

        assert_eq!(
            sha256_file(&path).unwrap(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_single_byte_change_changes_digest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.bin");
        let mut bytes = vec![7u8; 3 * READ_BUFFER_SIZE + 11];
        std::fs::write(&path, &bytes).unwrap();
        let before = sha256_file(&path).unwrap();

        bytes[READ_BUFFER_SIZE + 5] ^= 1;
        std::fs::write(&path, &bytes).unwrap();
        let after = sha256_file(&path).unwrap();

        assert_ne!(before, after);
        assert_eq!(after.len(), 64);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = sha256_file(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, relsync_common::RelsyncError::Io(_)));
    }
}
