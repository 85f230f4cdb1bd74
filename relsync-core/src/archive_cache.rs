// relsync-core/src/archive_cache.rs
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use relsync_common::error::Result;
use relsync_common::model::{FileEntry, Manifest, Target};
use relsync_io::{compress_single_file, remove_file_if_exists, sha256_file};
use tracing::{debug, info, warn};

use crate::collect::ArtifactRecord;

/// An artifact that has a current archive on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedArtifact {
    pub basename: String,
    pub archive_name: String,
    pub archive_path: PathBuf,
    /// Digest of the uncompressed artifact.
    pub sha256: String,
    /// True when the existing archive was kept instead of recompressed.
    pub reused: bool,
}

/// Skips recompression of artifacts whose digest is unchanged since the last
/// manifest written to the artifacts directory.
///
/// The previous manifest is only a hint. When it is missing or unreadable the
/// cache starts empty and every artifact is compressed.
#[derive(Debug)]
pub struct ArchiveCache {
    artifacts_dir: PathBuf,
    recorded: BTreeMap<String, FileEntry>,
}

impl ArchiveCache {
    pub fn open(artifacts_dir: &Path, target: &Target) -> Self {
        let manifest_path = artifacts_dir.join(target.manifest_name());
        let recorded = match std::fs::read(&manifest_path) {
            Ok(bytes) => match Manifest::from_slice(&bytes) {
                Ok(manifest) => {
                    debug!(
                        "Loaded {} cached digests from {}",
                        manifest.files().len(),
                        manifest_path.display()
                    );
                    manifest.files().clone()
                }
                Err(e) => {
                    warn!(
                        "Ignoring unreadable previous manifest {}: {}",
                        manifest_path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No previous manifest at {}", manifest_path.display());
                BTreeMap::new()
            }
            Err(e) => {
                warn!(
                    "Ignoring previous manifest {}: {}",
                    manifest_path.display(),
                    e
                );
                BTreeMap::new()
            }
        };
        Self {
            artifacts_dir: artifacts_dir.to_path_buf(),
            recorded,
        }
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    /// Makes sure `artifacts_dir/{archive_target}-{basename}.tar.gz` holds the
    /// current content of `artifact`, compressing only when needed.
    pub fn ensure_archive(
        &self,
        artifact: &ArtifactRecord,
        archive_target: &Target,
    ) -> Result<ArchivedArtifact> {
        let sha256 = sha256_file(&artifact.path)?;
        let archive_name = archive_target.archive_name(&artifact.basename);
        let archive_path = self.artifacts_dir.join(&archive_name);

        let reused = self.is_current(&artifact.basename, &archive_name, &sha256)
            && archive_path.is_file();
        if reused {
            info!("Archive {archive_name} already exists and is up to date. Skipping compression.");
        } else {
            if remove_file_if_exists(&archive_path)? {
                debug!("Removed stale archive {}", archive_path.display());
            }
            info!("Compressing {} -> {}", artifact.basename, archive_name);
            compress_single_file(&artifact.path, &archive_path)?;
        }

        Ok(ArchivedArtifact {
            basename: artifact.basename.clone(),
            archive_name,
            archive_path,
            sha256,
            reused,
        })
    }

    fn is_current(&self, basename: &str, archive_name: &str, sha256: &str) -> bool {
        self.recorded
            .get(basename)
            .is_some_and(|entry| entry.sha256 == sha256 && entry.uri == archive_name)
    }
}
