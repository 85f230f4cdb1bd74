// relsync-core/src/manifest_builder.rs
use relsync_common::model::{FileEntry, Manifest, ManifestExtras};
use tracing::{debug, warn};

use crate::archive_cache::ArchivedArtifact;

/// Accumulates archived artifacts and platform extras into a `Manifest`.
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    manifest: Manifest,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `archived` under its basename. A later archive with the same
    /// basename replaces the earlier entry.
    pub fn add_archive(&mut self, archived: &ArchivedArtifact) -> &mut Self {
        if self.manifest.files().contains_key(&archived.basename) {
            debug!(
                "{} now published as {}",
                archived.basename, archived.archive_name
            );
        }
        self.manifest.insert_file(
            archived.basename.clone(),
            FileEntry {
                sha256: archived.sha256.clone(),
                uri: archived.archive_name.clone(),
            },
        );
        self
    }

    pub fn merge_extras(&mut self, extras: ManifestExtras) -> &mut Self {
        for (key, value) in extras {
            if !self.manifest.insert_extra(key.clone(), value) {
                warn!("Ignoring manifest extra '{key}': the key is reserved");
            }
        }
        self
    }

    pub fn build(self) -> Manifest {
        self.manifest
    }
}
