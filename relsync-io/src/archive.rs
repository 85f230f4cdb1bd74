// relsync-io/src/archive.rs
// Single-entry tar.gz creation for release artifacts.

use std::fs::{File, Metadata};
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::{Compression, GzBuilder};
use relsync_common::error::{RelsyncError, Result};
use tracing::debug;

use crate::fs::{persist_temp_file, temp_file_beside};

/// Compresses `input` into a gzip'd tar at `output` holding exactly one entry
/// named after the input's basename.
///
/// Uses maximum compression and fixed header metadata, so the same input bytes
/// always produce the same archive bytes. The archive is written to a
/// temporary file and renamed into place only once complete.
pub fn compress_single_file(input: &Path, output: &Path) -> Result<()> {
    let basename = input.file_name().ok_or_else(|| {
        RelsyncError::Archive(format!("{} has no file name", input.display()))
    })?;

    // File::open follows symlinks, so a linked library is archived by content.
    let source = File::open(input)?;
    let metadata = source.metadata()?;
    if !metadata.is_file() {
        return Err(RelsyncError::Archive(format!(
            "{} is not a regular file",
            input.display()
        )));
    }

    debug!(
        "Compressing {} ({} bytes) -> {}",
        input.display(),
        metadata.len(),
        output.display()
    );

    let mut temp_file = temp_file_beside(output)?;
    {
        let writer = BufWriter::new(temp_file.as_file_mut());
        let encoder = GzBuilder::new().mtime(0).write(writer, Compression::best());
        let mut builder = tar::Builder::new(encoder);

        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(metadata.len());
        header.set_mode(entry_mode(&metadata));
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);

        builder
            .append_data(&mut header, basename, source)
            .map_err(|e| {
                RelsyncError::Archive(format!("Failed to add {} to archive: {e}", input.display()))
            })?;
        let encoder = builder.into_inner()?;
        let mut writer = encoder.finish()?;
        writer.flush()?;
    }
    temp_file.as_file().sync_all()?;
    persist_temp_file(temp_file, output)
}

#[cfg(unix)]
fn entry_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    if metadata.permissions().mode() & 0o111 != 0 {
        0o755
    } else {
        0o644
    }
}

#[cfg(not(unix))]
fn entry_mode(_metadata: &Metadata) -> u32 {
    0o644
}
