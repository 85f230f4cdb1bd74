// relsync-core/src/collect.rs
use std::path::{Path, PathBuf};

use relsync_common::error::Result;
use tracing::debug;
use walkdir::WalkDir;

const SHARED_LIBRARY_EXTENSIONS: &[&str] = &[".so", ".dylib", ".dll"];

/// A distributable build output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    pub path: PathBuf,
    pub basename: String,
}

impl ArtifactRecord {
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let basename = path.file_name()?.to_string_lossy().into_owned();
        Some(Self { path, basename })
    }
}

/// Collects every file under `build_dir/bin` and the shared libraries under
/// `build_dir/lib`, sorted by path.
pub fn collect_release_files(build_dir: &Path) -> Result<Vec<ArtifactRecord>> {
    let mut records = Vec::new();
    walk_files(&build_dir.join("bin"), |_| true, &mut records)?;
    walk_files(&build_dir.join("lib"), is_shared_library, &mut records)?;
    records.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(
        "Collected {} release files from {}",
        records.len(),
        build_dir.display()
    );
    Ok(records)
}

fn is_shared_library(name: &str) -> bool {
    SHARED_LIBRARY_EXTENSIONS
        .iter()
        .any(|ext| name.ends_with(ext))
}

fn walk_files(
    dir: &Path,
    keep: impl Fn(&str) -> bool,
    records: &mut Vec<ArtifactRecord>,
) -> Result<()> {
    if !dir.is_dir() {
        debug!("No {} directory, nothing to collect", dir.display());
        return Ok(());
    }
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !keep(&name) {
            continue;
        }
        // Symlinks are archived by content; a dangling one has nothing to publish.
        if !entry.path().is_file() {
            debug!("Skipping {}: not a regular file", entry.path().display());
            continue;
        }
        if let Some(record) = ArtifactRecord::from_path(entry.path()) {
            records.push(record);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_collects_bin_and_shared_libraries() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("bin/sd-server"));
        touch(&root.join("bin/nested/ggml.dll"));
        touch(&root.join("lib/libstable-diffusion.so"));
        touch(&root.join("lib/libggml.dylib"));
        touch(&root.join("lib/libggml.a"));
        touch(&root.join("lib/cmake/config.cmake"));
        touch(&root.join("CMakeCache.txt"));

        let names: Vec<_> = collect_release_files(root)
            .unwrap()
            .into_iter()
            .map(|r| r.basename)
            .collect();
        assert_eq!(
            names,
            [
                "ggml.dll",
                "sd-server",
                "libggml.dylib",
                "libstable-diffusion.so"
            ]
        );
    }

    #[test]
    fn test_missing_directories_are_empty() {
        let dir = TempDir::new().unwrap();
        assert!(collect_release_files(dir.path()).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let dir = TempDir::new().unwrap();
        let bin = dir.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        std::os::unix::fs::symlink(bin.join("gone"), bin.join("link")).unwrap();
        touch(&bin.join("real"));

        let records = collect_release_files(dir.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].basename, "real");
    }
}
