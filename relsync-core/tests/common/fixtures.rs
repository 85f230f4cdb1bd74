use std::fs;
use std::path::{Path, PathBuf};

use relsync_common::config::RELEASE_ARTIFACTS_DIRNAME;
use relsync_common::model::{Manifest, Target};
use relsync_core::{collect_release_files, ArchiveCache, ManifestBuilder};
use relsync_io::write_json_pretty;
use tempfile::TempDir;

/// A throwaway `build/` directory.
pub struct BuildTree {
    _dir: TempDir,
    root: PathBuf,
}

#[allow(dead_code)]
impl BuildTree {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("build");
        fs::create_dir_all(&root).unwrap();
        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artifacts_dir(&self, target: &str) -> PathBuf {
        self.root.join(target).join(RELEASE_ARTIFACTS_DIRNAME)
    }
}

/// Writes `files` as build outputs of `target` and packages them the way a
/// build does: archives plus `{target}-manifest.json`.
#[allow(dead_code)]
pub fn package_target(build_root: &Path, target: &Target, files: &[(&str, &[u8])]) -> Manifest {
    let build_dir = build_root.join(target.to_string());
    let bin = build_dir.join("bin");
    fs::create_dir_all(&bin).unwrap();
    for (name, content) in files {
        fs::write(bin.join(name), content).unwrap();
    }

    let artifacts_dir = build_dir.join(RELEASE_ARTIFACTS_DIRNAME);
    let cache = ArchiveCache::open(&artifacts_dir, target);
    let mut builder = ManifestBuilder::new();
    for record in collect_release_files(&build_dir).unwrap() {
        builder.add_archive(&cache.ensure_archive(&record, target).unwrap());
    }
    let manifest = builder.build();
    write_json_pretty(&artifacts_dir.join(target.manifest_name()), &manifest).unwrap();
    manifest
}

/// Writes a manifest verbatim plus placeholder archives for `archives`.
#[allow(dead_code)]
pub fn write_raw_target(build_root: &Path, target: &str, manifest_json: &str, archives: &[&str]) {
    let artifacts_dir = build_root.join(target).join(RELEASE_ARTIFACTS_DIRNAME);
    fs::create_dir_all(&artifacts_dir).unwrap();
    fs::write(
        artifacts_dir.join(format!("{target}-manifest.json")),
        manifest_json,
    )
    .unwrap();
    for name in archives {
        fs::write(artifacts_dir.join(name), b"placeholder archive").unwrap();
    }
}
