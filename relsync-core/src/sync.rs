// relsync-core/src/sync.rs
use std::fs;
use std::path::{Path, PathBuf};

use relsync_common::config::RELEASE_ARTIFACTS_DIRNAME;
use relsync_common::error::{RelsyncError, Result};
use relsync_common::model::manifest::is_manifest_file_name;
use relsync_common::model::Manifest;
use relsync_common::plan::{SyncPlan, SyncSummary};
use relsync_common::store::ReleaseStore;
use relsync_io::read_json;
use tracing::{debug, info};

use crate::reconcile::{execute_plan, plan_target, RemoteState};

/// Names of the targets under `build_root` that have a release artifacts
/// directory, sorted.
pub fn discover_targets(build_root: &Path) -> Result<Vec<String>> {
    if !build_root.is_dir() {
        return Err(RelsyncError::Precondition(format!(
            "Build directory not found: {}",
            build_root.display()
        )));
    }
    let mut targets = Vec::new();
    for entry in fs::read_dir(build_root)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() && path.join(RELEASE_ARTIFACTS_DIRNAME).is_dir() {
            targets.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    targets.sort();
    debug!("Discovered {} targets in {}", targets.len(), build_root.display());
    Ok(targets)
}

/// A target's local publish state: its artifacts directory and manifest.
#[derive(Debug, Clone)]
pub struct TargetArtifacts {
    pub target: String,
    pub artifacts_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
}

impl TargetArtifacts {
    pub fn locate(build_root: &Path, target: &str) -> Result<Self> {
        validate_target_name(target)?;
        let artifacts_dir = build_root.join(target).join(RELEASE_ARTIFACTS_DIRNAME);
        if !artifacts_dir.is_dir() {
            return Err(RelsyncError::Precondition(format!(
                "Artifacts directory not found: {}",
                artifacts_dir.display()
            )));
        }

        let mut manifests = Vec::new();
        for entry in fs::read_dir(&artifacts_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_manifest_file_name(&name) && entry.path().is_file() {
                manifests.push(name);
            }
        }
        manifests.sort();
        let manifest_name = match manifests.as_slice() {
            [] => {
                return Err(RelsyncError::Precondition(format!(
                    "No manifest file found in {}",
                    artifacts_dir.display()
                )))
            }
            [single] => single.clone(),
            _ => {
                return Err(RelsyncError::MultipleManifests {
                    dir: artifacts_dir.display().to_string(),
                    names: manifests,
                })
            }
        };

        let manifest_path = artifacts_dir.join(&manifest_name);
        let manifest: Manifest = read_json(&manifest_path).map_err(|e| {
            RelsyncError::Precondition(format!(
                "Error reading manifest {}: {e}",
                manifest_path.display()
            ))
        })?;
        debug!(
            "Loaded {} with {} files",
            manifest_path.display(),
            manifest.files().len()
        );

        Ok(Self {
            target: target.to_string(),
            artifacts_dir,
            manifest_path,
            manifest,
        })
    }

    /// Published name of the manifest, equal to its file name on disk.
    pub fn manifest_name(&self) -> String {
        self.manifest_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn validate_target_name(target: &str) -> Result<()> {
    if target.is_empty() || target == "." || target == ".." || target.contains(['/', '\\']) {
        return Err(RelsyncError::ValidationError(format!(
            "Invalid target name '{target}'"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    pub dry_run: bool,
    pub force: bool,
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub plans: Vec<SyncPlan>,
    pub summary: SyncSummary,
}

/// Publishes the local state of one or more targets to a release.
pub struct SyncExecutor<'a, S: ReleaseStore + ?Sized> {
    store: &'a S,
    build_root: PathBuf,
    options: SyncOptions,
}

impl<'a, S: ReleaseStore + ?Sized> SyncExecutor<'a, S> {
    pub fn new(store: &'a S, build_root: impl Into<PathBuf>, options: SyncOptions) -> Self {
        Self {
            store,
            build_root: build_root.into(),
            options,
        }
    }

    /// Syncs `targets` to the release tagged `tag`, one target at a time.
    ///
    /// Every target is located before anything is read from the release, and
    /// a missing release fails before any target is touched. The first
    /// failing target aborts the run.
    pub fn run(&self, tag: &str, targets: &[String]) -> Result<SyncReport> {
        let located = targets
            .iter()
            .map(|target| TargetArtifacts::locate(&self.build_root, target))
            .collect::<Result<Vec<_>>>()?;

        info!("Fetching release information for tag: {}", tag);
        let release = self.store.release_by_tag(tag)?.ok_or_else(|| {
            RelsyncError::ReleaseNotFound {
                tag: tag.to_string(),
                repo: self.store.repo().to_string(),
            }
        })?;
        info!(
            "Release found: {} (ID: {})",
            release.display_name(),
            release.id
        );

        let mut report = SyncReport {
            plans: Vec::with_capacity(located.len()),
            summary: SyncSummary::default(),
        };
        for local in &located {
            let remote = RemoteState::fetch(
                self.store,
                &release,
                &local.manifest_name(),
                self.options.force,
            )?;
            let plan = plan_target(local, &remote, self.options.force);
            report.summary += execute_plan(self.store, &release, &plan, self.options.dry_run)?;
            report.plans.push(plan);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn artifacts_dir(root: &Path, target: &str) -> PathBuf {
        let dir = root.join(target).join(RELEASE_ARTIFACTS_DIRNAME);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_discover_targets() {
        let dir = TempDir::new().unwrap();
        artifacts_dir(dir.path(), "win-x64-cuda-sm86");
        artifacts_dir(dir.path(), "linux-x64-cpu-any");
        fs::create_dir_all(dir.path().join("logs")).unwrap();
        fs::write(dir.path().join("CMakeCache.txt"), "").unwrap();

        assert_eq!(
            discover_targets(dir.path()).unwrap(),
            ["linux-x64-cpu-any", "win-x64-cuda-sm86"]
        );
    }

    #[test]
    fn test_discover_requires_build_root() {
        let dir = TempDir::new().unwrap();
        let err = discover_targets(&dir.path().join("build")).unwrap_err();
        assert!(matches!(err, RelsyncError::Precondition(_)));
    }

    #[test]
    fn test_locate_reads_the_single_manifest() {
        let dir = TempDir::new().unwrap();
        let artifacts = artifacts_dir(dir.path(), "linux-x64-cpu-any");
        fs::write(
            artifacts.join("linux-x64-cpu-any-manifest.json"),
            r#"{"files": {"sd": {"sha256": "aa", "uri": "linux-x64-cpu-any-sd.tar.gz"}}}"#,
        )
        .unwrap();
        fs::write(artifacts.join("linux-x64-cpu-any-sd.tar.gz"), b"gz").unwrap();

        let located = TargetArtifacts::locate(dir.path(), "linux-x64-cpu-any").unwrap();
        assert_eq!(located.manifest_name(), "linux-x64-cpu-any-manifest.json");
        assert_eq!(located.manifest.files()["sd"].sha256, "aa");
    }

    #[test]
    fn test_locate_preconditions() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            TargetArtifacts::locate(dir.path(), "linux-x64-cpu-any"),
            Err(RelsyncError::Precondition(_))
        ));

        let artifacts = artifacts_dir(dir.path(), "linux-x64-cpu-any");
        assert!(matches!(
            TargetArtifacts::locate(dir.path(), "linux-x64-cpu-any"),
            Err(RelsyncError::Precondition(_))
        ));

        fs::write(artifacts.join("a-manifest.json"), "{}").unwrap();
        fs::write(artifacts.join("b-manifest.json"), "{}").unwrap();
        assert!(matches!(
            TargetArtifacts::locate(dir.path(), "linux-x64-cpu-any"),
            Err(RelsyncError::MultipleManifests { names, .. }) if names == ["a-manifest.json", "b-manifest.json"]
        ));

        fs::remove_file(artifacts.join("b-manifest.json")).unwrap();
        fs::write(artifacts.join("a-manifest.json"), "not json").unwrap();
        assert!(matches!(
            TargetArtifacts::locate(dir.path(), "linux-x64-cpu-any"),
            Err(RelsyncError::Precondition(_))
        ));

        assert!(matches!(
            TargetArtifacts::locate(dir.path(), "../escape"),
            Err(RelsyncError::ValidationError(_))
        ));
    }
}
