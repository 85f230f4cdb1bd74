// relsync-core/src/reconcile.rs
//! Decides, per target, which release assets to keep, upload or replace, and
//! applies those decisions.

use std::collections::BTreeMap;

use relsync_common::error::Result;
use relsync_common::model::{Manifest, Release, RemoteAsset};
use relsync_common::plan::{
    MissingArtifact, PlanAction, PlanReason, PlannedItem, SyncPlan, SyncSummary,
};
use relsync_common::store::ReleaseStore;
use tracing::{debug, info, warn};

use crate::sync::TargetArtifacts;

/// What the release held for a target's manifest when the remote state was read.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishedManifest {
    Absent,
    /// Present but deliberately not downloaded (force mode).
    NotFetched,
    /// Present but could not be downloaded or parsed.
    Unreadable,
    Parsed(Manifest),
}

/// A release's asset listing plus the previously published manifest.
#[derive(Debug, Clone)]
pub struct RemoteState {
    assets: BTreeMap<String, RemoteAsset>,
    published: PublishedManifest,
}

impl RemoteState {
    pub fn new(assets: Vec<RemoteAsset>, published: PublishedManifest) -> Self {
        Self {
            assets: assets.into_iter().map(|a| (a.name.clone(), a)).collect(),
            published,
        }
    }

    /// Lists the release's assets and downloads the published copy of
    /// `manifest_name`. Listing errors are fatal; a manifest that cannot be
    /// downloaded or parsed is recorded as `Unreadable`.
    pub fn fetch<S: ReleaseStore + ?Sized>(
        store: &S,
        release: &Release,
        manifest_name: &str,
        force: bool,
    ) -> Result<Self> {
        let assets = store.list_assets(release)?;
        info!("Existing assets: {}", assets.len());

        let published = match assets.iter().find(|a| a.name == manifest_name) {
            None => PublishedManifest::Absent,
            Some(_) if force => {
                debug!("Force mode, not downloading {}", manifest_name);
                PublishedManifest::NotFetched
            }
            Some(asset) => match store.fetch_asset(asset) {
                Ok(bytes) => match Manifest::from_slice(&bytes) {
                    Ok(manifest) => PublishedManifest::Parsed(manifest),
                    Err(e) => {
                        warn!("Could not parse manifest {}: {}", asset.name, e);
                        PublishedManifest::Unreadable
                    }
                },
                Err(e) => {
                    warn!("Could not download manifest {}: {}", asset.name, e);
                    PublishedManifest::Unreadable
                }
            },
        };
        Ok(Self::new(assets, published))
    }

    pub fn asset(&self, name: &str) -> Option<&RemoteAsset> {
        self.assets.get(name)
    }

    pub fn published(&self) -> &PublishedManifest {
        &self.published
    }
}

/// Plans the sync of one target against `remote`. Reads local file existence
/// and nothing else; live and dry runs share this plan.
pub fn plan_target(local: &TargetArtifacts, remote: &RemoteState, force: bool) -> SyncPlan {
    let manifest_name = local.manifest_name();
    let (action, reason) = match remote.asset(&manifest_name) {
        None => (PlanAction::UploadNew, PlanReason::NotOnRemote),
        Some(existing) => {
            let reason = match remote.published() {
                _ if force => PlanReason::Forced,
                PublishedManifest::Parsed(published) if *published == local.manifest => {
                    PlanReason::ManifestMatches
                }
                PublishedManifest::Parsed(_) => PlanReason::ManifestDiffers,
                PublishedManifest::Absent => PlanReason::NoRemoteManifest,
                PublishedManifest::NotFetched | PublishedManifest::Unreadable => {
                    PlanReason::RemoteManifestUnavailable
                }
            };
            (replace_unless_matching(&reason, existing), reason)
        }
    };
    let manifest = PlannedItem {
        name: manifest_name,
        local_path: local.manifest_path.clone(),
        action,
        reason,
    };

    let mut files = Vec::new();
    let mut missing = Vec::new();
    for entry in local.manifest.files().values() {
        let local_path = local.artifacts_dir.join(&entry.uri);
        if !local_path.is_file() {
            missing.push(MissingArtifact {
                name: entry.uri.clone(),
                local_path,
            });
            continue;
        }

        let (action, reason) = match remote.asset(&entry.uri) {
            None => (PlanAction::UploadNew, PlanReason::NotOnRemote),
            Some(existing) => {
                let reason = if force {
                    PlanReason::Forced
                } else {
                    file_reason(remote.published(), &entry.uri, &entry.sha256)
                };
                (replace_unless_matching(&reason, existing), reason)
            }
        };
        files.push(PlannedItem {
            name: entry.uri.clone(),
            local_path,
            action,
            reason,
        });
    }

    SyncPlan {
        target: local.target.clone(),
        manifest,
        files,
        missing,
    }
}

fn file_reason(published: &PublishedManifest, uri: &str, local_sha: &str) -> PlanReason {
    let published = match published {
        PublishedManifest::Parsed(published) => published,
        PublishedManifest::Absent => return PlanReason::NoRemoteManifest,
        PublishedManifest::NotFetched | PublishedManifest::Unreadable => {
            return PlanReason::RemoteManifestUnavailable
        }
    };
    match published.entry_by_uri(uri) {
        Some(entry) if entry.sha256 == local_sha => PlanReason::HashMatches,
        Some(entry) => PlanReason::HashDiffers {
            local: local_sha.to_string(),
            remote: entry.sha256.clone(),
        },
        None => PlanReason::NotInRemoteManifest,
    }
}

fn replace_unless_matching(reason: &PlanReason, existing: &RemoteAsset) -> PlanAction {
    match reason {
        PlanReason::ManifestMatches | PlanReason::HashMatches => PlanAction::Skip,
        _ => PlanAction::Replace {
            existing: existing.clone(),
        },
    }
}

/// Applies `plan` in order, files before the manifest. With `dry_run` every
/// mutation is announced and none is performed.
pub fn execute_plan<S: ReleaseStore + ?Sized>(
    store: &S,
    release: &Release,
    plan: &SyncPlan,
    dry_run: bool,
) -> Result<SyncSummary> {
    info!(
        "Processing {}: {} files in manifest",
        plan.target,
        plan.files.len() + plan.missing.len()
    );
    for missing in &plan.missing {
        warn!("File not found: {}", missing.local_path.display());
    }

    for item in plan.items() {
        info!("  {}: {} ({})", item.name, item.action, item.reason);
        match &item.action {
            PlanAction::Skip => {}
            PlanAction::UploadNew => upload(store, release, item, dry_run)?,
            PlanAction::Replace { existing } => {
                if dry_run {
                    info!("    [DRY RUN] Would delete existing asset: {}", existing.name);
                } else {
                    store.delete_asset(existing)?;
                    debug!("Deleted existing asset: {} (id {})", existing.name, existing.id);
                }
                upload(store, release, item, dry_run)?;
            }
        }
    }
    Ok(plan.summary())
}

fn upload<S: ReleaseStore + ?Sized>(
    store: &S,
    release: &Release,
    item: &PlannedItem,
    dry_run: bool,
) -> Result<()> {
    let size = std::fs::metadata(&item.local_path)?.len();
    if dry_run {
        info!("    [DRY RUN] Would upload: {} ({} bytes)", item.name, size);
        return Ok(());
    }
    let asset = store.upload_asset(release, &item.local_path, &item.name)?;
    info!("    Uploaded: {} ({} bytes)", asset.name, size);
    Ok(())
}
