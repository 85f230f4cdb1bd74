// relsync-common/src/plan.rs
use std::fmt;
use std::ops::AddAssign;
use std::path::PathBuf;

use crate::model::RemoteAsset;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanAction {
    Skip,
    UploadNew,
    /// Delete `existing`, then upload the local copy.
    Replace {
        existing: RemoteAsset,
    },
}

impl PlanAction {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, PlanAction::Skip)
    }
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::UploadNew => write!(f, "upload-new"),
            Self::Replace { .. } => write!(f, "replace"),
        }
    }
}

/// Why a plan action was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanReason {
    Forced,
    NotOnRemote,
    ManifestMatches,
    ManifestDiffers,
    /// The release holds no copy of the manifest to compare against.
    NoRemoteManifest,
    RemoteManifestUnavailable,
    HashMatches,
    HashDiffers { local: String, remote: String },
    NotInRemoteManifest,
}

impl fmt::Display for PlanReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forced => write!(f, "forced"),
            Self::NotOnRemote => write!(f, "not on remote"),
            Self::ManifestMatches => write!(f, "manifest content matches"),
            Self::ManifestDiffers => write!(f, "manifest content differs"),
            Self::NoRemoteManifest => write!(f, "no remote manifest"),
            Self::RemoteManifestUnavailable => write!(f, "remote manifest unavailable"),
            Self::HashMatches => write!(f, "manifest hash matches"),
            Self::HashDiffers { local, remote } => write!(
                f,
                "manifest hash differs (local: {}..., remote: {}...)",
                short_hash(local),
                short_hash(remote)
            ),
            Self::NotInRemoteManifest => write!(f, "remote hash not found in manifest"),
        }
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..16).unwrap_or(hash)
}

/// The decision for one published object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    /// Published name on the remote store.
    pub name: String,
    pub local_path: PathBuf,
    pub action: PlanAction,
    pub reason: PlanReason,
}

/// A manifest entry whose local archive is gone. Neither uploaded nor deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingArtifact {
    pub name: String,
    pub local_path: PathBuf,
}

/// Everything reconciliation decided for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub target: String,
    pub manifest: PlannedItem,
    pub files: Vec<PlannedItem>,
    pub missing: Vec<MissingArtifact>,
}

impl SyncPlan {
    /// All items, files first and the manifest last, in execution order.
    pub fn items(&self) -> impl Iterator<Item = &PlannedItem> {
        self.files.iter().chain(std::iter::once(&self.manifest))
    }

    pub fn is_all_skip(&self) -> bool {
        self.items().all(|item| item.action == PlanAction::Skip)
    }

    pub fn summary(&self) -> SyncSummary {
        let mut summary = SyncSummary {
            missing: self.missing.len(),
            ..SyncSummary::default()
        };
        for item in self.items() {
            if item.action.is_mutation() {
                summary.uploaded += 1;
            } else {
                summary.skipped += 1;
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub uploaded: usize,
    pub skipped: usize,
    pub missing: usize,
}

impl AddAssign for SyncSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.uploaded += rhs.uploaded;
        self.skipped += rhs.skipped;
        self.missing += rhs.missing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, action: PlanAction) -> PlannedItem {
        PlannedItem {
            name: name.to_string(),
            local_path: PathBuf::from(name),
            action,
            reason: PlanReason::NotOnRemote,
        }
    }

    #[test]
    fn test_items_put_manifest_last() {
        let plan = SyncPlan {
            target: "t".into(),
            manifest: item("t-manifest.json", PlanAction::UploadNew),
            files: vec![
                item("t-a.tar.gz", PlanAction::Skip),
                item("t-b.tar.gz", PlanAction::UploadNew),
            ],
            missing: vec![],
        };
        let names: Vec<_> = plan.items().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["t-a.tar.gz", "t-b.tar.gz", "t-manifest.json"]);
        assert!(!plan.is_all_skip());
    }

    #[test]
    fn test_summary_counts() {
        let existing = RemoteAsset {
            id: 3,
            name: "t-c.tar.gz".into(),
            browser_download_url: "https://example.invalid/t-c.tar.gz".into(),
            size: 0,
        };
        let plan = SyncPlan {
            target: "t".into(),
            manifest: item("t-manifest.json", PlanAction::Skip),
            files: vec![
                item("t-a.tar.gz", PlanAction::Skip),
                item("t-b.tar.gz", PlanAction::UploadNew),
                item("t-c.tar.gz", PlanAction::Replace { existing }),
            ],
            missing: vec![MissingArtifact {
                name: "t-d.tar.gz".into(),
                local_path: PathBuf::from("t-d.tar.gz"),
            }],
        };

        let mut total = SyncSummary::default();
        total += plan.summary();
        total += plan.summary();
        assert_eq!(
            total,
            SyncSummary {
                uploaded: 4,
                skipped: 4,
                missing: 2
            }
        );
    }

    #[test]
    fn test_reason_display_truncates_hashes() {
        let reason = PlanReason::HashDiffers {
            local: "a".repeat(64),
            remote: "b".repeat(64),
        };
        assert_eq!(
            reason.to_string(),
            format!(
                "manifest hash differs (local: {}..., remote: {}...)",
                "a".repeat(16),
                "b".repeat(16)
            )
        );
    }
}
