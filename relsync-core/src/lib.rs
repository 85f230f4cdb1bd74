// relsync-core/src/lib.rs

// Build side: turn build outputs into published archives and a manifest.
pub mod archive_cache;
pub mod build;
pub mod collect;
pub mod manifest_builder;
pub mod platform;

// Publish side: reconcile a target's manifest against a release.
pub mod reconcile;
pub mod sync;

pub use archive_cache::{ArchiveCache, ArchivedArtifact};
pub use build::{BuildContext, BuildOptions, BuildReport, BuildRunner};
pub use collect::{collect_release_files, ArtifactRecord};
pub use manifest_builder::ManifestBuilder;
pub use platform::{BuildPlatform, PlatformId, Variant};
pub use reconcile::{execute_plan, plan_target, PublishedManifest, RemoteState};
pub use sync::{discover_targets, SyncExecutor, SyncOptions, SyncReport, TargetArtifacts};
