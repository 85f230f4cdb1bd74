// relsync-common/src/model/mod.rs
pub mod manifest;
pub mod release;
pub mod target;

// Re-export
pub use manifest::{ExtraValue, FileEntry, Manifest, ManifestExtras};
pub use release::{Release, RemoteAsset};
pub use target::{Target, ANY_VARIANT};
