// relsync-common/src/store.rs
use std::path::Path;

use crate::error::Result;
use crate::model::{Release, RemoteAsset};

/// Primitive operations on a remote release store.
///
/// Implementations perform no retries; every call either succeeds or returns
/// the transport error.
pub trait ReleaseStore {
    /// `owner/repo` the store publishes to, for messages.
    fn repo(&self) -> &str;

    /// Resolves a tag to its release, `Ok(None)` when no such release exists.
    fn release_by_tag(&self, tag: &str) -> Result<Option<Release>>;

    fn list_assets(&self, release: &Release) -> Result<Vec<RemoteAsset>>;

    fn fetch_asset(&self, asset: &RemoteAsset) -> Result<Vec<u8>>;

    fn upload_asset(&self, release: &Release, path: &Path, name: &str) -> Result<RemoteAsset>;

    fn delete_asset(&self, asset: &RemoteAsset) -> Result<()>;
}
