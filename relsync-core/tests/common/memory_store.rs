use std::cell::{Cell, RefCell};
use std::path::Path;

use relsync_common::error::{RelsyncError, Result};
use relsync_common::model::{Release, RemoteAsset};
use relsync_common::store::ReleaseStore;

/// In-memory release store that records every call.
#[allow(dead_code)]
pub struct MemoryReleaseStore {
    release: Option<Release>,
    assets: RefCell<Vec<(RemoteAsset, Vec<u8>)>>,
    next_id: Cell<u64>,
    pub lookups: Cell<usize>,
    pub listings: Cell<usize>,
    pub fetches: Cell<usize>,
    pub uploads: RefCell<Vec<String>>,
    pub deletes: RefCell<Vec<String>>,
    pub fail_fetches: Cell<bool>,
    pub fail_uploads: Cell<bool>,
}

#[allow(dead_code)]
impl MemoryReleaseStore {
    pub fn new(tag: &str) -> Self {
        Self::with_release(Some(Release {
            id: 7,
            tag_name: tag.to_string(),
            name: Some(format!("Release {tag}")),
            upload_url: "https://uploads.example.invalid/repos/o/r/releases/7/assets{?name,label}"
                .to_string(),
        }))
    }

    pub fn without_release() -> Self {
        Self::with_release(None)
    }

    fn with_release(release: Option<Release>) -> Self {
        Self {
            release,
            assets: RefCell::new(Vec::new()),
            next_id: Cell::new(100),
            lookups: Cell::new(0),
            listings: Cell::new(0),
            fetches: Cell::new(0),
            uploads: RefCell::new(Vec::new()),
            deletes: RefCell::new(Vec::new()),
            fail_fetches: Cell::new(false),
            fail_uploads: Cell::new(false),
        }
    }

    /// Publishes `bytes` as `name` without counting it as a mutation.
    pub fn seed(&self, name: &str, bytes: &[u8]) {
        let asset = self.new_asset(name, bytes.len());
        self.assets.borrow_mut().push((asset, bytes.to_vec()));
    }

    pub fn asset_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .assets
            .borrow()
            .iter()
            .map(|(a, _)| a.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn bytes_of(&self, name: &str) -> Option<Vec<u8>> {
        self.assets
            .borrow()
            .iter()
            .find(|(a, _)| a.name == name)
            .map(|(_, b)| b.clone())
    }

    pub fn mutations(&self) -> usize {
        self.uploads.borrow().len() + self.deletes.borrow().len()
    }

    pub fn reset_counters(&self) {
        self.lookups.set(0);
        self.listings.set(0);
        self.fetches.set(0);
        self.uploads.borrow_mut().clear();
        self.deletes.borrow_mut().clear();
    }

    fn new_asset(&self, name: &str, size: usize) -> RemoteAsset {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        RemoteAsset {
            id,
            name: name.to_string(),
            browser_download_url: format!("https://example.invalid/download/{name}"),
            size: size as u64,
        }
    }
}

impl ReleaseStore for MemoryReleaseStore {
    fn repo(&self) -> &str {
        "example/project"
    }

    fn release_by_tag(&self, tag: &str) -> Result<Option<Release>> {
        self.lookups.set(self.lookups.get() + 1);
        Ok(self.release.clone().filter(|r| r.tag_name == tag))
    }

    fn list_assets(&self, _release: &Release) -> Result<Vec<RemoteAsset>> {
        self.listings.set(self.listings.get() + 1);
        Ok(self.assets.borrow().iter().map(|(a, _)| a.clone()).collect())
    }

    fn fetch_asset(&self, asset: &RemoteAsset) -> Result<Vec<u8>> {
        self.fetches.set(self.fetches.get() + 1);
        if self.fail_fetches.get() {
            return Err(RelsyncError::HttpError("connection reset".to_string()));
        }
        self.assets
            .borrow()
            .iter()
            .find(|(a, _)| a.id == asset.id)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| RelsyncError::ApiStatus {
                status: 404,
                url: asset.browser_download_url.clone(),
                body: "Not Found".to_string(),
            })
    }

    fn upload_asset(&self, _release: &Release, path: &Path, name: &str) -> Result<RemoteAsset> {
        if self.fail_uploads.get() {
            return Err(RelsyncError::ApiStatus {
                status: 403,
                url: name.to_string(),
                body: "Resource not accessible by integration".to_string(),
            });
        }
        if self.assets.borrow().iter().any(|(a, _)| a.name == name) {
            return Err(RelsyncError::ApiStatus {
                status: 422,
                url: name.to_string(),
                body: "already_exists".to_string(),
            });
        }
        let bytes = std::fs::read(path)?;
        let asset = self.new_asset(name, bytes.len());
        self.assets.borrow_mut().push((asset.clone(), bytes));
        self.uploads.borrow_mut().push(name.to_string());
        Ok(asset)
    }

    fn delete_asset(&self, asset: &RemoteAsset) -> Result<()> {
        let mut assets = self.assets.borrow_mut();
        let before = assets.len();
        assets.retain(|(a, _)| a.id != asset.id);
        if assets.len() == before {
            return Err(RelsyncError::ApiStatus {
                status: 404,
                url: asset.name.clone(),
                body: "Not Found".to_string(),
            });
        }
        self.deletes.borrow_mut().push(asset.name.clone());
        Ok(())
    }
}
