// relsync-common/src/model/release.rs
use serde::{Deserialize, Serialize};

/// A tagged release on the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Upload endpoint, possibly carrying a `{?name,label}` URI template suffix.
    #[serde(default)]
    pub upload_url: String,
}

impl Release {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.tag_name)
    }
}

/// One object attached to a release, keyed by its published file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAsset {
    pub id: u64,
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
}
