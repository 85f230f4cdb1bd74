// relsync-common/src/model/manifest.rs
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Suffix shared by every manifest file name (`{target}-manifest.json`).
pub const MANIFEST_SUFFIX: &str = "-manifest.json";

/// Top-level key holding the file table. Never usable as an extra key.
pub const FILES_KEY: &str = "files";

/// One published file: digest of the uncompressed artifact and the name of
/// the archive it is published under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub sha256: String,
    pub uri: String,
}

/// Value of a platform-supplied manifest extra (e.g. a toolchain version).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Text(String),
    Number(serde_json::Number),
}

impl From<&str> for ExtraValue {
    fn from(value: &str) -> Self {
        ExtraValue::Text(value.to_string())
    }
}

impl From<String> for ExtraValue {
    fn from(value: String) -> Self {
        ExtraValue::Text(value)
    }
}

impl From<u64> for ExtraValue {
    fn from(value: u64) -> Self {
        ExtraValue::Number(value.into())
    }
}

impl fmt::Display for ExtraValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

pub type ManifestExtras = BTreeMap<String, ExtraValue>;

/// The publish state of one target.
///
/// Equality is structural: two manifests are equal when their file tables and
/// extras hold the same values, whatever the key order or formatting of the
/// JSON they were parsed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    files: BTreeMap<String, FileEntry>,
    #[serde(flatten)]
    extras: ManifestExtras,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &BTreeMap<String, FileEntry> {
        &self.files
    }

    pub fn extras(&self) -> &ManifestExtras {
        &self.extras
    }

    /// Inserts or replaces the entry for `basename`.
    pub fn insert_file(&mut self, basename: impl Into<String>, entry: FileEntry) {
        self.files.insert(basename.into(), entry);
    }

    /// Returns `false` (and stores nothing) when `key` is reserved.
    pub fn insert_extra(&mut self, key: impl Into<String>, value: ExtraValue) -> bool {
        let key = key.into();
        if key == FILES_KEY {
            return false;
        }
        self.extras.insert(key, value);
        true
    }

    /// Finds the entry published under `uri`.
    pub fn entry_by_uri(&self, uri: &str) -> Option<&FileEntry> {
        self.files.values().find(|entry| entry.uri == uri)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn is_manifest_file_name(name: &str) -> bool {
    name.len() > MANIFEST_SUFFIX.len() && name.ends_with(MANIFEST_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(sha: &str, uri: &str) -> FileEntry {
        FileEntry {
            sha256: sha.to_string(),
            uri: uri.to_string(),
        }
    }

    #[test]
    fn test_equality_ignores_key_order_and_whitespace() {
        let a = Manifest::from_slice(
            br#"{"files":{"a.so":{"sha256":"aa","uri":"t-a.so.tar.gz"},"b":{"uri":"t-b.tar.gz","sha256":"bb"}},"cuda_version":"12.2"}"#,
        )
        .unwrap();
        let b = Manifest::from_slice(
            br#"{
                "cuda_version": "12.2",
                "files": {
                    "b":    { "sha256": "bb", "uri": "t-b.tar.gz" },
                    "a.so": { "sha256": "aa", "uri": "t-a.so.tar.gz" }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_extras_participate_in_equality() {
        let mut a = Manifest::new();
        a.insert_file("app", entry("aa", "t-app.tar.gz"));
        let mut b = a.clone();
        assert_eq!(a, b);

        b.insert_extra("cuda_version", "12.2".into());
        assert_ne!(a, b);

        a.insert_extra("cuda_version", "12.4".into());
        assert_ne!(a, b);
    }

    #[test]
    fn test_serialized_shape() {
        let mut manifest = Manifest::new();
        manifest.insert_file("app.bin", entry("aaa", "linux-x64-cpu-any-app.bin.tar.gz"));
        manifest.insert_extra("build_number", 7u64.into());

        let value: serde_json::Value =
            serde_json::from_str(&manifest.to_json_pretty().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "files": {
                    "app.bin": {"sha256": "aaa", "uri": "linux-x64-cpu-any-app.bin.tar.gz"}
                },
                "build_number": 7
            })
        );

        let reparsed = Manifest::from_slice(manifest.to_json_pretty().unwrap().as_bytes()).unwrap();
        assert_eq!(reparsed, manifest);
    }

    #[test]
    fn test_files_key_is_reserved() {
        let mut manifest = Manifest::new();
        assert!(!manifest.insert_extra(FILES_KEY, "oops".into()));
        assert!(manifest.extras().is_empty());
    }

    #[test]
    fn test_unsupported_extra_value_fails_to_parse() {
        let err = Manifest::from_slice(br#"{"files":{},"flags":["a","b"]}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_entry_by_uri() {
        let mut manifest = Manifest::new();
        manifest.insert_file("lib.so", entry("11", "linux-x64-cuda-any-lib.so.tar.gz"));
        assert_eq!(
            manifest
                .entry_by_uri("linux-x64-cuda-any-lib.so.tar.gz")
                .map(|e| e.sha256.as_str()),
            Some("11")
        );
        assert!(manifest.entry_by_uri("lib.so").is_none());
    }

    #[test]
    fn test_manifest_file_name() {
        assert!(is_manifest_file_name("linux-x64-cpu-any-manifest.json"));
        assert!(!is_manifest_file_name("-manifest.json"));
        assert!(!is_manifest_file_name("linux-x64-cpu-any-app.tar.gz"));
    }
}
