// relsync-io/src/json_io.rs
use std::path::Path;

use relsync_common::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Writes serializable data to a JSON file (pretty-printed, 4-space indent), atomically.
pub fn write_json_pretty<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    debug!("Writing JSON to: {}", path.display());
    let mut json_bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut json_bytes, formatter);
    data.serialize(&mut serializer)?;
    json_bytes.push(b'\n');
    crate::fs::atomic_write_file(path, &json_bytes)
}

/// Reads and deserializes data from a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Reading JSON from: {}", path.display());
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let mut data = BTreeMap::new();
        data.insert("cuda_version".to_string(), "12.2".to_string());

        write_json_pretty(&path, &data).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("    \"cuda_version\": \"12.2\""));

        let back: BTreeMap<String, String> = read_json(&path).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_read_invalid_json_is_json_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = read_json::<BTreeMap<String, String>>(&path).unwrap_err();
        assert!(matches!(err, relsync_common::RelsyncError::Json(_)));
    }
}
