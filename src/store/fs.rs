//! Directory-backed store: `<root>/chunks/<key>.json` and `<root>/metadata.json`.

use std::fs;
use std::path::{Path, PathBuf};

use super::{CatalogMetadata, StampedMetadata, StoreError, StoreWriter};
use crate::manifest::now_epoch_ms;

/// Writes one JSON file per document under a root directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Store rooted at `root`; directories are created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File a chunk key is written to.
    pub fn chunk_path(&self, key: &str) -> PathBuf {
        self.root.join("chunks").join(format!("{key}.json"))
    }

    /// File the metadata document is written to.
    pub fn metadata_path(&self) -> PathBuf {
        self.root.join("metadata.json")
    }
}

fn write_file(path: &Path, body: &[u8]) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, body).map_err(io_err)
}

impl StoreWriter for FsStore {
    fn write_chunk(&mut self, key: &str, body: &[u8]) -> Result<(), StoreError> {
        write_file(&self.chunk_path(key), body)
    }

    fn write_metadata(&mut self, metadata: &CatalogMetadata) -> Result<(), StoreError> {
        let stamped = StampedMetadata {
            metadata,
            last_updated: now_epoch_ms(),
        };
        let body = serde_json::to_vec_pretty(&stamped).map_err(|source| StoreError::Serialize {
            key: "metadata".to_string(),
            source,
        })?;
        write_file(&self.metadata_path(), &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    #[test]
    fn writes_expected_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsStore::new(dir.path().join("catalog"));
        store.write_chunk("chunk_001", b"{\"items\":[]}").unwrap();
        store
            .write_metadata(&CatalogMetadata {
                total_items: 0,
                total_chunks: 1,
                languages: vec![Language::En],
                version: 3,
            })
            .unwrap();

        let chunk = fs::read(dir.path().join("catalog/chunks/chunk_001.json")).unwrap();
        assert_eq!(chunk, b"{\"items\":[]}");
        let raw = fs::read(dir.path().join("catalog/metadata.json")).unwrap();
        let metadata: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(metadata["totalChunks"], 1);
        assert_eq!(metadata["languages"], serde_json::json!(["EN"]));
        assert!(metadata["lastUpdated"].as_u64().unwrap() > 0);
    }

    #[test]
    fn unwritable_root_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let mut store = FsStore::new(&blocker);
        let err = store.write_chunk("chunk_001", b"{}").unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
