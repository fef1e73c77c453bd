//! Keyed document stores the catalog is published into.

pub mod fs;
pub mod postgres;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::language::Language;

pub use fs::FsStore;
pub use postgres::{PgDocumentStore, DocumentTable};

/// Catalog-level document written once every chunk is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMetadata {
    /// Number of items across all chunks.
    pub total_items: usize,
    /// Number of chunk documents; readers fetch `chunk_001..=chunk_{total}`.
    pub total_chunks: usize,
    /// Languages the catalog carries prices for.
    pub languages: Vec<Language>,
    /// Document layout version.
    pub version: u32,
}

/// Metadata plus the time it was written, as stored by local writers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StampedMetadata<'a> {
    #[serde(flatten)]
    pub(crate) metadata: &'a CatalogMetadata,
    pub(crate) last_updated: u64,
}

/// Failure to persist a document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("failed to write {path}")]
    Io {
        /// File being written.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Database failure.
    #[error("postgres write of {key} failed")]
    Postgres {
        /// Document key being written.
        key: String,
        /// Underlying error.
        #[source]
        source: tokio_postgres::Error,
    },
    /// Document could not be encoded.
    #[error("failed to encode {key}")]
    Serialize {
        /// Document key being encoded.
        key: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The async runtime backing the store could not be started.
    #[error("failed to start store runtime")]
    Runtime(#[source] std::io::Error),
}

/// Full-overwrite writer for chunk and metadata documents.
pub trait StoreWriter {
    /// Stores `body` (a serialized chunk document) under `key`, replacing any previous value.
    fn write_chunk(&mut self, key: &str, body: &[u8]) -> Result<(), StoreError>;

    /// Stores the catalog metadata, stamping its write time.
    fn write_metadata(&mut self, metadata: &CatalogMetadata) -> Result<(), StoreError>;
}

impl<W: StoreWriter + ?Sized> StoreWriter for &mut W {
    fn write_chunk(&mut self, key: &str, body: &[u8]) -> Result<(), StoreError> {
        (**self).write_chunk(key, body)
    }

    fn write_metadata(&mut self, metadata: &CatalogMetadata) -> Result<(), StoreError> {
        (**self).write_metadata(metadata)
    }
}

impl<W: StoreWriter + ?Sized> StoreWriter for Box<W> {
    fn write_chunk(&mut self, key: &str, body: &[u8]) -> Result<(), StoreError> {
        (**self).write_chunk(key, body)
    }

    fn write_metadata(&mut self, metadata: &CatalogMetadata) -> Result<(), StoreError> {
        (**self).write_metadata(metadata)
    }
}

/// In-memory store used for dry runs and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    /// Chunk bodies by key.
    pub chunks: BTreeMap<String, Vec<u8>>,
    /// Last metadata written, with its timestamp.
    pub metadata: Option<(CatalogMetadata, u64)>,
    /// Keys in write order, metadata included as `"metadata"`.
    pub writes: Vec<String>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the chunk stored under `key`.
    pub fn chunk_json(&self, key: &str) -> Option<serde_json::Value> {
        self.chunks
            .get(key)
            .and_then(|body| serde_json::from_slice(body).ok())
    }
}

impl StoreWriter for MemoryStore {
    fn write_chunk(&mut self, key: &str, body: &[u8]) -> Result<(), StoreError> {
        self.chunks.insert(key.to_string(), body.to_vec());
        self.writes.push(key.to_string());
        Ok(())
    }

    fn write_metadata(&mut self, metadata: &CatalogMetadata) -> Result<(), StoreError> {
        self.metadata = Some((metadata.clone(), crate::manifest::now_epoch_ms()));
        self.writes.push("metadata".to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_uses_camel_case_keys() {
        let metadata = CatalogMetadata {
            total_items: 12,
            total_chunks: 2,
            languages: Language::ALL.to_vec(),
            version: 3,
        };
        let stamped = StampedMetadata {
            metadata: &metadata,
            last_updated: 1_700_000_000_000,
        };
        assert_eq!(
            serde_json::to_value(&stamped).unwrap(),
            json!({
                "totalItems": 12,
                "totalChunks": 2,
                "languages": ["EN", "IT", "FR", "DE", "PT"],
                "version": 3,
                "lastUpdated": 1_700_000_000_000u64
            })
        );
    }

    #[test]
    fn memory_store_overwrites_keys() {
        let mut store = MemoryStore::new();
        store.write_chunk("chunk_001", b"{\"items\":[1]}").unwrap();
        store.write_chunk("chunk_001", b"{\"items\":[2]}").unwrap();
        assert_eq!(store.chunks.len(), 1);
        assert_eq!(store.chunk_json("chunk_001"), Some(json!({"items": [2]})));
        assert_eq!(store.writes, vec!["chunk_001", "chunk_001"]);
    }
}
