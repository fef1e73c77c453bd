//! Writes partitioned chunks and the catalog metadata to a store.

use serde::Serialize;
use tracing::{debug, info};

use crate::chunking::Chunk;
use crate::language::Language;
use crate::manifest::{now_epoch_ms, ManifestRecord};
use crate::store::{CatalogMetadata, StoreError, StoreWriter};

/// Store key of the `number`th chunk, counting from 1 (`chunk_001`).
pub fn chunk_key(number: usize) -> String {
    format!("chunk_{number:03}")
}

#[derive(Serialize)]
struct ChunkDocument<'a, T> {
    items: &'a [T],
}

/// Outcome of a successful publish.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReport {
    /// One record per chunk, in key order.
    pub records: Vec<ManifestRecord>,
    /// Metadata document that was written last.
    pub metadata: CatalogMetadata,
}

/// Publishes chunk documents followed by the metadata document.
#[derive(Debug, Clone)]
pub struct CatalogPublisher {
    languages: Vec<Language>,
    version: u32,
}

impl CatalogPublisher {
    /// `languages` and `version` are copied into the metadata document.
    pub fn new(languages: Vec<Language>, version: u32) -> Self {
        Self { languages, version }
    }

    /// Writes every chunk in order, then the metadata.
    ///
    /// Stops at the first failed write. The metadata is only written once all
    /// chunks are stored.
    pub fn publish<T, W>(&self, store: &mut W, chunks: &[Chunk<T>]) -> Result<PublishReport, StoreError>
    where
        T: Serialize,
        W: StoreWriter + ?Sized,
    {
        let mut records = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let key = chunk_key(index + 1);
            let body = serde_json::to_vec(&ChunkDocument {
                items: &chunk.items,
            })
            .map_err(|source| StoreError::Serialize {
                key: key.clone(),
                source,
            })?;
            store.write_chunk(&key, &body)?;
            info!(
                key = %key,
                chunk = index + 1,
                total = chunks.len(),
                items = chunk.items.len(),
                bytes = body.len(),
                "uploaded chunk"
            );
            records.push(ManifestRecord::new(key, chunk.items.len(), &body, now_epoch_ms()));
        }

        let metadata = CatalogMetadata {
            total_items: chunks.iter().map(|chunk| chunk.items.len()).sum(),
            total_chunks: chunks.len(),
            languages: self.languages.clone(),
            version: self.version,
        };
        store.write_metadata(&metadata)?;
        debug!(
            total_items = metadata.total_items,
            total_chunks = metadata.total_chunks,
            "wrote catalog metadata"
        );
        Ok(PublishReport { records, metadata })
    }
}
