//! Offline source backed by saved card-info listings.
//!
//! A snapshot directory holds one envelope per language: `cardinfo.json` for
//! the base listing and `cardinfo.<tag>.json` (e.g. `cardinfo.it.json`) for
//! each translation. Files are loaded lazily and paged in memory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::{FetchError, SourceEnvelope, SourceFetcher, SourceItem, SourceMeta, SourcePage};
use crate::language::Language;

/// Serves pages out of a snapshot directory.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    root: PathBuf,
    loaded: Arc<Mutex<HashMap<Language, Arc<Vec<SourceItem>>>>>,
}

impl SnapshotSource {
    /// Creates a source reading from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            loaded: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Snapshot file holding the listing for `language`.
    pub fn file_for(root: &Path, language: Option<Language>) -> PathBuf {
        match language.filter(|lang| !lang.is_base()) {
            Some(lang) => root.join(format!("cardinfo.{}.json", lang.query_tag())),
            None => root.join("cardinfo.json"),
        }
    }

    /// Writes `items` as a snapshot file for `language`, replacing any previous one.
    pub fn write(
        root: &Path,
        language: Option<Language>,
        items: Vec<SourceItem>,
    ) -> Result<PathBuf, FetchError> {
        let path = Self::file_for(root, language);
        let envelope = SourceEnvelope {
            meta: Some(SourceMeta {
                total_rows: Some(items.len() as u64),
            }),
            data: items,
        };
        let body = serde_json::to_vec(&envelope).map_err(|source| FetchError::SnapshotFormat {
            path: path.clone(),
            source,
        })?;
        fs::create_dir_all(root)
            .and_then(|_| fs::write(&path, body))
            .map_err(|source| FetchError::SnapshotIo {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    fn listing(&self, language: Option<Language>) -> Result<Arc<Vec<SourceItem>>, FetchError> {
        let key = language.unwrap_or(Language::BASE);
        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(items) = loaded.get(&key) {
            return Ok(Arc::clone(items));
        }
        let path = Self::file_for(&self.root, language);
        let raw = fs::read(&path).map_err(|source| FetchError::SnapshotIo {
            path: path.clone(),
            source,
        })?;
        let envelope: SourceEnvelope =
            serde_json::from_slice(&raw).map_err(|source| FetchError::SnapshotFormat {
                path: path.clone(),
                source,
            })?;
        let items = Arc::new(envelope.data);
        loaded.insert(key, Arc::clone(&items));
        Ok(items)
    }
}

impl SourceFetcher for SnapshotSource {
    fn fetch_page(
        &self,
        language: Option<Language>,
        offset: usize,
        page_size: usize,
    ) -> Result<SourcePage, FetchError> {
        let items = self.listing(language)?;
        let end = offset.saturating_add(page_size).min(items.len());
        let page = items.get(offset..end).unwrap_or_default().to_vec();
        Ok(SourcePage {
            items: page,
            total_rows: Some(items.len() as u64),
        })
    }
}
