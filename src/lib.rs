#![warn(missing_docs)]
//! Core library entry points for the multilingual card catalog publisher.
//!
//! The pipeline fetches the base card listing plus one listing per translated
//! language, merges them into flat multilingual records with localized set
//! codes and rarities, splits the records into size-bounded chunks, and
//! publishes the chunks followed by a metadata document.

pub mod chunking;
pub mod config;
pub mod language;
pub mod logging;
pub mod manifest;
pub mod pipeline;
pub mod publisher;
pub mod rarity;
pub mod set_code;
pub mod source;
pub mod store;
pub mod transform;
pub mod translation;

pub use chunking::{partition, Chunk};
pub use config::{
    CatalogArgs, CatalogConfig, ConfigError, HttpArgs, SourceArgs, StoreArgs, StoreKind,
};
pub use language::Language;
pub use manifest::ManifestRecord;
pub use pipeline::{plan, run, CatalogPlan, PipelineError, RunSummary};
pub use publisher::{chunk_key, CatalogPublisher, PublishReport};
pub use rarity::{localize_rarity, rarity_code};
pub use set_code::{localize_set_code, SetCodeLocalizer};
pub use source::http::HttpSource;
pub use source::snapshot::SnapshotSource;
pub use source::{fetch_all, FetchError, SourceFetcher, SourceItem, SourcePage};
pub use store::{CatalogMetadata, FsStore, MemoryStore, PgDocumentStore, StoreError, StoreWriter};
pub use transform::{MultilingualItem, Transformer};
pub use translation::{build_indices, LocalizedText, TranslationIndex, TranslationSource};
