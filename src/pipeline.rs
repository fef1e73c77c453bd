//! Phase orchestration: fetch, index, transform, partition, publish.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::info;

use crate::chunking::{partition, Chunk};
use crate::config::CatalogConfig;
use crate::language::Language;
use crate::publisher::{CatalogPublisher, PublishReport};
use crate::source::{fetch_all, FetchError, SourceFetcher, SourceItem};
use crate::store::{StoreError, StoreWriter};
use crate::transform::{MultilingualItem, Transformer};
use crate::translation::{build_indices, TranslationSource};

/// Fatal pipeline failure. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A source listing could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The base listing came back empty.
    #[error("base catalog is empty; refusing to publish")]
    EmptyCatalog,
    /// An item could not be serialized while sizing chunks.
    #[error("failed to serialize catalog items")]
    Serialize(#[from] serde_json::Error),
    /// A chunk or the metadata could not be stored.
    #[error(transparent)]
    Write(#[from] StoreError),
}

/// Everything computed before anything is written.
#[derive(Debug, Clone)]
pub struct CatalogPlan {
    /// Chunks in publish order.
    pub chunks: Vec<Chunk<MultilingualItem>>,
    /// Items across all chunks.
    pub total_items: usize,
    /// Items carrying at least one translated name.
    pub translated_items: usize,
    /// Size of each translation index.
    pub index_sizes: BTreeMap<Language, usize>,
}

impl CatalogPlan {
    /// Serialized byte size of each chunk.
    pub fn chunk_bytes(&self) -> Vec<usize> {
        self.chunks.iter().map(|chunk| chunk.bytes).collect()
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Items published.
    pub total_items: usize,
    /// Items carrying at least one translated name.
    pub translated_items: usize,
    /// Per-chunk records and the metadata written.
    pub report: PublishReport,
    /// Wall time of the whole run.
    pub elapsed: Duration,
}

/// Fetches, merges, and partitions the catalog without writing anything.
pub fn plan<F>(config: &CatalogConfig, fetcher: &F) -> Result<CatalogPlan, PipelineError>
where
    F: SourceFetcher + Sync + ?Sized,
{
    let started = Instant::now();
    let base = fetch_all(fetcher, None, config.page_size)?;
    if base.is_empty() {
        return Err(PipelineError::EmptyCatalog);
    }
    info!(
        cards = base.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "fetched base catalog"
    );

    let indices = build_indices(
        fetcher,
        &config.translated_languages,
        config.page_size,
        config.fetch_workers,
    )?;
    let index_sizes = indices
        .iter()
        .map(|(&lang, index)| (lang, index.len()))
        .collect();

    let items = transform_catalog(config, &indices, &base);
    drop(base);
    let total_items = items.len();
    let translated_items = items.iter().filter(|item| item.has_translations()).count();
    info!(
        cards = total_items,
        translated = translated_items,
        "merged translations"
    );

    let chunks = partition(items, config.max_chunk_bytes)?;
    info!(
        chunks = chunks.len(),
        max_chunk_bytes = config.max_chunk_bytes,
        largest_chunk_bytes = chunks.iter().map(|chunk| chunk.bytes).max().unwrap_or(0),
        "partitioned catalog"
    );

    Ok(CatalogPlan {
        chunks,
        total_items,
        translated_items,
        index_sizes,
    })
}

fn transform_catalog<T: TranslationSource>(
    config: &CatalogConfig,
    sources: &BTreeMap<Language, T>,
    base: &[SourceItem],
) -> Vec<MultilingualItem> {
    Transformer::new(
        &config.translated_languages,
        &config.supported_languages,
        sources,
    )
    .transform_all(base)
}

/// Plans the catalog and publishes it to `store`.
pub fn run<F, W>(config: &CatalogConfig, fetcher: &F, store: &mut W) -> Result<RunSummary, PipelineError>
where
    F: SourceFetcher + Sync + ?Sized,
    W: StoreWriter + ?Sized,
{
    let started = Instant::now();
    let plan = plan(config, fetcher)?;
    let publisher = CatalogPublisher::new(
        config.supported_languages.clone(),
        config.catalog_version,
    );
    let report = publisher.publish(store, &plan.chunks)?;
    let elapsed = started.elapsed();
    info!(
        cards = plan.total_items,
        chunks = report.records.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "catalog published"
    );
    Ok(RunSummary {
        total_items: plan.total_items,
        translated_items: plan.translated_items,
        report,
        elapsed,
    })
}
