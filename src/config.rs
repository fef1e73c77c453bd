//! Run configuration and the command-line arguments that build it.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::info;

use crate::language::{dedup_languages, Language};
use crate::source::http::{HttpSource, DEFAULT_API_URL};
use crate::source::snapshot::SnapshotSource;
use crate::source::SourceFetcher;
use crate::store::{DocumentTable, FsStore, MemoryStore, PgDocumentStore, StoreWriter};

/// Items requested per source page.
pub const DEFAULT_PAGE_SIZE: usize = 500;
/// Byte budget per chunk document, below the store's per-document limit.
pub const DEFAULT_MAX_CHUNK_BYTES: usize = 900_000;
/// Layout version written into the catalog metadata.
pub const DEFAULT_CATALOG_VERSION: u32 = 3;

/// Parameters fixed for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Items requested per source page.
    pub page_size: usize,
    /// Byte budget per chunk.
    pub max_chunk_bytes: usize,
    /// Languages whose names, texts, and print fields are localized.
    pub translated_languages: Vec<Language>,
    /// Languages the price maps and metadata are keyed by.
    pub supported_languages: Vec<Language>,
    /// Metadata layout version.
    pub catalog_version: u32,
    /// Parallel translation fetches; 1 fetches languages one by one.
    pub fetch_workers: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_chunk_bytes: DEFAULT_MAX_CHUNK_BYTES,
            translated_languages: vec![Language::It, Language::Fr, Language::De, Language::Pt],
            supported_languages: Language::ALL.to_vec(),
            catalog_version: DEFAULT_CATALOG_VERSION,
            fetch_workers: 1,
        }
    }
}

/// Rejected configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The base language was listed as a translation target.
    #[error("{0} is the base language and cannot be a translated language")]
    BaseLanguageTranslated(Language),
    /// No supported languages were given.
    #[error("at least one supported language is required")]
    NoSupportedLanguages,
}

impl CatalogConfig {
    /// Normalizes and checks the configuration.
    ///
    /// Zero sizes are raised to 1 and duplicate languages dropped (first
    /// occurrence wins).
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.page_size = self.page_size.max(1);
        self.max_chunk_bytes = self.max_chunk_bytes.max(1);
        self.fetch_workers = self.fetch_workers.max(1);
        self.translated_languages = dedup_languages(&self.translated_languages);
        self.supported_languages = dedup_languages(&self.supported_languages);
        if let Some(&base) = self.translated_languages.iter().find(|lang| lang.is_base()) {
            return Err(ConfigError::BaseLanguageTranslated(base));
        }
        if self.supported_languages.is_empty() {
            return Err(ConfigError::NoSupportedLanguages);
        }
        Ok(self)
    }
}

/// Catalog shape options shared by the binaries.
#[derive(Args, Debug, Clone)]
pub struct CatalogArgs {
    /// Items requested per source page
    #[arg(long, env = "YGOCATALOG_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Maximum serialized bytes per chunk document
    #[arg(long, env = "YGOCATALOG_MAX_CHUNK_BYTES", default_value_t = DEFAULT_MAX_CHUNK_BYTES)]
    pub max_chunk_bytes: usize,

    /// Languages to merge translations for, comma separated
    #[arg(
        long,
        env = "YGOCATALOG_TRANSLATED",
        value_enum,
        value_delimiter = ',',
        ignore_case = true,
        default_value = "it,fr,de,pt"
    )]
    pub translated: Vec<Language>,

    /// Languages the catalog advertises prices for, comma separated
    #[arg(
        long,
        env = "YGOCATALOG_SUPPORTED",
        value_enum,
        value_delimiter = ',',
        ignore_case = true,
        default_value = "en,it,fr,de,pt"
    )]
    pub supported: Vec<Language>,

    /// Version number written into the metadata document
    #[arg(long, env = "YGOCATALOG_VERSION", default_value_t = DEFAULT_CATALOG_VERSION)]
    pub catalog_version: u32,

    /// Translation languages fetched in parallel
    #[arg(long, env = "YGOCATALOG_FETCH_WORKERS", default_value_t = 1)]
    pub fetch_workers: usize,
}

impl CatalogArgs {
    /// Converts the parsed arguments into a validated [`CatalogConfig`].
    pub fn build_config(&self) -> Result<CatalogConfig, ConfigError> {
        CatalogConfig {
            page_size: self.page_size,
            max_chunk_bytes: self.max_chunk_bytes,
            translated_languages: self.translated.clone(),
            supported_languages: self.supported.clone(),
            catalog_version: self.catalog_version,
            fetch_workers: self.fetch_workers,
        }
        .validated()
    }
}

/// Card-info API connection flags, shared by every binary that talks to it.
#[derive(Args, Debug, Clone)]
pub struct HttpArgs {
    /// Card-info endpoint
    #[arg(long, env = "YGOCATALOG_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "YGOCATALOG_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,
}

impl HttpArgs {
    /// Request timeout, never below one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// HTTP fetcher for `--api-url`.
    pub fn build_source(&self) -> Result<HttpSource> {
        HttpSource::new(&self.api_url, self.timeout())
    }
}

/// Where card listings come from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// API connection settings.
    #[command(flatten)]
    pub http: HttpArgs,

    /// Read listings from a snapshot directory instead of the API
    #[arg(long, env = "YGOCATALOG_SNAPSHOT_DIR")]
    pub snapshot_dir: Option<PathBuf>,
}

/// Fetcher the binaries hand to the pipeline.
pub type BoxedFetcher = Box<dyn SourceFetcher + Send + Sync>;

impl SourceArgs {
    /// Builds the snapshot fetcher when a directory was given, the HTTP one otherwise.
    pub fn build_fetcher(&self) -> Result<BoxedFetcher> {
        if let Some(dir) = &self.snapshot_dir {
            info!(dir = %dir.display(), "reading card listings from snapshot");
            return Ok(Box::new(SnapshotSource::new(dir)));
        }
        let http = self.http.build_source()?;
        info!(endpoint = %http.endpoint(), "reading card listings over HTTP");
        Ok(Box::new(http))
    }
}

/// Store backends selectable from the command line.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum StoreKind {
    /// One JSON file per document under `--output-dir`.
    Fs,
    /// JSONB rows in a Postgres table.
    Postgres,
    /// Discard documents once written; useful for smoke runs.
    Memory,
}

/// Where the catalog is published.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Store backend
    #[arg(long, env = "YGOCATALOG_STORE", value_enum, default_value = "fs")]
    pub store: StoreKind,

    /// Output directory for the filesystem store
    #[arg(long, env = "YGOCATALOG_OUTPUT_DIR", default_value = "catalog")]
    pub output_dir: PathBuf,

    /// Postgres connection string (postgres://...)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Schema of the document table
    #[arg(long, env = "YGOCATALOG_PG_SCHEMA", default_value = "public")]
    pub pg_schema: String,

    /// Document table name inside the schema
    #[arg(long, env = "YGOCATALOG_PG_TABLE", default_value = "catalog_documents")]
    pub pg_table: String,
}

impl StoreArgs {
    /// Opens the selected store.
    pub fn open(&self) -> Result<Box<dyn StoreWriter>> {
        match self.store {
            StoreKind::Fs => Ok(Box::new(FsStore::new(&self.output_dir))),
            StoreKind::Memory => Ok(Box::new(MemoryStore::new())),
            StoreKind::Postgres => {
                let url = self
                    .database_url
                    .as_deref()
                    .context("--database-url (or DATABASE_URL) is required for the postgres store")?;
                let table = DocumentTable::new(&self.pg_schema, &self.pg_table)?;
                let store = PgDocumentStore::connect(url, table)?;
                Ok(Box::new(store))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        source: SourceArgs,
    }

    #[test]
    fn defaults_match_catalog_defaults() {
        let cli = TestCli::try_parse_from(["test"]).unwrap();
        assert_eq!(cli.catalog.build_config().unwrap(), CatalogConfig::default());
        assert_eq!(cli.store.store, StoreKind::Fs);
    }

    #[test]
    fn parses_language_lists() {
        let cli = TestCli::try_parse_from([
            "test",
            "--translated",
            "DE,it,de",
            "--supported",
            "en,de",
            "--page-size",
            "0",
        ])
        .unwrap();
        let config = cli.catalog.build_config().unwrap();
        assert_eq!(config.translated_languages, vec![Language::De, Language::It]);
        assert_eq!(config.supported_languages, vec![Language::En, Language::De]);
        assert_eq!(config.page_size, 1);
    }

    #[test]
    fn rejects_base_language_as_translation() {
        let config = CatalogConfig {
            translated_languages: vec![Language::It, Language::En],
            ..CatalogConfig::default()
        };
        assert_eq!(
            config.validated(),
            Err(ConfigError::BaseLanguageTranslated(Language::En))
        );
    }

    #[test]
    fn rejects_empty_supported_set() {
        let config = CatalogConfig {
            supported_languages: Vec::new(),
            ..CatalogConfig::default()
        };
        assert_eq!(config.validated(), Err(ConfigError::NoSupportedLanguages));
    }

    #[test]
    fn postgres_store_requires_a_url() {
        let cli = TestCli::try_parse_from(["test", "--store", "postgres"]).unwrap();
        if std::env::var_os("DATABASE_URL").is_none() {
            assert!(cli.store.open().is_err());
        }
    }

    #[test]
    fn source_flags_carry_http_settings() {
        let cli = TestCli::try_parse_from([
            "test",
            "--api-url",
            "http://127.0.0.1:9/cardinfo.php",
            "--timeout-secs",
            "0",
        ])
        .unwrap();
        assert_eq!(cli.source.http.api_url, "http://127.0.0.1:9/cardinfo.php");
        assert_eq!(cli.source.http.timeout(), Duration::from_secs(1));
        let source = cli.source.http.build_source().unwrap();
        assert_eq!(source.endpoint().as_str(), "http://127.0.0.1:9/cardinfo.php");
    }
}
