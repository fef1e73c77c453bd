//! PostgreSQL JSONB document store.
//!
//! Documents live in a single table keyed by `(collection, key)`. Chunks use
//! the `chunks` collection; the catalog metadata is `metadata/catalog`, with
//! `lastUpdated` stamped from the server clock. The async client is driven by
//! a private current-thread runtime so callers stay blocking.

use anyhow::{Context, Result};
use tokio::runtime::{Builder, Runtime};
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error};

use super::{CatalogMetadata, StoreError, StoreWriter};

/// Collection holding chunk documents.
pub const CHUNK_COLLECTION: &str = "chunks";
/// Collection holding the metadata document.
pub const METADATA_COLLECTION: &str = "metadata";
/// Key of the metadata document.
pub const METADATA_KEY: &str = "catalog";

/// Longest identifier Postgres keeps without truncating it.
const MAX_IDENT_BYTES: usize = 63;

/// Schema and table the catalog documents are upserted into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTable {
    schema: String,
    table: String,
}

impl DocumentTable {
    /// Validates both identifiers; they are quoted verbatim, never case-folded.
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Result<Self> {
        let schema = schema.into();
        let table = table.into();
        check_ident("document schema", &schema)?;
        check_ident("document table", &table)?;
        Ok(Self { schema, table })
    }

    /// `"schema"."table"`, ready to splice into a statement.
    pub fn sql_name(&self) -> String {
        format!("{}.{}", quoted(&self.schema), quoted(&self.table))
    }
}

impl std::fmt::Display for DocumentTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

fn check_ident(what: &str, name: &str) -> Result<()> {
    anyhow::ensure!(!name.trim().is_empty(), "{what} name must not be blank");
    anyhow::ensure!(!name.contains('\0'), "{what} name {name:?} contains a NUL byte");
    anyhow::ensure!(
        name.len() <= MAX_IDENT_BYTES,
        "{what} name {name:?} is longer than {MAX_IDENT_BYTES} bytes and would be truncated"
    );
    Ok(())
}

fn quoted(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Store writing documents into a Postgres table.
pub struct PgDocumentStore {
    runtime: Runtime,
    client: Client,
    table: DocumentTable,
}

impl PgDocumentStore {
    /// Connects to `database_url` and creates the document table if missing.
    pub fn connect(database_url: &str, table: DocumentTable) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(StoreError::Runtime)?;
        let (client, connection) = runtime
            .block_on(tokio_postgres::connect(database_url, NoTls))
            .context("failed to connect to Postgres")?;
        runtime.spawn(async move {
            if let Err(err) = connection.await {
                error!(error = %err, "postgres connection error");
            }
        });

        let store = Self {
            runtime,
            client,
            table,
        };
        store.ensure_table()?;
        Ok(store)
    }

    /// Target table.
    pub fn table(&self) -> &DocumentTable {
        &self.table
    }

    fn ensure_table(&self) -> Result<()> {
        let ddl = create_table_sql(&self.table);
        self.runtime
            .block_on(self.client.execute(&ddl, &[]))
            .with_context(|| format!("failed to create document table {}", self.table))?;
        debug!(table = %self.table, "document table ready");
        Ok(())
    }

    fn upsert(&self, sql: &str, collection: &str, key: &str, body: &str) -> Result<(), StoreError> {
        self.runtime
            .block_on(self.client.execute(sql, &[&collection, &key, &body]))
            .map(|_| ())
            .map_err(|source| StoreError::Postgres {
                key: format!("{collection}/{key}"),
                source,
            })
    }
}

impl StoreWriter for PgDocumentStore {
    fn write_chunk(&mut self, key: &str, body: &[u8]) -> Result<(), StoreError> {
        let body = String::from_utf8_lossy(body);
        self.upsert(&upsert_sql(&self.table), CHUNK_COLLECTION, key, &body)
    }

    fn write_metadata(&mut self, metadata: &CatalogMetadata) -> Result<(), StoreError> {
        let body = serde_json::to_string(metadata).map_err(|source| StoreError::Serialize {
            key: METADATA_KEY.to_string(),
            source,
        })?;
        self.upsert(
            &upsert_metadata_sql(&self.table),
            METADATA_COLLECTION,
            METADATA_KEY,
            &body,
        )
    }
}

fn create_table_sql(table: &DocumentTable) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
            collection TEXT NOT NULL,
            key TEXT NOT NULL,
            body JSONB NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            PRIMARY KEY (collection, key)
        )",
        table.sql_name()
    )
}

const ON_CONFLICT: &str = " ON CONFLICT (collection, key) DO UPDATE SET \
    body = EXCLUDED.body, \
    updated_at = EXCLUDED.updated_at";

fn upsert_sql(table: &DocumentTable) -> String {
    format!(
        "INSERT INTO {} (collection, key, body, updated_at) \
            VALUES ($1, $2, $3::text::jsonb, now()){ON_CONFLICT}",
        table.sql_name()
    )
}

fn upsert_metadata_sql(table: &DocumentTable) -> String {
    format!(
        "INSERT INTO {} (collection, key, body, updated_at) \
            VALUES ($1, $2, $3::text::jsonb || jsonb_build_object('lastUpdated', \
            (extract(epoch from now()) * 1000)::bigint), now()){ON_CONFLICT}",
        table.sql_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_table_identifiers() {
        let table = DocumentTable::new("catalog", "docs\"v2").unwrap();
        assert_eq!(table.sql_name(), "\"catalog\".\"docs\"\"v2\"");
        assert_eq!(table.to_string(), "catalog.docs\"v2");
        let mixed = DocumentTable::new("Public", "Cards").unwrap();
        assert_eq!(mixed.sql_name(), "\"Public\".\"Cards\"");
    }

    #[test]
    fn rejects_unusable_identifiers() {
        let blank = DocumentTable::new(" ", "docs").unwrap_err();
        assert_eq!(blank.to_string(), "document schema name must not be blank");
        assert!(DocumentTable::new("public", "").is_err());
        assert!(DocumentTable::new("public", "docs\0").is_err());
        let long = "c".repeat(MAX_IDENT_BYTES + 1);
        let err = DocumentTable::new("public", long).unwrap_err();
        assert!(err.to_string().contains("would be truncated"));
        assert!(DocumentTable::new("public", "c".repeat(MAX_IDENT_BYTES)).is_ok());
    }

    #[test]
    fn upserts_overwrite_by_collection_and_key() {
        let table = DocumentTable::new("public", "catalog_documents").unwrap();
        let chunk = upsert_sql(&table);
        assert!(chunk.starts_with("INSERT INTO \"public\".\"catalog_documents\""));
        assert!(chunk.contains("ON CONFLICT (collection, key) DO UPDATE SET body = EXCLUDED.body"));
        let metadata = upsert_metadata_sql(&table);
        assert!(metadata.contains("jsonb_build_object('lastUpdated'"));
        assert!(create_table_sql(&table).contains("PRIMARY KEY (collection, key)"));
    }
}
