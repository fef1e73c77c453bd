//! Per-chunk publish records, appended to a JSONL manifest after each run.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crc32fast::Hasher as Crc32;
use serde::{Deserialize, Serialize};

/// Digest entry describing one published chunk document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
    /// Store key the chunk was written under.
    pub key: String,
    /// Number of items in the chunk.
    pub items: usize,
    /// Size of the document body in bytes.
    pub bytes: usize,
    /// Body checksum (CRC32).
    pub checksum: u32,
    /// Epoch milliseconds when the chunk was written.
    pub published_epoch_ms: u64,
}

impl ManifestRecord {
    /// Creates a record for `body` as it was handed to the store.
    pub fn new(key: impl Into<String>, items: usize, body: &[u8], published_epoch_ms: u64) -> Self {
        Self {
            key: key.into(),
            items,
            bytes: body.len(),
            checksum: checksum(body),
            published_epoch_ms,
        }
    }
}

/// CRC32 of a document body.
pub fn checksum(body: &[u8]) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(body);
    hasher.finalize()
}

/// Milliseconds since the Unix epoch on the local clock.
pub fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|dur| dur.as_millis() as u64)
        .unwrap_or(0)
}

/// Appends `records` to the JSONL manifest at `path`, creating it when missing.
pub fn append_records(path: &Path, records: &[ManifestRecord]) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_captures_size_and_checksum() {
        let record = ManifestRecord::new("chunk_001", 2, b"{\"items\":[]}", 42);
        assert_eq!(record.bytes, 12);
        assert_eq!(record.checksum, checksum(b"{\"items\":[]}"));
        assert_ne!(record.checksum, checksum(b"{\"items\":[1]}"));
    }

    #[test]
    fn appends_jsonl_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.jsonl");
        let first = ManifestRecord::new("chunk_001", 1, b"a", 1);
        let second = ManifestRecord::new("chunk_002", 1, b"b", 2);
        append_records(&path, &[first.clone()]).unwrap();
        append_records(&path, &[second.clone()]).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<ManifestRecord> = raw
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(parsed, vec![first, second]);
    }
}
