//! Greedy partitioning of the catalog into size-bounded chunks.

use std::io;

use serde::Serialize;

/// A run of consecutive items and the serialized size they account for.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk<T> {
    /// Items in input order.
    pub items: Vec<T>,
    /// Sum of each item's serialized length.
    pub bytes: usize,
}

impl<T> Chunk<T> {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            bytes: 0,
        }
    }
}

/// Splits `items` into consecutive chunks whose summed serialized size stays
/// within `max_bytes`.
///
/// A chunk is closed as soon as the next item would push it over the budget.
/// An item larger than the budget on its own still gets a chunk to itself.
/// Concatenating the chunks yields the input sequence unchanged.
pub fn partition<T: Serialize>(
    items: Vec<T>,
    max_bytes: usize,
) -> Result<Vec<Chunk<T>>, serde_json::Error> {
    let mut chunks = Vec::new();
    let mut current = Chunk::empty();
    for item in items {
        let size = serialized_len(&item)?;
        if !current.items.is_empty() && current.bytes + size > max_bytes {
            chunks.push(std::mem::replace(&mut current, Chunk::empty()));
        }
        current.bytes += size;
        current.items.push(item);
    }
    if !current.items.is_empty() {
        chunks.push(current);
    }
    Ok(chunks)
}

/// Length of `value` as compact JSON, without buffering the output.
pub fn serialized_len<T: Serialize + ?Sized>(value: &T) -> Result<usize, serde_json::Error> {
    let mut counter = ByteCounter(0);
    serde_json::to_writer(&mut counter, value)?;
    Ok(counter.0)
}

struct ByteCounter(usize);

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Serialize, Clone, Debug, PartialEq)]
    struct Blob {
        id: usize,
        body: String,
    }

    fn blobs(count: usize, width: usize) -> Vec<Blob> {
        (0..count)
            .map(|id| Blob {
                id,
                body: "x".repeat(width),
            })
            .collect()
    }

    #[test]
    fn counts_compact_json_bytes() {
        let blob = Blob {
            id: 7,
            body: "ab".into(),
        };
        assert_eq!(
            serialized_len(&blob).unwrap(),
            serde_json::to_vec(&blob).unwrap().len()
        );
    }

    #[test]
    fn keeps_order_and_respects_budget() {
        let items = blobs(40, 100);
        let budget = 1_000;
        let chunks = partition(items.clone(), budget).unwrap();
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.bytes <= budget);
            assert!(!chunk.items.is_empty());
        }
        let flattened: Vec<Blob> = chunks.into_iter().flat_map(|chunk| chunk.items).collect();
        assert_eq!(flattened, items);
    }

    #[test]
    fn closes_chunk_only_when_next_item_overflows() {
        let items = blobs(5, 10);
        let size = serialized_len(&items[0]).unwrap();
        let chunks = partition(items, size * 2).unwrap();
        let sizes: Vec<usize> = chunks.iter().map(|chunk| chunk.items.len()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn oversized_item_gets_its_own_chunk() {
        let mut items = blobs(2, 10);
        items.insert(1, Blob {
            id: 99,
            body: "y".repeat(500),
        });
        let chunks = partition(items, 100).unwrap();
        let ids: Vec<Vec<usize>> = chunks
            .iter()
            .map(|chunk| chunk.items.iter().map(|blob| blob.id).collect())
            .collect();
        assert_eq!(ids, vec![vec![0], vec![99], vec![1]]);
        assert!(chunks[1].bytes > 100);
    }

    #[test]
    fn catalog_sized_input_splits_in_two() {
        // ~2000 bytes per item, 500 items, default budget.
        let items = blobs(500, 1_980);
        let chunks = partition(items, 900_000).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].items.len() + chunks[1].items.len(), 500);
        assert!(chunks[0].bytes <= 900_000);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunks = partition(Vec::<Blob>::new(), 10).unwrap();
        assert!(chunks.is_empty());
    }
}
