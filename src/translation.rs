//! Per-language translation indices built from the translated listings.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::language::Language;
use crate::source::{fetch_all, FetchError, LanguageLabel, SourceFetcher, SourceItem};

/// Translated name and text of one card. Missing source text is stored as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedText {
    /// Translated card name.
    pub name: String,
    /// Translated card text.
    pub description: String,
}

/// Lookup of translated text by card id.
pub trait TranslationSource {
    /// Returns the translation for `id`, if the language listing contained it.
    fn lookup(&self, id: u64) -> Option<&LocalizedText>;
}

impl TranslationSource for HashMap<u64, LocalizedText> {
    fn lookup(&self, id: u64) -> Option<&LocalizedText> {
        self.get(&id)
    }
}

/// Read-only id -> translation map for one non-base language.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationIndex {
    language: Language,
    entries: HashMap<u64, LocalizedText>,
}

impl TranslationIndex {
    /// Builds an index out of a translated listing.
    pub fn from_items(language: Language, items: Vec<SourceItem>) -> Self {
        let entries = items
            .into_iter()
            .map(|item| {
                let text = LocalizedText {
                    name: item.name.unwrap_or_default(),
                    description: item.desc.unwrap_or_default(),
                };
                (item.id, text)
            })
            .collect();
        Self {
            language,
            entries,
        }
    }

    /// Fetches every page of `language`'s listing and indexes it.
    pub fn build<F>(fetcher: &F, language: Language, page_size: usize) -> Result<Self, FetchError>
    where
        F: SourceFetcher + ?Sized,
    {
        let started = Instant::now();
        let items = fetch_all(fetcher, Some(language), page_size)?;
        let index = Self::from_items(language, items);
        info!(
            language = %language,
            cards = index.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched translations"
        );
        Ok(index)
    }

    /// Language this index translates into.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Number of indexed cards.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no cards.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TranslationSource for TranslationIndex {
    fn lookup(&self, id: u64) -> Option<&LocalizedText> {
        self.entries.get(&id)
    }
}

/// Translation indices keyed by language.
pub type TranslationIndices = BTreeMap<Language, TranslationIndex>;

/// Builds one index per language.
///
/// With `workers <= 1` languages are fetched sequentially. Otherwise a bounded
/// pool fetches them concurrently; the first failure stops queued languages
/// from starting and is returned once in-flight fetches finish. The result is
/// keyed by language, so it does not depend on completion order.
pub fn build_indices<F>(
    fetcher: &F,
    languages: &[Language],
    page_size: usize,
    workers: usize,
) -> Result<TranslationIndices, FetchError>
where
    F: SourceFetcher + Sync + ?Sized,
{
    let workers = workers.max(1).min(languages.len().max(1));
    if workers == 1 {
        let mut indices = TranslationIndices::new();
        for &language in languages {
            info!(language = %language, "fetching translations");
            indices.insert(language, TranslationIndex::build(fetcher, language, page_size)?);
        }
        return Ok(indices);
    }

    debug!(workers, languages = languages.len(), "fetching translations in parallel");
    let cancelled = AtomicBool::new(false);
    let (task_tx, task_rx) = bounded::<Language>(languages.len());
    let (result_tx, result_rx) = bounded::<IndexResult>(languages.len());
    for &language in languages {
        // Capacity equals the language count, so this never blocks.
        let _ = task_tx.send(language);
    }
    drop(task_tx);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker_id| {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                let cancelled = &cancelled;
                scope.spawn(move || {
                    worker_loop(worker_id, fetcher, page_size, task_rx, result_tx, cancelled)
                })
            })
            .collect();
        drop(result_tx);
        let collected = collect_results(&result_rx, languages, &cancelled);
        let panicked = handles
            .into_iter()
            .map(|handle| handle.join())
            .filter(Result::is_err)
            .count();
        if panicked > 0 {
            warn!(panicked, "translation workers panicked");
        }
        collected
    })
}

type IndexResult = (Language, Result<TranslationIndex, FetchError>);

fn worker_loop<F>(
    worker_id: usize,
    fetcher: &F,
    page_size: usize,
    receiver: Receiver<Language>,
    sender: Sender<IndexResult>,
    cancelled: &AtomicBool,
) where
    F: SourceFetcher + ?Sized,
{
    for language in receiver.iter() {
        if cancelled.load(Ordering::Acquire) {
            debug!(worker_id, language = %language, "skipping translations after failure");
            continue;
        }
        info!(worker_id, language = %language, "fetching translations");
        let result = TranslationIndex::build(fetcher, language, page_size);
        if result.is_err() {
            cancelled.store(true, Ordering::Release);
        }
        if sender.send((language, result)).is_err() {
            break;
        }
    }
}

fn collect_results(
    receiver: &Receiver<IndexResult>,
    languages: &[Language],
    cancelled: &AtomicBool,
) -> Result<TranslationIndices, FetchError> {
    let mut indices = TranslationIndices::new();
    let mut first_error = None;
    for (language, result) in receiver.iter() {
        match result {
            Ok(index) => {
                indices.insert(language, index);
            }
            Err(err) => {
                cancelled.store(true, Ordering::Release);
                warn!(language = %language, error = %err, "translation fetch failed");
                first_error.get_or_insert(err);
            }
        }
    }
    if let Some(err) = first_error {
        return Err(err);
    }
    // A worker that panicked drops its language without reporting it.
    if let Some(&missing) = languages.iter().find(|lang| !indices.contains_key(*lang)) {
        return Err(FetchError::WorkerPanicked {
            language: LanguageLabel(Some(missing)),
        });
    }
    Ok(indices)
}
