//! Source records as served by the card-info API, plus paginated retrieval.

pub mod http;
pub mod snapshot;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::language::Language;

/// One catalog entry in the base language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceItem {
    /// Card identifier, stable across languages.
    pub id: u64,
    /// Card name.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Card text.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Card type (`"Effect Monster"`).
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    /// Display form of the card type.
    #[serde(
        rename = "humanReadableCardType",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub human_readable_type: Option<String>,
    /// Frame style (`"effect"`, `"xyz"`, ...).
    #[serde(
        rename = "frameType",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub frame_type: Option<String>,
    /// Monster race or spell/trap subtype.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub race: Option<String>,
    /// Archetype the card belongs to.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
    /// Source catalog page.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub ygoprodeck_url: Option<String>,
    /// Attack points.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub atk: Option<i64>,
    /// Defense points.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub def: Option<i64>,
    /// Level or rank.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    /// Monster attribute.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    /// Pendulum scale.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub scale: Option<i64>,
    /// Link rating.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub linkval: Option<i64>,
    /// Link arrow directions.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub linkmarkers: Option<Vec<String>>,
    /// Printings of the card, one per set appearance.
    #[serde(default, deserialize_with = "lenient_list")]
    pub card_sets: Vec<SourceVariant>,
    /// Artwork entries; the first one is representative.
    #[serde(default, deserialize_with = "lenient_list")]
    pub card_images: Vec<SourceImage>,
    /// Price snapshots; only the first is used.
    #[serde(default, deserialize_with = "lenient_list")]
    pub card_prices: Vec<SourcePrices>,
}

/// One printing of a card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceVariant {
    /// Human-readable set name.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub set_name: Option<String>,
    /// Structured code, `<group>-<marker><suffix>`.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub set_code: Option<String>,
    /// Free-text rarity label in English.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub set_rarity: Option<String>,
    /// Short rarity code, usually parenthesized (`"(UR)"`).
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub set_rarity_code: Option<String>,
    /// Price for this printing.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub set_price: Option<PriceValue>,
}

/// Artwork entry; only the cropped image is used downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceImage {
    /// Image identifier.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Full card image.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Artwork-only crop.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub image_url_cropped: Option<String>,
}

/// Marketplace price snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourcePrices {
    /// Cardmarket price.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cardmarket_price: Option<PriceValue>,
    /// TCGplayer price.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub tcgplayer_price: Option<PriceValue>,
    /// eBay price.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub ebay_price: Option<PriceValue>,
    /// Amazon price.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub amazon_price: Option<PriceValue>,
    /// CoolStuffInc price.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub coolstuffinc_price: Option<PriceValue>,
}

/// Price as sent by the source: usually a decimal string, sometimes a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    /// JSON number.
    Number(f64),
    /// Decimal string such as `"0.42"`.
    Text(String),
}

impl PriceValue {
    /// Numeric value, or `None` when unparsable, non-finite, or zero.
    pub fn amount(&self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        (value.is_finite() && value != 0.0).then_some(value)
    }
}

/// Reads an optional field, treating a value of the wrong shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .and_then(|value| serde_json::from_value(value).ok()))
}

fn decode_entries<T: DeserializeOwned>(value: Option<Value>) -> (Vec<T>, usize) {
    let Some(Value::Array(entries)) = value else {
        return (Vec::new(), 0);
    };
    let total = entries.len();
    let decoded: Vec<T> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();
    let skipped = total - decoded.len();
    (decoded, skipped)
}

/// Reads a list, dropping entries that do not decode. `null` or a non-array is empty.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(decode_entries(Option::<Value>::deserialize(deserializer)?).0)
}

fn decode_items<'de, D>(deserializer: D) -> Result<Vec<SourceItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let (items, skipped) = decode_entries(Option::<Value>::deserialize(deserializer)?);
    if skipped > 0 {
        warn!(skipped, "dropped source items without a usable id");
    }
    Ok(items)
}

/// Envelope returned by one page request (`{"data": [...], "meta": {...}}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceEnvelope {
    /// Items on this page.
    #[serde(default, deserialize_with = "decode_items")]
    pub data: Vec<SourceItem>,
    /// Pagination metadata.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub meta: Option<SourceMeta>,
}

/// Pagination metadata attached to each page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMeta {
    /// Total rows in the listing.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u64>,
}

/// One page of source items.
#[derive(Debug, Clone, Default)]
pub struct SourcePage {
    /// Items in source order.
    pub items: Vec<SourceItem>,
    /// Total rows the source reports for the whole listing, when known.
    pub total_rows: Option<u64>,
}

impl From<SourceEnvelope> for SourcePage {
    fn from(envelope: SourceEnvelope) -> Self {
        Self {
            items: envelope.data,
            total_rows: envelope.meta.and_then(|meta| meta.total_rows),
        }
    }
}

/// Errors raised while retrieving source pages. All of them abort the run.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport failure before a response arrived.
    #[error("request for {language} page at offset {offset} failed")]
    Http {
        /// Listing being fetched.
        language: LanguageLabel,
        /// Page offset.
        offset: usize,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The source answered with a non-success status.
    #[error("HTTP {status} fetching {language} at offset {offset}: {body}")]
    Status {
        /// Listing being fetched.
        language: LanguageLabel,
        /// Page offset.
        offset: usize,
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
    /// The response body was not a valid page envelope.
    #[error("invalid {language} page payload at offset {offset}")]
    Decode {
        /// Listing being fetched.
        language: LanguageLabel,
        /// Page offset.
        offset: usize,
        /// Underlying decode error.
        #[source]
        source: reqwest::Error,
    },
    /// A snapshot file could not be read.
    #[error("failed to read snapshot {path:?}")]
    SnapshotIo {
        /// Snapshot file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A snapshot file did not contain a page envelope.
    #[error("invalid snapshot payload in {path:?}")]
    SnapshotFormat {
        /// Snapshot file path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A translation worker thread died without reporting a result.
    #[error("translation worker for {language} stopped unexpectedly")]
    WorkerPanicked {
        /// Listing the worker was fetching.
        language: LanguageLabel,
    },
}

/// Display helper naming the base language when no tag is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageLabel(pub Option<Language>);

impl std::fmt::Display for LanguageLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.unwrap_or(Language::BASE).query_tag())
    }
}

/// Paginated access to the source catalog.
///
/// `language == None` requests the base-language listing.
pub trait SourceFetcher {
    /// Fetches up to `page_size` items starting at `offset`.
    fn fetch_page(
        &self,
        language: Option<Language>,
        offset: usize,
        page_size: usize,
    ) -> Result<SourcePage, FetchError>;
}

impl<F: SourceFetcher + ?Sized> SourceFetcher for &F {
    fn fetch_page(
        &self,
        language: Option<Language>,
        offset: usize,
        page_size: usize,
    ) -> Result<SourcePage, FetchError> {
        (**self).fetch_page(language, offset, page_size)
    }
}

/// Retrieves every page of a listing, in source order.
///
/// Stops on a short page, or once the running total reaches the reported
/// `total_rows`. Pages are requested strictly one after another because each
/// offset depends on the items already received.
pub fn fetch_all<F>(
    fetcher: &F,
    language: Option<Language>,
    page_size: usize,
) -> Result<Vec<SourceItem>, FetchError>
where
    F: SourceFetcher + ?Sized,
{
    let page_size = page_size.max(1);
    let mut items = Vec::new();
    let mut offset = 0usize;
    loop {
        let page = fetcher.fetch_page(language, offset, page_size)?;
        let received = page.items.len();
        items.extend(page.items);
        debug!(
            language = %LanguageLabel(language),
            offset,
            received,
            total = ?page.total_rows,
            "fetched source page"
        );
        let reached_total = page
            .total_rows
            .is_some_and(|total| (offset + received) as u64 >= total);
        if received < page_size || reached_total {
            break;
        }
        offset += received;
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// In-memory fetcher that records every requested offset.
    struct PagedFake {
        items: Vec<SourceItem>,
        report_total: bool,
        calls: RefCell<Vec<usize>>,
    }

    impl PagedFake {
        fn with_ids(count: u64, report_total: bool) -> Self {
            Self {
                items: (1..=count)
                    .map(|id| SourceItem {
                        id,
                        ..SourceItem::default()
                    })
                    .collect(),
                report_total,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl SourceFetcher for PagedFake {
        fn fetch_page(
            &self,
            _language: Option<Language>,
            offset: usize,
            page_size: usize,
        ) -> Result<SourcePage, FetchError> {
            self.calls.borrow_mut().push(offset);
            let end = (offset + page_size).min(self.items.len());
            let items = self.items.get(offset..end).unwrap_or_default().to_vec();
            Ok(SourcePage {
                items,
                total_rows: self.report_total.then_some(self.items.len() as u64),
            })
        }
    }

    #[test]
    fn stops_on_short_page() {
        let fake = PagedFake::with_ids(7, false);
        let items = fetch_all(&fake, None, 3).unwrap();
        assert_eq!(items.len(), 7);
        assert_eq!(*fake.calls.borrow(), vec![0, 3, 6]);
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn stops_when_total_reached_on_full_page() {
        let fake = PagedFake::with_ids(6, true);
        let items = fetch_all(&fake, Some(Language::It), 3).unwrap();
        assert_eq!(items.len(), 6);
        assert_eq!(*fake.calls.borrow(), vec![0, 3]);
    }

    #[test]
    fn without_total_needs_an_empty_page_to_stop() {
        let fake = PagedFake::with_ids(6, false);
        let items = fetch_all(&fake, None, 3).unwrap();
        assert_eq!(items.len(), 6);
        assert_eq!(*fake.calls.borrow(), vec![0, 3, 6]);
    }

    #[test]
    fn parses_price_values() {
        assert_eq!(PriceValue::Text(" 1.25 ".into()).amount(), Some(1.25));
        assert_eq!(PriceValue::Number(3.0).amount(), Some(3.0));
        assert_eq!(PriceValue::Text("0.00".into()).amount(), None);
        assert_eq!(PriceValue::Text("n/a".into()).amount(), None);
        assert_eq!(PriceValue::Text(String::new()).amount(), None);
    }

    #[test]
    fn tolerates_nulls_and_missing_fields() {
        let item: SourceItem = serde_json::from_str(
            r#"{"id": 42, "name": "Kuriboh", "card_sets": null, "atk": 300, "def": null,
                "card_prices": [{"tcgplayer_price": "0.10", "ebay_price": 1.5}]}"#,
        )
        .unwrap();
        assert_eq!(item.id, 42);
        assert!(item.card_sets.is_empty());
        assert_eq!(item.def, None);
        assert_eq!(item.atk, Some(300));
        assert_eq!(
            item.card_prices[0].ebay_price,
            Some(PriceValue::Number(1.5))
        );
    }

    #[test]
    fn mistyped_fields_do_not_sink_the_page() {
        let envelope: SourceEnvelope = serde_json::from_str(
            r#"{"data": [
                {"id": 1, "name": "Kuriboh", "atk": 300},
                {"id": 2, "name": "Sangan", "atk": "?", "level": "3", "linkmarkers": "Top",
                 "card_sets": [{"set_code": "MRD-EN069", "set_price": true}, "junk"],
                 "card_images": {"id": 2}},
                {"id": "not-a-number", "name": "Lost"}
            ], "meta": {"total_rows": "many"}}"#,
        )
        .unwrap();
        let page = SourcePage::from(envelope);
        assert_eq!(page.total_rows, None);
        assert_eq!(page.items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(page.items[0].atk, Some(300));

        let sangan = &page.items[1];
        assert_eq!(sangan.name.as_deref(), Some("Sangan"));
        assert_eq!(sangan.atk, None);
        assert_eq!(sangan.level, None);
        assert_eq!(sangan.linkmarkers, None);
        assert_eq!(
            sangan.card_sets,
            vec![SourceVariant {
                set_code: Some("MRD-EN069".into()),
                ..SourceVariant::default()
            }]
        );
        assert!(sangan.card_images.is_empty());
    }
}
