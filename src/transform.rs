//! Merges a base-language card, its translations, and derived print fields
//! into one multilingual catalog record.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::language::Language;
use crate::rarity::{localize_rarity, rarity_code};
use crate::set_code::SetCodeLocalizer;
use crate::source::{PriceValue, SourceItem, SourcePrices, SourceVariant};
use crate::translation::TranslationSource;

/// Marketplace prices for a print, identical for every language.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSnapshot {
    /// Cardmarket price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardmarket_price: Option<f64>,
    /// TCGplayer price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcgplayer_price: Option<f64>,
    /// eBay price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ebay_price: Option<f64>,
    /// Amazon price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amazon_price: Option<f64>,
    /// CoolStuffInc price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coolstuffinc_price: Option<f64>,
}

impl PriceSnapshot {
    /// Parses every known price field; unusable values are dropped.
    pub fn from_source(prices: &SourcePrices) -> Self {
        let amount = |value: &Option<PriceValue>| value.as_ref().and_then(PriceValue::amount);
        Self {
            cardmarket_price: amount(&prices.cardmarket_price),
            tcgplayer_price: amount(&prices.tcgplayer_price),
            ebay_price: amount(&prices.ebay_price),
            amazon_price: amount(&prices.amazon_price),
            coolstuffinc_price: amount(&prices.coolstuffinc_price),
        }
    }

    /// True when no field parsed.
    pub fn is_empty(&self) -> bool {
        self.cardmarket_price.is_none()
            && self.tcgplayer_price.is_none()
            && self.ebay_price.is_none()
            && self.amazon_price.is_none()
            && self.coolstuffinc_price.is_none()
    }
}

/// Translated name/text of a card for one language.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemTranslation {
    /// Translated name, when non-empty.
    pub name: Option<String>,
    /// Translated text, when non-empty.
    pub description: Option<String>,
}

/// Per-language fields of a print.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantLocalization {
    /// Set code with the language marker swapped.
    pub set_code: Option<String>,
    /// Set name; group names are not translated, so this mirrors the base name.
    pub set_name: Option<String>,
    /// Translated rarity label.
    pub rarity: Option<String>,
    /// Rarity code, never translated.
    pub rarity_code: Option<String>,
    /// Print price, replicated from the base print.
    pub set_price: Option<f64>,
}

/// One print of a card with every language's derived fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalizedVariant {
    /// Base set code, as sent by the source.
    pub set_code: Option<String>,
    /// Base set name.
    pub set_name: Option<String>,
    /// English rarity label.
    pub rarity: Option<String>,
    /// Short rarity code.
    pub rarity_code: Option<String>,
    /// Print price.
    pub set_price: Option<f64>,
    /// Representative artwork of the card.
    pub artwork: Option<String>,
    /// Derived fields per translated language.
    pub localized: BTreeMap<Language, VariantLocalization>,
    /// Price snapshot per supported language; empty when nothing parsed.
    pub prices: BTreeMap<Language, PriceSnapshot>,
}

/// Transform output for one card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultilingualItem {
    /// Card identifier.
    pub id: u64,
    /// Card type.
    pub kind: Option<String>,
    /// Display form of the card type.
    pub human_readable_type: Option<String>,
    /// Frame style.
    pub frame_type: Option<String>,
    /// Monster race or spell/trap subtype.
    pub race: Option<String>,
    /// Archetype.
    pub archetype: Option<String>,
    /// Source catalog page.
    pub ygoprodeck_url: Option<String>,
    /// Attack points.
    pub atk: Option<i64>,
    /// Defense points.
    pub def: Option<i64>,
    /// Level or rank.
    pub level: Option<i64>,
    /// Monster attribute.
    pub attribute: Option<String>,
    /// Pendulum scale.
    pub scale: Option<i64>,
    /// Link rating.
    pub linkval: Option<i64>,
    /// Link arrows, comma separated.
    pub linkmarkers: Option<String>,
    /// English name.
    pub name: Option<String>,
    /// English card text.
    pub description: Option<String>,
    /// Translations that were found, by language.
    pub translations: BTreeMap<Language, ItemTranslation>,
    /// Prints in source order.
    pub prints: Vec<LocalizedVariant>,
}

impl MultilingualItem {
    /// Whether any language contributed a translated name.
    pub fn has_translations(&self) -> bool {
        self.translations
            .values()
            .any(|translation| translation.name.is_some())
    }
}

/// Builds [`MultilingualItem`]s out of source cards and translation lookups.
///
/// Pure: the same card and lookups always produce the same record.
pub struct Transformer<'a, T> {
    translated: &'a [Language],
    supported: &'a [Language],
    sources: &'a BTreeMap<Language, T>,
    set_codes: &'a SetCodeLocalizer,
}

impl<'a, T: TranslationSource> Transformer<'a, T> {
    /// `translated` drives name/print localization; `supported` keys the price maps.
    pub fn new(
        translated: &'a [Language],
        supported: &'a [Language],
        sources: &'a BTreeMap<Language, T>,
    ) -> Self {
        Self {
            translated,
            supported,
            sources,
            set_codes: SetCodeLocalizer::standard(),
        }
    }

    /// Replaces the set-code marker table.
    pub fn with_set_code_localizer(mut self, set_codes: &'a SetCodeLocalizer) -> Self {
        self.set_codes = set_codes;
        self
    }

    /// Transforms every card, preserving order.
    pub fn transform_all(&self, items: &[SourceItem]) -> Vec<MultilingualItem> {
        items.iter().map(|item| self.transform(item)).collect()
    }

    /// Transforms a single card.
    pub fn transform(&self, item: &SourceItem) -> MultilingualItem {
        let kind = non_empty(item.kind.as_deref());
        let translations = self
            .translated
            .iter()
            .filter_map(|&lang| {
                let text = self.sources.get(&lang)?.lookup(item.id)?;
                let translation = ItemTranslation {
                    name: present(text.name.clone()),
                    description: present(text.description.clone()),
                };
                Some((lang, translation))
            })
            .collect();

        let artwork = item
            .card_images
            .first()
            .and_then(|image| non_empty(image.image_url_cropped.as_deref()));
        let prices = self.price_map(item.card_prices.first());
        let prints = item
            .card_sets
            .iter()
            .map(|variant| self.localize_variant(variant, artwork.as_deref(), &prices))
            .collect();

        MultilingualItem {
            id: item.id,
            human_readable_type: non_empty(item.human_readable_type.as_deref())
                .or_else(|| kind.clone()),
            kind,
            frame_type: non_empty(item.frame_type.as_deref()),
            race: non_empty(item.race.as_deref()),
            archetype: non_empty(item.archetype.as_deref()),
            ygoprodeck_url: non_empty(item.ygoprodeck_url.as_deref()),
            atk: item.atk,
            def: item.def,
            level: item.level,
            attribute: non_empty(item.attribute.as_deref()),
            scale: item.scale,
            linkval: item.linkval,
            linkmarkers: item
                .linkmarkers
                .as_ref()
                .and_then(|markers| present(markers.join(","))),
            name: non_empty(item.name.as_deref()),
            description: non_empty(item.desc.as_deref()),
            translations,
            prints,
        }
    }

    fn price_map(&self, source: Option<&SourcePrices>) -> BTreeMap<Language, PriceSnapshot> {
        let snapshot = source.map(PriceSnapshot::from_source).unwrap_or_default();
        if snapshot.is_empty() {
            return BTreeMap::new();
        }
        self.supported
            .iter()
            .map(|&lang| (lang, snapshot.clone()))
            .collect()
    }

    fn localize_variant(
        &self,
        variant: &SourceVariant,
        artwork: Option<&str>,
        prices: &BTreeMap<Language, PriceSnapshot>,
    ) -> LocalizedVariant {
        let set_code = non_empty(variant.set_code.as_deref());
        let set_name = non_empty(variant.set_name.as_deref());
        let rarity = variant.set_rarity.as_deref().unwrap_or_default();
        let code = present(rarity_code(variant.set_rarity_code.as_deref(), rarity));
        let set_price = variant.set_price.as_ref().and_then(PriceValue::amount);

        let localized = self
            .translated
            .iter()
            .map(|&lang| {
                let fields = VariantLocalization {
                    set_code: set_code
                        .as_deref()
                        .and_then(|code| present(self.set_codes.localize(code, lang))),
                    set_name: set_name.clone(),
                    rarity: present(localize_rarity(rarity, lang)),
                    rarity_code: code.clone(),
                    set_price,
                };
                (lang, fields)
            })
            .collect();

        LocalizedVariant {
            set_code,
            set_name,
            rarity: non_empty(Some(rarity)),
            rarity_code: code,
            set_price,
            artwork: artwork.map(str::to_string),
            localized,
            prices: prices.clone(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|text| !text.is_empty()).map(str::to_string)
}

fn present(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn put<M, V>(map: &mut M, key: &str, value: &Option<V>) -> Result<(), M::Error>
where
    M: SerializeMap,
    V: Serialize,
{
    match value {
        Some(value) => map.serialize_entry(key, value),
        None => Ok(()),
    }
}

impl Serialize for MultilingualItem {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        put(&mut map, "type", &self.kind)?;
        put(&mut map, "human_readable_type", &self.human_readable_type)?;
        put(&mut map, "frame_type", &self.frame_type)?;
        put(&mut map, "race", &self.race)?;
        put(&mut map, "archetype", &self.archetype)?;
        put(&mut map, "ygoprodeck_url", &self.ygoprodeck_url)?;
        put(&mut map, "atk", &self.atk)?;
        put(&mut map, "def", &self.def)?;
        put(&mut map, "level", &self.level)?;
        put(&mut map, "attribute", &self.attribute)?;
        put(&mut map, "scale", &self.scale)?;
        put(&mut map, "linkval", &self.linkval)?;
        put(&mut map, "linkmarkers", &self.linkmarkers)?;
        put(&mut map, "name", &self.name)?;
        put(&mut map, "description", &self.description)?;
        for (lang, translation) in &self.translations {
            put(&mut map, &lang.suffixed("name"), &translation.name)?;
            put(&mut map, &lang.suffixed("description"), &translation.description)?;
        }
        if !self.prints.is_empty() {
            map.serialize_entry("prints", &self.prints)?;
        }
        map.end()
    }
}

impl Serialize for LocalizedVariant {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        put(&mut map, "set_code", &self.set_code)?;
        put(&mut map, "set_name", &self.set_name)?;
        put(&mut map, "rarity", &self.rarity)?;
        put(&mut map, "rarity_code", &self.rarity_code)?;
        put(&mut map, "set_price", &self.set_price)?;
        put(&mut map, "artwork", &self.artwork)?;
        for (lang, fields) in &self.localized {
            put(&mut map, &lang.suffixed("set_code"), &fields.set_code)?;
            put(&mut map, &lang.suffixed("set_name"), &fields.set_name)?;
            put(&mut map, &lang.suffixed("rarity"), &fields.rarity)?;
            put(&mut map, &lang.suffixed("rarity_code"), &fields.rarity_code)?;
            put(&mut map, &lang.suffixed("set_price"), &fields.set_price)?;
        }
        if !self.prices.is_empty() {
            map.serialize_entry("prices", &self.prices)?;
        }
        map.end()
    }
}
