//! Catalog languages and the tags/markers derived from them.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages the catalog knows how to fetch, translate, and publish.
///
/// Variant order is significant: it drives the key order of every serialized
/// per-language field, so it must stay `EN, IT, FR, DE, PT`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    /// English, the base language of the source catalog.
    En,
    /// Italian.
    It,
    /// French.
    Fr,
    /// German.
    De,
    /// Portuguese.
    Pt,
}

impl Language {
    /// The language every source record is described in.
    pub const BASE: Language = Language::En;

    /// Every known language, in serialization order.
    pub const ALL: [Language; 5] = [
        Language::En,
        Language::It,
        Language::Fr,
        Language::De,
        Language::Pt,
    ];

    /// Uppercase tag (`"IT"`), also used as the two-letter set-code marker.
    pub fn tag(self) -> &'static str {
        match self {
            Self::En => "EN",
            Self::It => "IT",
            Self::Fr => "FR",
            Self::De => "DE",
            Self::Pt => "PT",
        }
    }

    /// Lowercase tag used for API queries and output field suffixes.
    pub fn query_tag(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::It => "it",
            Self::Fr => "fr",
            Self::De => "de",
            Self::Pt => "pt",
        }
    }

    /// Default single-letter set-code marker (`SDY-E006` style codes).
    pub fn one_letter_marker(self) -> char {
        match self {
            Self::En => 'E',
            Self::It => 'I',
            Self::Fr => 'F',
            Self::De => 'D',
            Self::Pt => 'P',
        }
    }

    /// Whether this is the base language.
    pub fn is_base(self) -> bool {
        self == Self::BASE
    }

    /// Builds `<prefix>_<query tag>` output field names (`name_it`).
    pub fn suffixed(self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.query_tag())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error returned when a language tag is not part of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown language tag `{0}`")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|lang| lang.tag().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownLanguage(wanted.to_string()))
    }
}

/// Removes duplicate languages while keeping the first occurrence of each.
pub fn dedup_languages(languages: &[Language]) -> Vec<Language> {
    let mut seen = Vec::with_capacity(languages.len());
    for &lang in languages {
        if !seen.contains(&lang) {
            seen.push(lang);
        }
    }
    seen
}
