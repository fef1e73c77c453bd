//! Set-code localization (`LOB-EN001` -> `LOB-IT001`, `SDY-E006` -> `SDY-I006`).

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::language::Language;

/// Two-letter language markers recognized inside set codes.
pub const KNOWN_TWO_LETTER_MARKERS: &[&str] = &[
    "EN", "IT", "FR", "DE", "PT", "ES", "SP", "JP", "JA", "KR", "KO",
];

/// Rewrites the language marker embedded in a set code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCodeLocalizer {
    one_letter: BTreeMap<Language, char>,
}

impl SetCodeLocalizer {
    /// Builds a localizer with an explicit one-letter marker table.
    ///
    /// Languages missing from the table keep the original single-letter marker.
    pub fn new(one_letter: BTreeMap<Language, char>) -> Self {
        Self { one_letter }
    }

    /// Shared localizer using each language's default single-letter marker.
    pub fn standard() -> &'static SetCodeLocalizer {
        static STANDARD: OnceLock<SetCodeLocalizer> = OnceLock::new();
        STANDARD.get_or_init(|| {
            Self::new(
                Language::ALL
                    .into_iter()
                    .map(|lang| (lang, lang.one_letter_marker()))
                    .collect(),
            )
        })
    }

    /// Returns `code` with its language marker swapped for `target`'s.
    ///
    /// Never fails: codes that do not look like `<prefix>-<letters><digits...>`
    /// come back normalized (trimmed, uppercased) but otherwise unchanged.
    pub fn localize(&self, code: &str, target: Language) -> String {
        let code = code.trim().to_uppercase();
        let Some(parts) = SetCodeParts::parse(&code) else {
            return code;
        };
        match parts.letters.len() {
            2 if KNOWN_TWO_LETTER_MARKERS.contains(&parts.letters) => {
                format!("{}-{}{}", parts.prefix, target.tag(), parts.suffix)
            }
            1 => match self.one_letter.get(&target) {
                Some(marker) => format!("{}-{}{}", parts.prefix, marker, parts.suffix),
                None => code.clone(),
            },
            _ => code.clone(),
        }
    }
}

/// Localizes `code` for `target` with the standard marker table.
pub fn localize_set_code(code: &str, target: Language) -> String {
    SetCodeLocalizer::standard().localize(code, target)
}

struct SetCodeParts<'a> {
    prefix: &'a str,
    letters: &'a str,
    suffix: &'a str,
}

impl<'a> SetCodeParts<'a> {
    /// Parses an already-normalized code; mirrors `^([A-Z0-9]+)-([A-Z]*)(\d.*)$`.
    fn parse(code: &'a str) -> Option<Self> {
        let (prefix, rest) = code.split_once('-')?;
        if prefix.is_empty()
            || !prefix
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return None;
        }
        let letters_len = rest.bytes().take_while(u8::is_ascii_uppercase).count();
        let (letters, suffix) = rest.split_at(letters_len);
        if !suffix.starts_with(|ch: char| ch.is_ascii_digit()) || suffix.contains('\n') {
            return None;
        }
        Some(Self {
            prefix,
            letters,
            suffix,
        })
    }
}
