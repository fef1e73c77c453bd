//! Rarity label translation tables and rarity-code derivation.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::language::Language;

type RarityTable = HashMap<&'static str, &'static str>;

const IT_RARITIES: &[(&str, &str)] = &[
    ("Common", "Comune"),
    ("Rare", "Rara"),
    ("Super Rare", "Super Rara"),
    ("Ultra Rare", "Ultra Rara"),
    ("Secret Rare", "Rara Segreta"),
    ("Ultimate Rare", "Rara Ultimate"),
    ("Ghost Rare", "Rara Fantasma"),
    ("Ghost/Gold Rare", "Rara Fantasma/Oro"),
    ("Gold Rare", "Rara Oro"),
    ("Gold Secret Rare", "Rara Segreta Oro"),
    ("Platinum Rare", "Rara Platino"),
    ("Platinum Secret Rare", "Rara Segreta Platino"),
    ("Premium Gold Rare", "Rara Oro Premium"),
    ("Prismatic Secret Rare", "Rara Segreta Prismatica"),
    ("Starfoil Rare", "Rara Starfoil"),
    ("Starlight Rare", "Rara Starlight"),
    ("Shatterfoil Rare", "Rara Shatterfoil"),
    ("Mosaic Rare", "Rara Mosaico"),
    ("Collector's Rare", "Rara da Collezione"),
    ("Normal Parallel Rare", "Rara Parallela Normale"),
    ("Super Parallel Rare", "Super Rara Parallela"),
    ("Ultra Parallel Rare", "Ultra Rara Parallela"),
    ("Quarter Century Secret Rare", "Rara Segreta Quarto di Secolo"),
    ("Extra Secret Rare", "Rara Segreta Extra"),
    ("Extra Secret", "Segreta Extra"),
    ("Ultra Secret Rare", "Ultra Rara Segreta"),
    ("Ultra Rare (Pharaoh's Rare)", "Ultra Rara (Rarità del Faraone)"),
    ("Duel Terminal Normal Parallel Rare", "Rara Parallela Normale Duel Terminal"),
    ("Duel Terminal Normal Rare Parallel Rare", "Rara Parallela Rara Duel Terminal"),
    ("Duel Terminal Rare Parallel Rare", "Rara Parallela Duel Terminal"),
    ("Duel Terminal Super Parallel Rare", "Super Rara Parallela Duel Terminal"),
    ("Duel Terminal Ultra Parallel Rare", "Ultra Rara Parallela Duel Terminal"),
    ("10000 Secret Rare", "Rara Segreta 10000"),
    ("Short Print", "Tiratura Limitata"),
    ("Super Short Print", "Tiratura Molto Limitata"),
    ("Starfoil", "Starfoil"),
    ("Reprint", "Ristampa"),
    ("New", "Novità"),
    ("New artwork", "Nuova illustrazione"),
    ("European & Oceanian debut", "Debutto Europeo e Oceaniano"),
    ("European debut", "Debutto Europeo"),
    ("Oceanian debut", "Debutto Oceaniano"),
];

const FR_RARITIES: &[(&str, &str)] = &[
    ("Common", "Commune"),
    ("Rare", "Rare"),
    ("Super Rare", "Super Rare"),
    ("Ultra Rare", "Ultra Rare"),
    ("Secret Rare", "Rare Secrète"),
    ("Ultimate Rare", "Rare Ultime"),
    ("Ghost Rare", "Rare Fantôme"),
    ("Ghost/Gold Rare", "Rare Fantôme/Or"),
    ("Gold Rare", "Rare Or"),
    ("Gold Secret Rare", "Rare Secrète Or"),
    ("Platinum Rare", "Rare Platine"),
    ("Platinum Secret Rare", "Rare Secrète Platine"),
    ("Premium Gold Rare", "Rare Or Premium"),
    ("Prismatic Secret Rare", "Rare Secrète Prismatique"),
    ("Starfoil Rare", "Rare Starfoil"),
    ("Starlight Rare", "Rare Starlight"),
    ("Shatterfoil Rare", "Rare Shatterfoil"),
    ("Mosaic Rare", "Rare Mosaïque"),
    ("Collector's Rare", "Rare de Collection"),
    ("Normal Parallel Rare", "Rare Parallèle Normale"),
    ("Super Parallel Rare", "Super Rare Parallèle"),
    ("Ultra Parallel Rare", "Ultra Rare Parallèle"),
    ("Quarter Century Secret Rare", "Rare Secrète Quart de Siècle"),
    ("Extra Secret Rare", "Rare Secrète Extra"),
    ("Extra Secret", "Secrète Extra"),
    ("Ultra Secret Rare", "Ultra Rare Secrète"),
    ("Ultra Rare (Pharaoh's Rare)", "Ultra Rare (Rare du Pharaon)"),
    ("Duel Terminal Normal Parallel Rare", "Rare Parallèle Normale Duel Terminal"),
    ("Duel Terminal Normal Rare Parallel Rare", "Rare Parallèle Duel Terminal"),
    ("Duel Terminal Rare Parallel Rare", "Rare Parallèle Duel Terminal"),
    ("Duel Terminal Super Parallel Rare", "Super Rare Parallèle Duel Terminal"),
    ("Duel Terminal Ultra Parallel Rare", "Ultra Rare Parallèle Duel Terminal"),
    ("10000 Secret Rare", "Rare Secrète 10000"),
    ("Short Print", "Tirage Limité"),
    ("Super Short Print", "Tirage Très Limité"),
    ("Starfoil", "Starfoil"),
    ("Reprint", "Réimpression"),
    ("New", "Nouveau"),
    ("New artwork", "Nouvelle illustration"),
    ("European & Oceanian debut", "Début Européen et Océanien"),
    ("European debut", "Début Européen"),
    ("Oceanian debut", "Début Océanien"),
];

const DE_RARITIES: &[(&str, &str)] = &[
    ("Common", "Häufig"),
    ("Rare", "Selten"),
    ("Super Rare", "Super Selten"),
    ("Ultra Rare", "Ultra Selten"),
    ("Secret Rare", "Geheim Selten"),
    ("Ultimate Rare", "Ultimativ Selten"),
    ("Ghost Rare", "Geist Selten"),
    ("Ghost/Gold Rare", "Geist/Gold Selten"),
    ("Gold Rare", "Gold Selten"),
    ("Gold Secret Rare", "Gold Geheim Selten"),
    ("Platinum Rare", "Platin Selten"),
    ("Platinum Secret Rare", "Platin Geheim Selten"),
    ("Premium Gold Rare", "Premium Gold Selten"),
    ("Prismatic Secret Rare", "Prismatisch Geheim Selten"),
    ("Starfoil Rare", "Starfoil Selten"),
    ("Starlight Rare", "Starlight Selten"),
    ("Shatterfoil Rare", "Shatterfoil Selten"),
    ("Mosaic Rare", "Mosaik Selten"),
    ("Collector's Rare", "Sammler Selten"),
    ("Normal Parallel Rare", "Normal Parallel Selten"),
    ("Super Parallel Rare", "Super Parallel Selten"),
    ("Ultra Parallel Rare", "Ultra Parallel Selten"),
    ("Quarter Century Secret Rare", "Vierteljahrhundert Geheim Selten"),
    ("Extra Secret Rare", "Extra Geheim Selten"),
    ("Extra Secret", "Extra Geheim"),
    ("Ultra Secret Rare", "Ultra Geheim Selten"),
    ("Ultra Rare (Pharaoh's Rare)", "Ultra Selten (Pharao Selten)"),
    ("Duel Terminal Normal Parallel Rare", "Duel Terminal Normal Parallel Selten"),
    ("Duel Terminal Normal Rare Parallel Rare", "Duel Terminal Parallel Selten"),
    ("Duel Terminal Rare Parallel Rare", "Duel Terminal Parallel Selten"),
    ("Duel Terminal Super Parallel Rare", "Duel Terminal Super Parallel Selten"),
    ("Duel Terminal Ultra Parallel Rare", "Duel Terminal Ultra Parallel Selten"),
    ("10000 Secret Rare", "10000 Geheim Selten"),
    ("Short Print", "Kurzauflage"),
    ("Super Short Print", "Sehr Kurzauflage"),
    ("Starfoil", "Starfoil"),
    ("Reprint", "Nachdruck"),
    ("New", "Neu"),
    ("New artwork", "Neues Artwork"),
    ("European & Oceanian debut", "Europäisches & Ozeanisches Debüt"),
    ("European debut", "Europäisches Debüt"),
    ("Oceanian debut", "Ozeanisches Debüt"),
];

const PT_RARITIES: &[(&str, &str)] = &[
    ("Common", "Comum"),
    ("Rare", "Rara"),
    ("Super Rare", "Super Rara"),
    ("Ultra Rare", "Ultra Rara"),
    ("Secret Rare", "Rara Secreta"),
    ("Ultimate Rare", "Rara Ultimate"),
    ("Ghost Rare", "Rara Fantasma"),
    ("Ghost/Gold Rare", "Rara Fantasma/Ouro"),
    ("Gold Rare", "Rara Ouro"),
    ("Gold Secret Rare", "Rara Secreta Ouro"),
    ("Platinum Rare", "Rara Platina"),
    ("Platinum Secret Rare", "Rara Secreta Platina"),
    ("Premium Gold Rare", "Rara Ouro Premium"),
    ("Prismatic Secret Rare", "Rara Secreta Prismática"),
    ("Starfoil Rare", "Rara Starfoil"),
    ("Starlight Rare", "Rara Starlight"),
    ("Shatterfoil Rare", "Rara Shatterfoil"),
    ("Mosaic Rare", "Rara Mosaico"),
    ("Collector's Rare", "Rara de Coleção"),
    ("Normal Parallel Rare", "Rara Paralela Normal"),
    ("Super Parallel Rare", "Super Rara Paralela"),
    ("Ultra Parallel Rare", "Ultra Rara Paralela"),
    ("Quarter Century Secret Rare", "Rara Secreta Quarto de Século"),
    ("Extra Secret Rare", "Rara Secreta Extra"),
    ("Extra Secret", "Secreta Extra"),
    ("Ultra Secret Rare", "Ultra Rara Secreta"),
    ("Ultra Rare (Pharaoh's Rare)", "Ultra Rara (Raridade do Faraó)"),
    ("Duel Terminal Normal Parallel Rare", "Rara Paralela Normal Duel Terminal"),
    ("Duel Terminal Normal Rare Parallel Rare", "Rara Paralela Duel Terminal"),
    ("Duel Terminal Rare Parallel Rare", "Rara Paralela Duel Terminal"),
    ("Duel Terminal Super Parallel Rare", "Super Rara Paralela Duel Terminal"),
    ("Duel Terminal Ultra Parallel Rare", "Ultra Rara Paralela Duel Terminal"),
    ("10000 Secret Rare", "Rara Secreta 10000"),
    ("Short Print", "Tiragem Limitada"),
    ("Super Short Print", "Tiragem Muito Limitada"),
    ("Starfoil", "Starfoil"),
    ("Reprint", "Reimpressão"),
    ("New", "Novo"),
    ("New artwork", "Nova ilustração"),
    ("European & Oceanian debut", "Estreia Europeia e Oceânica"),
    ("European debut", "Estreia Europeia"),
    ("Oceanian debut", "Estreia Oceânica"),
];

fn tables() -> &'static HashMap<Language, RarityTable> {
    static TABLES: OnceLock<HashMap<Language, RarityTable>> = OnceLock::new();
    TABLES.get_or_init(|| {
        [
            (Language::It, IT_RARITIES),
            (Language::Fr, FR_RARITIES),
            (Language::De, DE_RARITIES),
            (Language::Pt, PT_RARITIES),
        ]
        .into_iter()
        .map(|(lang, entries)| (lang, entries.iter().copied().collect()))
        .collect()
    })
}

/// Translates an English rarity label, falling back to the input when the
/// label (exact, case-sensitive) or the language has no table entry.
pub fn localize_rarity(label: &str, target: Language) -> String {
    tables()
        .get(&target)
        .and_then(|table| table.get(label))
        .map_or_else(|| label.to_string(), |translated| (*translated).to_string())
}

/// Resolves the short rarity code for a print.
///
/// An explicit code wins once its parentheses are stripped (`"(UR)"` -> `"UR"`);
/// otherwise the code is the uppercased initials of the label's words.
pub fn rarity_code(explicit: Option<&str>, label: &str) -> String {
    let explicit = explicit
        .map(|code| code.replace(['(', ')'], "").trim().to_string())
        .filter(|code| !code.is_empty());
    explicit.unwrap_or_else(|| {
        label
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect::<String>()
            .to_uppercase()
    })
}
