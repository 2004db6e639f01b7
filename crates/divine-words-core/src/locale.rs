//! Locale-scoped text and translation sets
//!
//! Everything here is a pure lookup keyed by `Locale`. Nothing in this module knows
//! about selections or canonical references, so switching locale can only ever change
//! what is displayed, never what is resolved.

use crate::error::UnsupportedLocale;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    De,
    En,
}

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "de" | "deutsch" | "german" => Ok(Locale::De),
            "en" | "english" | "englisch" => Ok(Locale::En),
            _ => Err(UnsupportedLocale(s.to_string())),
        }
    }
}

/// A textual edition offered by the upstream provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub code: &'static str,
    pub name: &'static str,
}

const GERMAN_TRANSLATIONS: &[Translation] = &[
    Translation { code: "elberfelder", name: "Elberfelder 1905" },
    Translation { code: "luther1912", name: "Lutherbibel 1912" },
    Translation { code: "schlachter", name: "Schlachter 1951" },
];

const ENGLISH_TRANSLATIONS: &[Translation] = &[
    Translation { code: "web", name: "World English Bible" },
    Translation { code: "kjv", name: "King James Version" },
    Translation { code: "asv", name: "American Standard Version" },
];

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::De => "de",
            Locale::En => "en",
        }
    }

    pub fn all() -> Vec<Locale> {
        vec![Locale::De, Locale::En]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Locale::De => "Deutsch",
            Locale::En => "English",
        }
    }

    /// The other supported locale, for two-way toggles
    pub fn toggled(&self) -> Self {
        match self {
            Locale::De => Locale::En,
            Locale::En => Locale::De,
        }
    }

    pub fn translations(&self) -> &'static [Translation] {
        match self {
            Locale::De => GERMAN_TRANSLATIONS,
            Locale::En => ENGLISH_TRANSLATIONS,
        }
    }

    pub fn default_translation(&self) -> &'static Translation {
        &self.translations()[0]
    }

    pub fn has_translation(&self, code: &str) -> bool {
        self.translations().iter().any(|t| t.code == code)
    }

    pub fn translation(&self, code: &str) -> Option<&'static Translation> {
        self.translations().iter().find(|t| t.code == code)
    }

    pub fn labels(&self) -> &'static Labels {
        match self {
            Locale::De => &GERMAN_LABELS,
            Locale::En => &ENGLISH_LABELS,
        }
    }
}

/// Fixed interface strings for one locale
#[derive(Debug)]
pub struct Labels {
    pub book: &'static str,
    pub chapter: &'static str,
    pub verse: &'static str,
    pub verse_ranges: &'static str,
    pub translation: &'static str,
    pub search: &'static str,
    pub daily: &'static str,
    pub select_book: &'static str,
    pub select_chapter: &'static str,
    pub select_verse: &'static str,
    pub loading: &'static str,
    pub timeout: &'static str,
    pub unreachable: &'static str,
    pub not_found: &'static str,
    verses_prefix: &'static str,
}

const GERMAN_LABELS: Labels = Labels {
    book: "Buch",
    chapter: "Kapitel",
    verse: "Vers",
    verse_ranges: "Versbereiche",
    translation: "Übersetzung",
    search: "Suchen",
    daily: "Tagesvers",
    select_book: "Buch wählen",
    select_chapter: "Kapitel wählen",
    select_verse: "Vers wählen",
    loading: "Lädt...",
    timeout: "Zeitüberschreitung beim Laden der Bibelstelle",
    unreachable: "Der Bibeldienst ist nicht erreichbar",
    not_found: "Bibelstelle nicht gefunden",
    verses_prefix: "Verse",
};

const ENGLISH_LABELS: Labels = Labels {
    book: "Book",
    chapter: "Chapter",
    verse: "Verse",
    verse_ranges: "Verse ranges",
    translation: "Translation",
    search: "Search",
    daily: "Verse of the Day",
    select_book: "Select book",
    select_chapter: "Select chapter",
    select_verse: "Select verse",
    loading: "Loading...",
    timeout: "The passage took too long to load",
    unreachable: "The scripture service is unreachable",
    not_found: "Passage not found",
    verses_prefix: "Verses",
};

impl Labels {
    /// Caption for a verse range option, e.g. "Verse 1-3"
    pub fn range_caption(&self, start: u16, end: u16) -> String {
        format!("{} {}-{}", self.verses_prefix, start, end)
    }

    pub fn chapter_caption(&self, chapter: u16) -> String {
        format!("{} {}", self.chapter, chapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_translation_is_first_of_set() {
        for locale in Locale::all() {
            assert!(locale.has_translation(locale.default_translation().code));
        }
        assert_eq!(Locale::De.default_translation().code, "elberfelder");
        assert_eq!(Locale::En.default_translation().code, "web");
    }

    #[test]
    fn test_translation_sets_are_disjoint() {
        for t in Locale::De.translations() {
            assert!(!Locale::En.has_translation(t.code));
        }
    }

    #[test]
    fn test_from_str_accepts_codes_and_names() {
        assert_eq!("EN".parse::<Locale>(), Ok(Locale::En));
        assert_eq!("Deutsch".parse::<Locale>(), Ok(Locale::De));
        assert_eq!("fr".parse::<Locale>(), Err(UnsupportedLocale("fr".to_string())));
    }

    #[test]
    fn test_range_caption_per_locale() {
        assert_eq!(Locale::De.labels().range_caption(1, 3), "Verse 1-3");
        assert_eq!(Locale::En.labels().range_caption(4, 6), "Verses 4-6");
    }
}
