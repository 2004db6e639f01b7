//! Static book catalog
//!
//! Books, chapter counts and verse counts are compiled in and never change at runtime,
//! so a single `&'static Catalog` is shared by every session and every thread.

mod books;

use crate::error::CatalogError;
use crate::locale::Locale;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Testament {
    Old,
    New,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Book {
    ordinal: u8,
    key: &'static str,
    // Indexed by locale: [de, en]
    names: [&'static str; 2],
    verses: &'static [u16],
}

impl Book {
    /// Position in canonical order, 1 (Genesis) through 66 (Revelation)
    pub fn ordinal(&self) -> u8 {
        self.ordinal
    }

    /// Locale-invariant key used in canonical references, e.g. `john` or `1samuel`
    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn name(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::De => self.names[0],
            Locale::En => self.names[1],
        }
    }

    pub fn chapter_count(&self) -> u16 {
        self.verses.len() as u16
    }

    /// Verse count for a 1-based chapter number
    pub fn verse_count(&self, chapter: u16) -> Option<u16> {
        if chapter == 0 {
            return None;
        }
        self.verses.get(usize::from(chapter) - 1).copied()
    }

    pub fn testament(&self) -> Testament {
        if self.ordinal <= 39 {
            Testament::Old
        } else {
            Testament::New
        }
    }
}

/// A book as presented to one locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookEntry {
    pub ordinal: u8,
    pub key: &'static str,
    pub name: &'static str,
    pub chapters: u16,
    pub testament: Testament,
}

pub struct Catalog {
    books: &'static [Book],
}

static STANDARD: Catalog = Catalog { books: &books::BOOKS };

impl Catalog {
    pub fn standard() -> &'static Catalog {
        &STANDARD
    }

    pub fn books(&self) -> &'static [Book] {
        self.books
    }

    /// Books in canonical order with names for `locale`. Order never depends on locale.
    pub fn list_books(&self, locale: Locale) -> Vec<BookEntry> {
        self.books
            .iter()
            .map(|book| BookEntry {
                ordinal: book.ordinal,
                key: book.key,
                name: book.name(locale),
                chapters: book.chapter_count(),
                testament: book.testament(),
            })
            .collect()
    }

    pub fn get(&self, ordinal: u8) -> Option<&'static Book> {
        self.books.iter().find(|b| b.ordinal == ordinal)
    }

    pub fn find(&self, key: &str) -> Option<&'static Book> {
        self.books.iter().find(|b| b.key == key)
    }

    /// Resolve free text against keys and every locale's display name.
    ///
    /// Case, spaces and dots are ignored, so "1. Mose", "genesis" and "Song of Solomon"
    /// all resolve.
    pub fn find_by_name(&self, name: &str) -> Option<&'static Book> {
        let wanted = normalize(name);
        if wanted.is_empty() {
            return None;
        }
        self.books.iter().find(|b| {
            b.key == wanted || b.names.iter().any(|n| normalize(n) == wanted)
        })
    }

    pub fn display_name(&self, locale: Locale, key: &str) -> Option<&'static str> {
        self.find(key).map(|b| b.name(locale))
    }

    pub fn chapter_count(&self, book: &Book) -> u16 {
        book.chapter_count()
    }

    pub fn verse_count(&self, book: &'static Book, chapter: u16) -> Result<u16, CatalogError> {
        book.verse_count(chapter).ok_or(CatalogError::OutOfRange {
            book: book.key,
            chapter,
            chapter_count: book.chapter_count(),
        })
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .flat_map(char::to_lowercase)
        .collect()
}
