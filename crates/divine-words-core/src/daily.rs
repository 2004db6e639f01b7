//! Verse of the day: a reference chosen from a fixed rotation by calendar date

use crate::catalog::Catalog;
use crate::locale::Locale;
use crate::reference::CanonicalReference;
use chrono::{Datelike, Local, NaiveDate};

/// `(book key, chapter, first verse, last verse)`
const ROTATION: &[(&str, u16, u16, u16)] = &[
    ("john", 3, 16, 16),
    ("psalms", 23, 1, 3),
    ("proverbs", 3, 5, 6),
    ("isaiah", 40, 31, 31),
    ("jeremiah", 29, 11, 11),
    ("romans", 8, 28, 28),
    ("philippians", 4, 6, 7),
    ("matthew", 11, 28, 30),
    ("joshua", 1, 9, 9),
    ("psalms", 46, 1, 1),
    ("1corinthians", 13, 4, 7),
    ("lamentations", 3, 22, 23),
    ("2timothy", 1, 7, 7),
    ("hebrews", 11, 1, 1),
    ("micah", 6, 8, 8),
    ("galatians", 5, 22, 23),
    ("psalms", 119, 105, 105),
    ("matthew", 5, 14, 16),
    ("1john", 4, 18, 18),
    ("romans", 12, 2, 2),
    ("ephesians", 2, 8, 9),
    ("genesis", 1, 1, 1),
    ("john", 14, 27, 27),
    ("psalms", 139, 13, 14),
    ("revelation", 21, 4, 4),
];

/// Whether the app shows the verse of the day or lets the user pick a passage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Search,
    Daily,
}

impl Mode {
    pub fn toggled(&self) -> Self {
        match self {
            Mode::Search => Mode::Daily,
            Mode::Daily => Mode::Search,
        }
    }
}

/// Same date, same reference; consecutive dates step through the rotation
pub fn daily_reference(date: NaiveDate) -> CanonicalReference {
    let day = date.num_days_from_ce().rem_euclid(ROTATION.len() as i32) as usize;
    let (book, chapter, verse_start, verse_end) = ROTATION[day];
    CanonicalReference {
        book: book.to_string(),
        chapter,
        verse_start,
        verse_end,
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Localized caption such as "Johannes 3:16"
pub fn describe(reference: &CanonicalReference, locale: Locale) -> String {
    let name = Catalog::standard()
        .display_name(locale, &reference.book)
        .unwrap_or(reference.book.as_str());
    if reference.verse_start == reference.verse_end {
        format!("{} {}:{}", name, reference.chapter, reference.verse_start)
    } else {
        format!(
            "{} {}:{}-{}",
            name, reference.chapter, reference.verse_start, reference.verse_end
        )
    }
}
