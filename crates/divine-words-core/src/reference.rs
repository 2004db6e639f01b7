use crate::selection::{Selection, SelectionState, VerseChoice};
use crate::error::SelectionError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Locale-independent identifier of a passage.
///
/// `verse_start == verse_end` for a single verse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CanonicalReference {
    pub book: String,
    pub chapter: u16,
    pub verse_start: u16,
    pub verse_end: u16,
}

impl CanonicalReference {
    /// Path segment understood by the upstream provider: `john+3:16` or `john+3:1-3`
    pub fn to_path(&self) -> String {
        if self.verse_start == self.verse_end {
            format!("{}+{}:{}", self.book, self.chapter, self.verse_start)
        } else {
            format!(
                "{}+{}:{}-{}",
                self.book, self.chapter, self.verse_start, self.verse_end
            )
        }
    }

    pub fn verse(&self) -> VerseChoice {
        if self.verse_start == self.verse_end {
            VerseChoice::Single(self.verse_start)
        } else {
            VerseChoice::range(self.verse_start, self.verse_end)
        }
    }
}

impl fmt::Display for CanonicalReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

/// Derive the canonical reference for a `Ready` selection.
///
/// Only the book key is used, so the result is identical whatever locale the
/// selection was made in.
pub fn canonicalize(selection: &Selection) -> Result<CanonicalReference, SelectionError> {
    match selection.state() {
        SelectionState::Ready { book, chapter, verse } => {
            let (verse_start, verse_end) = verse.bounds();
            Ok(CanonicalReference {
                book: book.key().to_string(),
                chapter,
                verse_start,
                verse_end,
            })
        }
        _ => Err(SelectionError::IncompleteSelection),
    }
}

/// A reference typed by a user, before the book is resolved against the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceQuery {
    pub book: String,
    pub chapter: u16,
    pub verse: VerseChoice,
}

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(?P<book>.+?)[\s+]+(?P<chapter>\d+):(?P<start>\d+)(?:\s*-\s*(?P<end>\d+))?\s*$")
            .expect("reference pattern is valid")
    })
}

impl ReferenceQuery {
    /// Parse `john+3:16`, `John 3:16-18` or `1. Mose 1:1`
    pub fn parse(input: &str) -> Option<Self> {
        let caps = reference_pattern().captures(input)?;
        let book = caps.name("book")?.as_str().trim().to_string();
        let chapter = caps.name("chapter")?.as_str().parse().ok()?;
        let start = caps.name("start")?.as_str().parse().ok()?;
        let verse = match caps.name("end") {
            Some(end) => VerseChoice::range(start, end.as_str().parse().ok()?),
            None => VerseChoice::Single(start),
        };
        Some(Self { book, chapter, verse })
    }
}
