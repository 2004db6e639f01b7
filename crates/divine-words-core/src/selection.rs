//! Cascading Book → Chapter → Verse selection
//!
//! The in-progress choice is a tagged state, so a verse without a chapter or a chapter
//! without a book cannot be represented. Every setter validates against the catalog and
//! either moves to the new state or returns an error with the old state untouched.

use crate::catalog::{Book, Catalog};
use crate::error::SelectionError;
use crate::locale::Locale;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// A single verse or a contiguous verse range within one chapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum VerseChoice {
    Single(u16),
    Range { start: u16, end: u16 },
}

impl VerseChoice {
    pub fn range(start: u16, end: u16) -> Self {
        VerseChoice::Range { start, end }
    }

    /// Inclusive `(start, end)`; a single verse has `start == end`
    pub fn bounds(&self) -> (u16, u16) {
        match *self {
            VerseChoice::Single(v) => (v, v),
            VerseChoice::Range { start, end } => (start, end),
        }
    }

    /// Parse an option value: `"16"` or `"1-3"`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.split_once('-') {
            Some((start, end)) => {
                let start = start.trim().parse().ok()?;
                let end = end.trim().parse().ok()?;
                Some(VerseChoice::Range { start, end })
            }
            None => s.parse().ok().map(VerseChoice::Single),
        }
    }
}

impl fmt::Display for VerseChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerseChoice::Single(v) => write!(f, "{}", v),
            VerseChoice::Range { start, end } => write!(f, "{}-{}", start, end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Empty,
    BookChosen {
        book: &'static Book,
    },
    ChapterChosen {
        book: &'static Book,
        chapter: u16,
    },
    Ready {
        book: &'static Book,
        chapter: u16,
        verse: VerseChoice,
    },
}

impl SelectionState {
    pub fn name(&self) -> &'static str {
        match self {
            SelectionState::Empty => "empty",
            SelectionState::BookChosen { .. } => "book-chosen",
            SelectionState::ChapterChosen { .. } => "chapter-chosen",
            SelectionState::Ready { .. } => "ready",
        }
    }
}

/// Which dependent controls may be edited, derived from the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub book: bool,
    pub chapter: bool,
    pub verse: bool,
    pub submit: bool,
}

/// One session's in-progress choice. Not shared between sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    locale: Locale,
    translation: &'static str,
    state: SelectionState,
}

impl Selection {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            translation: locale.default_translation().code,
            state: SelectionState::Empty,
        }
    }

    /// Start with a remembered translation, falling back to the locale default when the
    /// code does not belong to `locale`
    pub fn with_translation(locale: Locale, code: &str) -> Self {
        let translation = locale
            .translation(code)
            .unwrap_or_else(|| locale.default_translation())
            .code;
        Self {
            locale,
            translation,
            state: SelectionState::Empty,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn translation(&self) -> &'static str {
        self.translation
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn book(&self) -> Option<&'static Book> {
        match self.state {
            SelectionState::Empty => None,
            SelectionState::BookChosen { book }
            | SelectionState::ChapterChosen { book, .. }
            | SelectionState::Ready { book, .. } => Some(book),
        }
    }

    pub fn chapter(&self) -> Option<u16> {
        match self.state {
            SelectionState::ChapterChosen { chapter, .. } | SelectionState::Ready { chapter, .. } => {
                Some(chapter)
            }
            _ => None,
        }
    }

    pub fn verse(&self) -> Option<VerseChoice> {
        match self.state {
            SelectionState::Ready { verse, .. } => Some(verse),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, SelectionState::Ready { .. })
    }

    pub fn availability(&self) -> Availability {
        Availability {
            book: true,
            chapter: self.book().is_some(),
            verse: self.chapter().is_some(),
            submit: self.is_ready(),
        }
    }

    /// Switch locale. Book, chapter and verse are always cleared; the translation is kept
    /// only if the new locale offers it.
    pub fn set_locale(&mut self, locale: Locale) {
        if !locale.has_translation(self.translation) {
            self.translation = locale.default_translation().code;
        }
        self.locale = locale;
        self.state = SelectionState::Empty;
        debug!(locale = locale.as_str(), translation = self.translation, "locale changed");
    }

    pub fn set_translation(&mut self, code: &str) -> Result<(), SelectionError> {
        let translation =
            self.locale
                .translation(code)
                .ok_or_else(|| SelectionError::UnknownTranslation {
                    code: code.to_string(),
                    locale: self.locale.as_str(),
                })?;
        self.translation = translation.code;
        Ok(())
    }

    pub fn set_book(&mut self, book: &'static Book) {
        self.state = SelectionState::BookChosen { book };
        debug!(book = book.key(), "book chosen");
    }

    /// Resolve `name` through the catalog (key or any display name), then `set_book`
    pub fn set_book_by_name(&mut self, catalog: &Catalog, name: &str) -> Result<(), SelectionError> {
        let book = catalog
            .find_by_name(name)
            .ok_or_else(|| SelectionError::UnknownBook(name.to_string()))?;
        self.set_book(book);
        Ok(())
    }

    pub fn set_chapter(&mut self, chapter: u16) -> Result<(), SelectionError> {
        let book = self.book().ok_or(SelectionError::BookNotChosen)?;
        let chapter_count = book.chapter_count();
        if chapter == 0 || chapter > chapter_count {
            return Err(SelectionError::InvalidChapter {
                book: book.key(),
                chapter,
                chapter_count,
            });
        }
        self.state = SelectionState::ChapterChosen { book, chapter };
        debug!(book = book.key(), chapter, "chapter chosen");
        Ok(())
    }

    pub fn set_verse(&mut self, verse: VerseChoice) -> Result<(), SelectionError> {
        let (book, chapter) = match self.state {
            SelectionState::ChapterChosen { book, chapter } | SelectionState::Ready { book, chapter, .. } => {
                (book, chapter)
            }
            _ => return Err(SelectionError::ChapterNotChosen),
        };
        let verse_count = book.verse_count(chapter).unwrap_or(0);
        let (start, end) = verse.bounds();
        if start == 0 || end > verse_count || start > end {
            return Err(SelectionError::InvalidVerse {
                book: book.key(),
                chapter,
                verse: verse.to_string(),
                verse_count,
            });
        }
        self.state = SelectionState::Ready { book, chapter, verse };
        debug!(book = book.key(), chapter, %verse, "verse chosen");
        Ok(())
    }

    /// Back to `Empty`; locale and translation are preserved
    pub fn reset(&mut self) {
        self.state = SelectionState::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn john() -> &'static Book {
        Catalog::standard().find("john").unwrap()
    }

    fn ready_selection() -> Selection {
        let mut selection = Selection::new(Locale::De);
        selection.set_book(john());
        selection.set_chapter(3).unwrap();
        selection.set_verse(VerseChoice::Single(16)).unwrap();
        selection
    }

    #[test]
    fn test_new_selection_is_empty_with_default_translation() {
        let selection = Selection::new(Locale::En);
        assert_eq!(selection.state(), SelectionState::Empty);
        assert_eq!(selection.translation(), "web");
        assert_eq!(
            selection.availability(),
            Availability { book: true, chapter: false, verse: false, submit: false }
        );
    }

    #[test]
    fn test_set_chapter_without_book_fails() {
        let mut selection = Selection::new(Locale::De);
        assert_eq!(selection.set_chapter(1), Err(SelectionError::BookNotChosen));
        assert_eq!(selection.state(), SelectionState::Empty);
    }

    #[test]
    fn test_set_verse_without_chapter_fails() {
        let mut selection = Selection::new(Locale::De);
        selection.set_book(john());
        assert_eq!(
            selection.set_verse(VerseChoice::Single(1)),
            Err(SelectionError::ChapterNotChosen)
        );
        assert_eq!(selection.state(), SelectionState::BookChosen { book: john() });
    }

    #[test]
    fn test_invalid_chapter_keeps_book() {
        let mut selection = Selection::new(Locale::De);
        selection.set_book(john());
        let err = selection.set_chapter(999).unwrap_err();
        assert_eq!(
            err,
            SelectionError::InvalidChapter { book: "john", chapter: 999, chapter_count: 21 }
        );
        assert_eq!(selection.book(), Some(john()));
        assert_eq!(selection.chapter(), None);
    }

    #[test]
    fn test_invalid_verse_keeps_prior_fields() {
        let mut selection = ready_selection();
        assert!(selection.set_verse(VerseChoice::Single(37)).is_err());
        assert!(selection.set_verse(VerseChoice::Single(0)).is_err());
        assert!(selection.set_verse(VerseChoice::range(5, 2)).is_err());
        assert!(selection.set_verse(VerseChoice::range(30, 40)).is_err());
        assert_eq!(selection.verse(), Some(VerseChoice::Single(16)));
        assert_eq!(selection.chapter(), Some(3));
    }

    #[test]
    fn test_set_book_clears_later_fields() {
        let mut selection = ready_selection();
        let genesis = Catalog::standard().find("genesis").unwrap();
        selection.set_book(genesis);
        assert_eq!(selection.state(), SelectionState::BookChosen { book: genesis });
    }

    #[test]
    fn test_set_chapter_clears_verse_only() {
        let mut selection = ready_selection();
        selection.set_chapter(4).unwrap();
        assert_eq!(selection.book(), Some(john()));
        assert_eq!(selection.chapter(), Some(4));
        assert_eq!(selection.verse(), None);
    }

    #[test]
    fn test_set_locale_clears_and_remaps_translation() {
        let mut selection = ready_selection();
        selection.set_translation("luther1912").unwrap();
        selection.set_locale(Locale::En);
        assert_eq!(selection.state(), SelectionState::Empty);
        assert_eq!(selection.translation(), "web");
    }

    #[test]
    fn test_set_locale_keeps_valid_translation() {
        let mut selection = Selection::new(Locale::En);
        selection.set_translation("kjv").unwrap();
        selection.set_book(john());
        selection.set_locale(Locale::En);
        assert_eq!(selection.translation(), "kjv");
        assert_eq!(selection.book(), None);
    }

    #[test]
    fn test_set_translation_rejects_other_locale() {
        let mut selection = Selection::new(Locale::De);
        let err = selection.set_translation("kjv").unwrap_err();
        assert_eq!(
            err,
            SelectionError::UnknownTranslation { code: "kjv".to_string(), locale: "de" }
        );
        assert_eq!(selection.translation(), "elberfelder");
    }

    #[test]
    fn test_with_translation_falls_back() {
        assert_eq!(Selection::with_translation(Locale::De, "web").translation(), "elberfelder");
        assert_eq!(Selection::with_translation(Locale::De, "schlachter").translation(), "schlachter");
    }

    #[test]
    fn test_reset_preserves_locale_and_translation() {
        let mut selection = ready_selection();
        selection.set_translation("schlachter").unwrap();
        selection.reset();
        assert_eq!(selection.state(), SelectionState::Empty);
        assert_eq!(selection.locale(), Locale::De);
        assert_eq!(selection.translation(), "schlachter");
    }

    #[test]
    fn test_set_book_by_name() {
        let mut selection = Selection::new(Locale::De);
        selection.set_book_by_name(Catalog::standard(), "Johannes").unwrap();
        assert_eq!(selection.book(), Some(john()));
        assert_eq!(
            selection.set_book_by_name(Catalog::standard(), "Nowhere"),
            Err(SelectionError::UnknownBook("Nowhere".to_string()))
        );
        assert_eq!(selection.book(), Some(john()));
    }

    #[test]
    fn test_verse_choice_parse_and_display() {
        assert_eq!(VerseChoice::parse("16"), Some(VerseChoice::Single(16)));
        assert_eq!(VerseChoice::parse(" 1-3 "), Some(VerseChoice::range(1, 3)));
        assert_eq!(VerseChoice::parse("a-3"), None);
        assert_eq!(VerseChoice::parse(""), None);
        assert_eq!(VerseChoice::range(4, 6).to_string(), "4-6");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Book(u8),
        Chapter(u16),
        Verse(u16, u16),
        Locale(bool),
        Reset,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u8..=66).prop_map(Op::Book),
            (0u16..160).prop_map(Op::Chapter),
            (0u16..190, 0u16..190).prop_map(|(a, b)| Op::Verse(a, b)),
            any::<bool>().prop_map(Op::Locale),
            Just(Op::Reset),
        ]
    }

    proptest! {
        #[test]
        fn test_no_sequence_reaches_invalid_ready(ops in proptest::collection::vec(op(), 1..40)) {
            let catalog = Catalog::standard();
            let mut selection = Selection::new(Locale::De);
            for op in ops {
                let before = selection.clone();
                let result = match op {
                    Op::Book(n) => {
                        selection.set_book(catalog.get(n).unwrap());
                        Ok(())
                    }
                    Op::Chapter(c) => selection.set_chapter(c),
                    Op::Verse(a, b) if a == b => selection.set_verse(VerseChoice::Single(a)),
                    Op::Verse(a, b) => selection.set_verse(VerseChoice::range(a, b)),
                    Op::Locale(en) => {
                        selection.set_locale(if en { Locale::En } else { Locale::De });
                        Ok(())
                    }
                    Op::Reset => {
                        selection.reset();
                        Ok(())
                    }
                };
                if result.is_err() {
                    prop_assert_eq!(&selection, &before);
                }
                if let SelectionState::Ready { book, chapter, verse } = selection.state() {
                    let count = catalog.verse_count(book, chapter).unwrap();
                    let (start, end) = verse.bounds();
                    prop_assert!(start >= 1 && start <= end && end <= count);
                }
            }
        }

        #[test]
        fn test_setter_never_clears_earlier_fields(chapter in 1u16..=21, verse in 1u16..=25) {
            let john = Catalog::standard().find("john").unwrap();
            let mut selection = Selection::new(Locale::En);
            selection.set_book(john);
            selection.set_chapter(chapter).unwrap();
            prop_assert_eq!(selection.book(), Some(john));
            selection.set_verse(VerseChoice::Single(verse)).unwrap();
            prop_assert_eq!(selection.book(), Some(john));
            prop_assert_eq!(selection.chapter(), Some(chapter));
        }
    }
}
