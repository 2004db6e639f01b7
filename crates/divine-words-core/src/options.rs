//! Verse and verse-range options for a chosen chapter

use crate::catalog::Book;
use crate::error::CatalogError;
use crate::locale::Locale;
use crate::selection::VerseChoice;
use serde::Serialize;

pub const DEFAULT_RANGE_SPAN: u16 = 3;

/// A contiguous window of verses offered as a secondary option group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeOption {
    pub start: u16,
    pub end: u16,
}

impl RangeOption {
    pub fn choice(&self) -> VerseChoice {
        VerseChoice::range(self.start, self.end)
    }

    /// Option value, independent of locale
    pub fn value(&self) -> String {
        self.choice().to_string()
    }

    pub fn label(&self, locale: Locale) -> String {
        locale.labels().range_caption(self.start, self.end)
    }
}

/// Everything selectable once a chapter is chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerseOptions {
    pub book: &'static str,
    pub chapter: u16,
    pub verses: Vec<u16>,
    pub ranges: Vec<RangeOption>,
}

/// Build the option lists for `(book, chapter)`.
///
/// Ranges are consecutive windows of `span` verses starting at verse 1, the last one
/// clipped to the chapter's final verse. A window that would hold a single verse is left
/// out since that verse is already offered individually; a span below 2 yields no ranges.
pub fn build_options(book: &'static Book, chapter: u16, span: u16) -> Result<VerseOptions, CatalogError> {
    let verse_count = book.verse_count(chapter).ok_or(CatalogError::OutOfRange {
        book: book.key(),
        chapter,
        chapter_count: book.chapter_count(),
    })?;

    let verses = (1..=verse_count).collect();

    let mut ranges = Vec::new();
    if span >= 2 {
        let span = u32::from(span);
        let last = u32::from(verse_count);
        let mut start = 1u32;
        while start <= last {
            let end = (start + span - 1).min(last);
            if end > start {
                ranges.push(RangeOption {
                    start: start as u16,
                    end: end as u16,
                });
            }
            start += span;
        }
    }

    Ok(VerseOptions {
        book: book.key(),
        chapter,
        verses,
        ranges,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionGroup {
    Verse,
    Range,
}

/// One entry as a front end renders it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionItem {
    pub value: String,
    pub label: String,
    pub group: OptionGroup,
    #[serde(skip)]
    pub choice: VerseChoice,
}

impl VerseOptions {
    /// Individual verses followed by ranges, labelled for `locale`.
    ///
    /// Labels are the only locale-dependent part; `value` and `choice` are identical
    /// across locales.
    pub fn items(&self, locale: Locale) -> Vec<OptionItem> {
        let verses = self.verses.iter().map(|&v| OptionItem {
            value: v.to_string(),
            label: v.to_string(),
            group: OptionGroup::Verse,
            choice: VerseChoice::Single(v),
        });
        let ranges = self.ranges.iter().map(|r| OptionItem {
            value: r.value(),
            label: r.label(locale),
            group: OptionGroup::Range,
            choice: r.choice(),
        });
        verses.chain(ranges).collect()
    }

    pub fn last_verse(&self) -> u16 {
        self.verses.last().copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn book(key: &str) -> &'static Book {
        Catalog::standard().find(key).unwrap()
    }

    #[test]
    fn test_john_3_options() {
        let options = build_options(book("john"), 3, 3).unwrap();
        assert_eq!(options.verses.len(), 36);
        assert_eq!(options.verses.first(), Some(&1));
        assert_eq!(options.last_verse(), 36);
        assert_eq!(options.ranges.len(), 12);
        assert_eq!(options.ranges[0], RangeOption { start: 1, end: 3 });
        assert_eq!(options.ranges[11], RangeOption { start: 34, end: 36 });
    }

    #[test]
    fn test_last_window_is_clipped() {
        // John 2 has 25 verses: windows of 5 end exactly, windows of 3 leave 25 alone
        let by_five = build_options(book("john"), 2, 5).unwrap();
        assert_eq!(by_five.ranges.last(), Some(&RangeOption { start: 21, end: 25 }));

        let by_three = build_options(book("john"), 2, 3).unwrap();
        assert_eq!(by_three.ranges.last(), Some(&RangeOption { start: 22, end: 24 }));

        // Genesis 1 has 31 verses
        let by_ten = build_options(book("genesis"), 1, 10).unwrap();
        assert_eq!(
            by_ten.ranges,
            vec![
                RangeOption { start: 1, end: 10 },
                RangeOption { start: 11, end: 20 },
                RangeOption { start: 21, end: 30 },
            ]
        );
    }

    #[test]
    fn test_span_larger_than_chapter() {
        // Psalm 117 has 2 verses
        let options = build_options(book("psalms"), 117, 10).unwrap();
        assert_eq!(options.verses, vec![1, 2]);
        assert_eq!(options.ranges, vec![RangeOption { start: 1, end: 2 }]);
    }

    #[test]
    fn test_small_span_has_no_ranges() {
        assert!(build_options(book("john"), 3, 1).unwrap().ranges.is_empty());
        assert!(build_options(book("john"), 3, 0).unwrap().ranges.is_empty());
    }

    #[test]
    fn test_out_of_range_chapter() {
        assert!(build_options(book("jude"), 2, 3).is_err());
        assert!(build_options(book("jude"), 0, 3).is_err());
    }

    #[test]
    fn test_builder_is_deterministic() {
        for b in Catalog::standard().books() {
            for chapter in 1..=b.chapter_count() {
                let first = build_options(b, chapter, DEFAULT_RANGE_SPAN).unwrap();
                let second = build_options(b, chapter, DEFAULT_RANGE_SPAN).unwrap();
                assert_eq!(first, second);
                let count = b.verse_count(chapter).unwrap();
                if let Some(last) = first.ranges.last() {
                    assert!(last.end <= count);
                }
            }
        }
    }

    #[test]
    fn test_labels_do_not_change_identity() {
        let options = build_options(book("john"), 3, 3).unwrap();
        let de = options.items(Locale::De);
        let en = options.items(Locale::En);
        assert_eq!(de.len(), 36 + 12);
        for (a, b) in de.iter().zip(en.iter()) {
            assert_eq!(a.value, b.value);
            assert_eq!(a.choice, b.choice);
        }
        assert_eq!(de[36].label, "Verse 1-3");
        assert_eq!(en[36].label, "Verses 1-3");
        assert_eq!(de[36].value, "1-3");
        assert_eq!(de[36].group, OptionGroup::Range);
    }
}
