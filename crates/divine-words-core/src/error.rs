use std::time::Duration;
use thiserror::Error;

/// Lookup failures against the static book catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("chapter {chapter} is out of range for {book} (1-{chapter_count})")]
    OutOfRange {
        book: &'static str,
        chapter: u16,
        chapter_count: u16,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported locale: {0}")]
pub struct UnsupportedLocale(pub String);

/// Local validation failures raised by the selection state machine.
///
/// These never reach the network and never modify the selection they were raised on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unknown book: {0}")]
    UnknownBook(String),
    #[error("translation {code} is not available for locale {locale}")]
    UnknownTranslation { code: String, locale: &'static str },
    #[error("choose a book before choosing a chapter")]
    BookNotChosen,
    #[error("choose a chapter before choosing a verse")]
    ChapterNotChosen,
    #[error("{book} has no chapter {chapter} (1-{chapter_count})")]
    InvalidChapter {
        book: &'static str,
        chapter: u16,
        chapter_count: u16,
    },
    #[error("{book} {chapter} has no verse {verse} (1-{verse_count})")]
    InvalidVerse {
        book: &'static str,
        chapter: u16,
        verse: String,
        verse_count: u16,
    },
    #[error("selection is incomplete: book, chapter and verse are required")]
    IncompleteSelection,
}

/// Classified outcome of a failed upstream passage request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),
    #[error("upstream rejected the request ({status}): {message}")]
    UpstreamRejected { status: u16, message: String },
    #[error("network failure: {0}")]
    NetworkFailure(String),
}

impl FetchError {
    /// True when the provider answered and refused the reference,
    /// as opposed to being unreachable
    pub fn is_rejection(&self) -> bool {
        matches!(self, FetchError::UpstreamRejected { .. })
    }
}

/// Everything that can go wrong in `Session::submit`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
