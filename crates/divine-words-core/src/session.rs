//! Per-client session: one selection plus a handle to the gateway
//!
//! A `Session` is owned by exactly one client and mutated only by that client's input.
//! Lookups can run detached from the session (`PendingLookup::run`); when the result
//! comes back it is only applied if the selection still resolves to the same reference.

use crate::catalog::{Book, Catalog};
use crate::daily::{daily_reference, Mode};
use crate::error::{FetchError, SelectionError, SubmitError};
use crate::gateway::{Passage, ProxyGateway};
use crate::locale::Locale;
use crate::options::{build_options, VerseOptions};
use crate::reference::{canonicalize, CanonicalReference, ReferenceQuery};
use crate::selection::{Selection, VerseChoice};
use chrono::NaiveDate;
use tracing::{debug, info};

/// An in-flight lookup, remembering what it was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLookup {
    pub reference: CanonicalReference,
    pub translation: &'static str,
}

impl PendingLookup {
    pub async fn run(self, gateway: ProxyGateway) -> (PendingLookup, Result<Passage, FetchError>) {
        let result = gateway.fetch_passage(&self.reference, self.translation).await;
        (self, result)
    }
}

/// What happened to a lookup result handed back to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Result matched the current selection; the selection has been reset
    Passage(Passage),
    /// Result matched the current selection but the lookup failed; selection kept
    Failed(FetchError),
    /// Selection changed while the lookup was in flight; result dropped
    Stale,
}

pub struct Session {
    catalog: &'static Catalog,
    selection: Selection,
    gateway: ProxyGateway,
    range_span: u16,
    mode: Mode,
    // Daily lookup currently expected, if any
    daily: Option<PendingLookup>,
}

impl Session {
    pub fn new(selection: Selection, gateway: ProxyGateway, range_span: u16) -> Self {
        Self {
            catalog: Catalog::standard(),
            selection,
            gateway,
            range_span,
            mode: Mode::default(),
            daily: None,
        }
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn gateway(&self) -> &ProxyGateway {
        &self.gateway
    }

    pub fn range_span(&self) -> u16 {
        self.range_span
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch between daily verse and search. Any actual change discards the selection.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        debug!(from = ?self.mode, to = ?mode, "switching mode");
        self.mode = mode;
        self.daily = None;
        self.selection.reset();
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.selection.set_locale(locale);
        self.daily = None;
    }

    pub fn set_translation(&mut self, code: &str) -> Result<(), SelectionError> {
        self.selection.set_translation(code)?;
        self.daily = None;
        Ok(())
    }

    /// Picking a book always means search mode
    pub fn set_book(&mut self, book: &'static Book) {
        self.set_mode(Mode::Search);
        self.selection.set_book(book);
    }

    pub fn set_chapter(&mut self, chapter: u16) -> Result<(), SelectionError> {
        self.selection.set_chapter(chapter)
    }

    pub fn set_verse(&mut self, verse: VerseChoice) -> Result<(), SelectionError> {
        self.selection.set_verse(verse)
    }

    pub fn reset(&mut self) {
        self.selection.reset();
    }

    /// Options for the current chapter, or `None` until a chapter is chosen
    pub fn verse_options(&self) -> Option<VerseOptions> {
        let book = self.selection.book()?;
        let chapter = self.selection.chapter()?;
        build_options(book, chapter, self.range_span).ok()
    }

    /// Drive the selection from typed input, e.g. `Johannes 3:16-18`.
    ///
    /// Goes through the same transitions a user would, so any failure leaves the
    /// selection at the last valid step.
    pub fn apply_query(&mut self, query: &ReferenceQuery) -> Result<(), SelectionError> {
        self.set_mode(Mode::Search);
        self.selection.set_book_by_name(self.catalog, &query.book)?;
        self.selection.set_chapter(query.chapter)?;
        self.selection.set_verse(query.verse)
    }

    /// Canonicalize the current selection without touching the network
    pub fn begin_submit(&self) -> Result<PendingLookup, SelectionError> {
        let reference = canonicalize(&self.selection)?;
        Ok(PendingLookup {
            reference,
            translation: self.selection.translation(),
        })
    }

    /// Start the verse of the day for `date` in the current translation; switches to
    /// daily mode if needed
    pub fn begin_daily(&mut self, date: NaiveDate) -> PendingLookup {
        self.set_mode(Mode::Daily);
        let pending = PendingLookup {
            reference: daily_reference(date),
            translation: self.selection.translation(),
        };
        self.daily = Some(pending.clone());
        pending
    }

    /// Fetch the verse of the day for `date`
    pub async fn daily(&mut self, date: NaiveDate) -> Result<Passage, FetchError> {
        let pending = self.begin_daily(date);
        let (_, result) = pending.run(self.gateway.clone()).await;
        result
    }

    /// What a result must match to be applied in the current mode
    fn expected(&self) -> Option<PendingLookup> {
        match self.mode {
            Mode::Search => self.begin_submit().ok(),
            Mode::Daily => self.daily.clone(),
        }
    }

    /// Hand a finished lookup back. Results for a reference the selection no longer
    /// resolves to are discarded.
    pub fn accept(&mut self, pending: &PendingLookup, result: Result<Passage, FetchError>) -> Delivery {
        match self.expected() {
            Some(current) if current == *pending => {}
            _ => {
                debug!(reference = %pending.reference, "discarding stale lookup result");
                return Delivery::Stale;
            }
        }
        match result {
            Ok(passage) => {
                info!(reference = %pending.reference, translation = pending.translation, "passage delivered");
                if self.mode == Mode::Search {
                    self.selection.reset();
                }
                Delivery::Passage(passage)
            }
            Err(e) => Delivery::Failed(e),
        }
    }

    /// Canonicalize, fetch, and reset on success. Fails fast without a network call
    /// when the selection is incomplete.
    pub async fn submit(&mut self) -> Result<Passage, SubmitError> {
        let pending = self.begin_submit()?;
        let (pending, result) = pending.run(self.gateway.clone()).await;
        match self.accept(&pending, result) {
            Delivery::Passage(passage) => Ok(passage),
            Delivery::Failed(e) => Err(e.into()),
            // The session was borrowed mutably for the whole call
            Delivery::Stale => Err(SelectionError::IncompleteSelection.into()),
        }
    }
}
