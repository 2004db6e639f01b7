use divine_words_core::{
    daily, Availability, BookEntry, Config, Delivery, FetchError, Labels, Locale, Mode, OptionItem,
    Passage, PendingLookup, ReferenceQuery, Session,
};
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Book,
    Chapter,
    Verse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    pub should_quit: bool,
    pub focus: Column,
    pub input_mode: InputMode,
    pub search_input: String,
    pub session: Session,

    // Cursor per column; committing a cursor position is what changes the selection
    pub book_state: ListState,
    pub chapter_state: ListState,
    pub verse_state: ListState,

    // Cached option lists for the current locale and chapter
    pub cached_books: Vec<BookEntry>,
    pub cached_options: Vec<OptionItem>,

    // Result pane
    pub passage: Option<Passage>,
    pub error: Option<String>,
    pub passage_scroll: u16,
    pub pending: Option<PendingLookup>,
    lookup_task: Option<JoinHandle<()>>,

    // Animation state
    pub animation_frame: u8,

    /// Persist locale and translation changes to the config file
    pub remember_choices: bool,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(session: Session, events: UnboundedSender<AppEvent>) -> Self {
        let cached_books = session.catalog().list_books(session.selection().locale());

        let mut book_state = ListState::default();
        book_state.select(Some(0));

        Self {
            should_quit: false,
            focus: Column::Book,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            session,

            book_state,
            chapter_state: ListState::default(),
            verse_state: ListState::default(),

            cached_books,
            cached_options: Vec::new(),

            passage: None,
            error: None,
            passage_scroll: 0,
            pending: None,
            lookup_task: None,

            animation_frame: 0,

            remember_choices: true,
            events,
        }
    }

    pub fn locale(&self) -> Locale {
        self.session.selection().locale()
    }

    pub fn labels(&self) -> &'static Labels {
        self.locale().labels()
    }

    pub fn mode(&self) -> Mode {
        self.session.mode()
    }

    pub fn availability(&self) -> Availability {
        self.session.selection().availability()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Chapters offered for the chosen book, empty until a book is chosen
    pub fn chapters(&self) -> Vec<u16> {
        self.session
            .selection()
            .book()
            .map(|b| (1..=b.chapter_count()).collect())
            .unwrap_or_default()
    }

    fn column_len(&self, column: Column) -> usize {
        match column {
            Column::Book => self.cached_books.len(),
            Column::Chapter => self.chapters().len(),
            Column::Verse => self.cached_options.len(),
        }
    }

    fn column_state(&mut self, column: Column) -> &mut ListState {
        match column {
            Column::Book => &mut self.book_state,
            Column::Chapter => &mut self.chapter_state,
            Column::Verse => &mut self.verse_state,
        }
    }

    // Cursor movement within the focused column
    pub fn nav_down(&mut self) {
        let len = self.column_len(self.focus);
        if len > 0 {
            let state = self.column_state(self.focus);
            let i = state.selected().unwrap_or(0);
            state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn nav_up(&mut self) {
        let state = self.column_state(self.focus);
        let i = state.selected().unwrap_or(0);
        state.select(Some(i.saturating_sub(1)));
    }

    pub fn nav_first(&mut self) {
        if self.column_len(self.focus) > 0 {
            self.column_state(self.focus).select(Some(0));
        }
    }

    pub fn nav_last(&mut self) {
        let len = self.column_len(self.focus);
        if len > 0 {
            self.column_state(self.focus).select(Some(len - 1));
        }
    }

    /// Move focus right, but only into a column whose prerequisite is set
    pub fn focus_next(&mut self) {
        let availability = self.availability();
        self.focus = match self.focus {
            Column::Book if availability.chapter => Column::Chapter,
            Column::Chapter if availability.verse => Column::Verse,
            other => other,
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus = match self.focus {
            Column::Book | Column::Chapter => Column::Book,
            Column::Verse => Column::Chapter,
        };
    }

    /// Commit the cursor in the focused column to the selection
    pub fn commit(&mut self) {
        self.error = None;
        match self.focus {
            Column::Book => {
                let Some(book) = self
                    .book_state
                    .selected()
                    .and_then(|i| self.cached_books.get(i))
                    .and_then(|entry| self.session.catalog().find(entry.key))
                else {
                    return;
                };
                if self.mode() == Mode::Daily {
                    self.cancel_lookup();
                }
                self.session.set_book(book);
                self.cached_options.clear();
                self.chapter_state.select(Some(0));
                self.verse_state.select(None);
                self.focus = Column::Chapter;
            }
            Column::Chapter => {
                let Some(chapter) = self
                    .chapter_state
                    .selected()
                    .and_then(|i| self.chapters().get(i).copied())
                else {
                    return;
                };
                match self.session.set_chapter(chapter) {
                    Ok(()) => {
                        self.refresh_options();
                        self.verse_state.select(Some(0));
                        self.focus = Column::Verse;
                    }
                    Err(e) => self.error = Some(e.to_string()),
                }
            }
            Column::Verse => {
                let Some(choice) = self
                    .verse_state
                    .selected()
                    .and_then(|i| self.cached_options.get(i))
                    .map(|item| item.choice)
                else {
                    return;
                };
                match self.session.set_verse(choice) {
                    Ok(()) => self.submit(),
                    Err(e) => self.error = Some(e.to_string()),
                }
            }
        }
    }

    fn refresh_options(&mut self) {
        let locale = self.locale();
        self.cached_options = self
            .session
            .verse_options()
            .map(|options| options.items(locale))
            .unwrap_or_default();
    }

    /// Start a lookup for the current selection
    pub fn submit(&mut self) {
        let pending = match self.session.begin_submit() {
            Ok(pending) => pending,
            Err(e) => {
                self.error = Some(e.to_string());
                return;
            }
        };

        self.start_lookup(pending);
    }

    /// Fetch the verse of the day; leaves search mode and discards the selection
    pub fn show_daily(&mut self) {
        let pending = self.session.begin_daily(daily::today());
        self.error = None;
        self.after_reset();
        self.start_lookup(pending);
    }

    /// Flip between verse of the day and search
    pub fn toggle_mode(&mut self) {
        match self.mode().toggled() {
            Mode::Daily => self.show_daily(),
            Mode::Search => {
                self.session.set_mode(Mode::Search);
                self.cancel_lookup();
                self.error = None;
                self.after_reset();
            }
        }
    }

    fn cancel_lookup(&mut self) {
        if let Some(task) = self.lookup_task.take() {
            task.abort();
        }
        self.pending = None;
    }

    /// Run `pending` on a background task; a lookup still in flight is abandoned
    fn start_lookup(&mut self, pending: PendingLookup) {
        self.cancel_lookup();

        let gateway = self.session.gateway().clone();
        let events = self.events.clone();
        let lookup = pending.clone();
        self.lookup_task = Some(tokio::spawn(async move {
            let (pending, result) = lookup.run(gateway).await;
            let _ = events.send(AppEvent::Lookup(pending, result));
        }));

        debug!(reference = %pending.reference, "lookup started");
        self.pending = Some(pending);
        self.animation_frame = 0;
    }

    pub fn on_lookup(&mut self, pending: PendingLookup, result: Result<Passage, FetchError>) {
        if self.pending.as_ref() == Some(&pending) {
            self.pending = None;
            self.lookup_task = None;
        }

        match self.session.accept(&pending, result) {
            Delivery::Passage(passage) => {
                self.passage = Some(passage);
                self.error = None;
                self.passage_scroll = 0;
                self.after_reset();
            }
            Delivery::Failed(e) => {
                warn!(reference = %pending.reference, error = %e, "lookup failed");
                self.error = Some(describe_fetch_error(&e, self.labels()));
            }
            Delivery::Stale => {}
        }
    }

    /// Selection went back to empty: collapse dependent columns and return to books
    fn after_reset(&mut self) {
        self.cached_options.clear();
        self.chapter_state.select(None);
        self.verse_state.select(None);
        self.focus = Column::Book;
    }

    /// Resolve typed input like `Johannes 3:16` and look it up
    pub fn submit_search(&mut self) {
        let input = std::mem::take(&mut self.search_input);
        self.input_mode = InputMode::Normal;
        if input.trim().is_empty() {
            return;
        }

        let Some(query) = ReferenceQuery::parse(&input) else {
            self.error = Some(format!("{}: {}", self.labels().not_found, input.trim()));
            return;
        };
        let applied = self.session.apply_query(&query);
        self.sync_cursors();
        match applied {
            Ok(()) => self.submit(),
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Point each column's cursor at what the selection holds
    fn sync_cursors(&mut self) {
        let selection = self.session.selection();
        let book = selection.book();
        let chapter = selection.chapter();
        let verse = selection.verse();

        if let Some(book) = book {
            self.book_state.select(Some(book.ordinal() as usize - 1));
            self.focus = Column::Chapter;
        }
        self.chapter_state.select(chapter.map(|c| c as usize - 1).or(book.map(|_| 0)));
        if chapter.is_some() {
            self.refresh_options();
            self.focus = Column::Verse;
        } else {
            self.cached_options.clear();
        }
        let verse_idx = verse.and_then(|v| self.cached_options.iter().position(|o| o.choice == v));
        self.verse_state.select(verse_idx.or(chapter.map(|_| 0)));
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.error = None;
        self.after_reset();
    }

    pub fn toggle_locale(&mut self) {
        let locale = self.locale().toggled();
        self.session.set_locale(locale);
        self.cached_books = self.session.catalog().list_books(locale);
        self.book_state.select(Some(0));
        self.error = None;
        self.after_reset();
        self.remember_choice();
        if self.mode() == Mode::Daily {
            self.show_daily();
        }
    }

    /// Cycle through the current locale's translations
    pub fn next_translation(&mut self) {
        let translations = self.locale().translations();
        let current = self.session.selection().translation();
        let idx = translations.iter().position(|t| t.code == current).unwrap_or(0);
        let next = translations[(idx + 1) % translations.len()].code;
        if let Err(e) = self.session.set_translation(next) {
            self.error = Some(e.to_string());
            return;
        }
        self.remember_choice();
        if self.mode() == Mode::Daily {
            self.show_daily();
        }
    }

    fn remember_choice(&self) {
        if !self.remember_choices {
            return;
        }
        let selection = self.session.selection();
        if let Err(e) = Config::save_choice(selection.locale(), selection.translation()) {
            warn!(error = %e, "could not save locale choice");
        }
    }

    pub fn scroll_down(&mut self) {
        self.passage_scroll = self.passage_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.passage_scroll = self.passage_scroll.saturating_sub(1);
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}

/// User-facing text distinguishing "cannot resolve" from "service unreachable"
pub fn describe_fetch_error(error: &FetchError, labels: &Labels) -> String {
    match error {
        FetchError::Timeout(_) => labels.timeout.to_string(),
        FetchError::UpstreamRejected { status, message } => {
            format!("{} ({}): {}", labels.not_found, status, message)
        }
        FetchError::NetworkFailure(_) => labels.unreachable.to_string(),
    }
}
