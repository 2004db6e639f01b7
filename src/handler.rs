use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::app::{App, Column, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Lookup(pending, result) => app.on_lookup(pending, result),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Char('g') | KeyCode::Home => app.nav_first(),
        KeyCode::Char('G') | KeyCode::End => app.nav_last(),

        // Commit the cursor; on the verse column this submits
        KeyCode::Enter => app.commit(),

        KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => app.focus_next(),
        KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => app.focus_prev(),

        // Passage pane
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..10 {
                app.scroll_down();
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..10 {
                app.scroll_up();
            }
        }
        KeyCode::PageDown => app.scroll_down(),
        KeyCode::PageUp => app.scroll_up(),

        KeyCode::Char('/') => {
            app.search_input.clear();
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('D') => app.toggle_mode(),
        KeyCode::Char('L') => app.toggle_locale(),
        KeyCode::Char('t') => app.next_translation(),
        KeyCode::Esc => {
            if app.focus == Column::Book && app.error.is_some() {
                app.error = None;
            } else {
                app.reset();
            }
        }
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.search_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.submit_search(),
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(c) => app.search_input.push(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use divine_words_core::{Locale, Mode, ProxyGateway, Selection, Session};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let gateway = ProxyGateway::new("http://127.0.0.1:9", Duration::from_secs(1));
        let mut app = App::new(Session::new(Selection::new(Locale::De), gateway, 3), tx);
        app.remember_choices = false;
        app
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))).unwrap();
    }

    #[test]
    fn test_locale_toggle_resets_selection() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        assert!(app.session.selection().book().is_some());

        press(&mut app, KeyCode::Char('L'));
        assert_eq!(app.locale(), Locale::En);
        assert!(app.session.selection().book().is_none());
        assert_eq!(app.session.selection().translation(), "web");
        assert_eq!(app.cached_books[0].name, "Genesis");
    }

    #[test]
    fn test_translation_cycles_within_locale() {
        let mut app = app();
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.session.selection().translation(), "luther1912");
        press(&mut app, KeyCode::Char('t'));
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.session.selection().translation(), "elberfelder");
    }

    #[test]
    fn test_search_editing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.input_mode, InputMode::Editing);
        for c in "joh".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.search_input, "jo");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.search_input.is_empty());
    }

    #[tokio::test]
    async fn test_daily_key_switches_mode() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('D'));
        assert_eq!(app.mode(), Mode::Daily);
        assert!(app.session.selection().book().is_none());
        press(&mut app, KeyCode::Char('D'));
        assert_eq!(app.mode(), Mode::Search);
    }

    #[test]
    fn test_escape_clears_selection() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.focus, Column::Verse);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.focus, Column::Book);
        assert!(app.session.selection().book().is_none());
    }
}
