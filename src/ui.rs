use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use divine_words_core::{daily, Mode, OptionGroup, Passage};
use crate::app::{App, Column, InputMode};

const LOADING_DOTS: [&str; 3] = [".", "..", "..."];

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [book_area, chapter_area, verse_area, passage_area] = Layout::horizontal([
        Constraint::Length(24),
        Constraint::Length(12),
        Constraint::Length(16),
        Constraint::Min(20),
    ])
    .areas(body_area);

    render_books(app, frame, book_area);
    render_chapters(app, frame, chapter_area);
    render_verses(app, frame, verse_area);
    render_passage(app, frame, passage_area);

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let locale = app.locale();
    let translation = app.session.selection().translation();
    let translation_name = locale
        .translation(translation)
        .map(|t| t.name)
        .unwrap_or(translation);

    let title = Line::from(vec![
        Span::styled(" Divine Words ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!(
                " {} ",
                match app.mode() {
                    Mode::Daily => app.labels().daily,
                    Mode::Search => app.labels().search,
                }
            ),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::styled(
            format!(" {} ", locale.display_name()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{}: {} ", app.labels().translation, translation_name),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn column_block(app: &App, column: Column, title: &str, enabled: bool) -> Block<'static> {
    let border_style = if !enabled {
        Style::default().fg(Color::DarkGray)
    } else if app.focus == column && app.input_mode == InputMode::Normal {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {} ", title))
}

fn highlight_style(app: &App, column: Column) -> Style {
    if app.focus == column {
        Style::default().bg(Color::Cyan).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    }
}

/// Greyed-out stand-in for a column whose prerequisite is unset
fn render_placeholder(frame: &mut Frame, area: Rect, block: Block<'static>, text: &str) {
    let paragraph = Paragraph::new(Span::styled(
        text.to_string(),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    ))
    .block(block)
    .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_books(app: &mut App, frame: &mut Frame, area: Rect) {
    let labels = app.labels();
    let chosen = app.session.selection().book().map(|b| b.key());

    let items: Vec<ListItem> = app
        .cached_books
        .iter()
        .map(|entry| {
            let style = if Some(entry.key) == chosen {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(entry.name, style))
        })
        .collect();

    let list = List::new(items)
        .block(column_block(app, Column::Book, labels.book, true))
        .highlight_style(highlight_style(app, Column::Book));
    frame.render_stateful_widget(list, area, &mut app.book_state);
}

fn render_chapters(app: &mut App, frame: &mut Frame, area: Rect) {
    let labels = app.labels();
    let enabled = app.availability().chapter;
    let chosen = app.session.selection().chapter();
    let title = match chosen {
        Some(chapter) => labels.chapter_caption(chapter),
        None => labels.chapter.to_string(),
    };
    let block = column_block(app, Column::Chapter, &title, enabled);
    if !enabled {
        render_placeholder(frame, area, block, labels.select_book);
        return;
    }

    let items: Vec<ListItem> = app
        .chapters()
        .into_iter()
        .map(|chapter| {
            let style = if Some(chapter) == chosen {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(chapter.to_string(), style))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style(app, Column::Chapter));
    frame.render_stateful_widget(list, area, &mut app.chapter_state);
}

fn render_verses(app: &mut App, frame: &mut Frame, area: Rect) {
    let labels = app.labels();
    let enabled = app.availability().verse;
    let block = column_block(app, Column::Verse, labels.verse, enabled);
    if !enabled {
        render_placeholder(frame, area, block, labels.select_chapter);
        return;
    }

    let chosen = app.session.selection().verse();
    let mut items: Vec<ListItem> = Vec::with_capacity(app.cached_options.len() + 1);
    let mut in_ranges = false;
    for option in &app.cached_options {
        if option.group == OptionGroup::Range && !in_ranges {
            in_ranges = true;
            items.push(ListItem::new(Span::styled(
                format!("── {} ──", labels.verse_ranges),
                Style::default().fg(Color::DarkGray),
            )));
        }
        let mut style = match option.group {
            OptionGroup::Verse => Style::default(),
            OptionGroup::Range => Style::default().fg(Color::Green),
        };
        if Some(option.choice) == chosen {
            style = style.fg(Color::Yellow);
        }
        items.push(ListItem::new(Span::styled(option.label.clone(), style)));
    }

    // The divider row shifts every range entry down by one
    let mut state = app.verse_state.clone();
    if let Some(i) = state.selected() {
        let first_range = app
            .cached_options
            .iter()
            .position(|o| o.group == OptionGroup::Range);
        if first_range.is_some_and(|r| i >= r) {
            state.select(Some(i + 1));
        }
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style(app, Column::Verse));
    frame.render_stateful_widget(list, area, &mut state);
    *app.verse_state.offset_mut() = state.offset();
}

fn render_passage(app: &App, frame: &mut Frame, area: Rect) {
    let labels = app.labels();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let (title, text) = if app.is_loading() {
        let dots = LOADING_DOTS[app.animation_frame as usize % LOADING_DOTS.len()];
        let reference = app
            .pending
            .as_ref()
            .map(|p| daily::describe(&p.reference, app.locale()))
            .unwrap_or_default();
        (
            reference,
            Text::from(Span::styled(
                format!("{}{}", labels.loading, dots),
                Style::default().fg(Color::DarkGray),
            )),
        )
    } else if let Some(error) = &app.error {
        (
            String::new(),
            Text::from(Span::styled(error.clone(), Style::default().fg(Color::Red))),
        )
    } else if let Some(passage) = &app.passage {
        (passage.label(), passage_text(passage))
    } else {
        (
            String::new(),
            Text::from(Span::styled(
                labels.select_verse,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )),
        )
    };

    let title = match app.mode() {
        Mode::Daily if title.is_empty() => labels.daily.to_string(),
        Mode::Daily => format!("{}: {}", labels.daily, title),
        Mode::Search => title,
    };

    let block = if title.is_empty() {
        block
    } else {
        block.title(Span::styled(format!(" {} ", title), Style::default().bold()))
    };

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.passage_scroll, 0));
    frame.render_widget(paragraph, area);
}

/// One line per verse with a dimmed verse number; falls back to the flat text
fn passage_text(passage: &Passage) -> Text<'static> {
    let mut lines: Vec<Line<'static>> = if passage.verses.is_empty() {
        passage
            .text
            .lines()
            .map(|l| Line::from(l.trim().to_string()))
            .collect()
    } else {
        passage
            .verses
            .iter()
            .map(|v| {
                Line::from(vec![
                    Span::styled(format!("{} ", v.verse), Style::default().fg(Color::DarkGray)),
                    Span::raw(v.text.trim().to_string()),
                ])
            })
            .collect()
    };

    if let Some(name) = &passage.translation_name {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            name.clone(),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }
    Text::from(lines)
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let (mode_text, hints) = match app.input_mode {
        InputMode::Normal => (
            " BROWSE ".to_string(),
            vec![
                Span::styled(" j/k ", key_style),
                Span::styled(" nav ", label_style),
                Span::styled(" Enter ", key_style),
                Span::styled(
                    if app.focus == Column::Verse { " look up " } else { " select " },
                    label_style,
                ),
                Span::styled(" h/l ", key_style),
                Span::styled(" column ", label_style),
                Span::styled(" / ", key_style),
                Span::styled(format!(" {} ", app.labels().search.to_lowercase()), label_style),
                Span::styled(" D ", key_style),
                Span::styled(
                    match app.mode() {
                        Mode::Daily => " search ",
                        Mode::Search => " daily ",
                    },
                    label_style,
                ),
                Span::styled(" t ", key_style),
                Span::styled(" translation ", label_style),
                Span::styled(" L ", key_style),
                Span::styled(" language ", label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" reset ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ],
        ),
        InputMode::Editing => (
            format!(" {} ", app.labels().search.to_uppercase()),
            vec![
                Span::styled(format!(" {}", app.search_input), label_style),
                Span::styled("█", label_style),
                Span::styled(" Enter ", key_style),
                Span::styled(" look up ", label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" cancel ", label_style),
            ],
        ),
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use divine_words_core::PassageVerse;

    #[test]
    fn test_passage_text_numbers_verses() {
        let passage = Passage {
            reference: Some("John 3:16-17".to_string()),
            text: String::new(),
            verses: vec![
                PassageVerse {
                    book_id: None,
                    book_name: "John".to_string(),
                    chapter: 3,
                    verse: 16,
                    text: "For God so loved the world\n".to_string(),
                },
                PassageVerse {
                    book_id: None,
                    book_name: "John".to_string(),
                    chapter: 3,
                    verse: 17,
                    text: "For God sent not his Son".to_string(),
                },
            ],
            translation_id: Some("kjv".to_string()),
            translation_name: Some("King James Version".to_string()),
        };
        let text = passage_text(&passage);
        assert_eq!(text.lines.len(), 4);
        assert_eq!(text.lines[0].spans[0].content, "16 ");
        assert_eq!(text.lines[0].spans[1].content, "For God so loved the world");
    }

    #[test]
    fn test_passage_text_falls_back_to_flat_text() {
        let passage = Passage {
            reference: None,
            text: "In the beginning\n".to_string(),
            verses: Vec::new(),
            translation_id: None,
            translation_name: None,
        };
        assert_eq!(passage_text(&passage).lines.len(), 1);
    }
}
