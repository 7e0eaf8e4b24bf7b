//! Home and person screens
//!
//! Home is a movie id prompt plus the active genre filter. The person screen
//! is a stub that links out to TMDB.

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::ui::Theme;

/// Render the home screen
pub fn render_home(
    frame: &mut Frame,
    area: Rect,
    input: &str,
    editing: bool,
    selected_genre: Option<u64>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border())
        .title(Span::styled(" HOME ", Theme::title()));

    let prompt = if editing {
        format!("Movie id: {}│", input)
    } else if input.is_empty() {
        "Press / and type a TMDB movie id".to_string()
    } else {
        format!("Movie id: {}", input)
    };

    let genre = match selected_genre {
        Some(id) => Line::from(vec![
            Span::styled("Genre filter: ", Theme::dimmed()),
            Span::styled(format!("#{}", id), Theme::secondary()),
            Span::styled("   [x] clear", Theme::keybind_desc()),
        ]),
        None => Line::from(Span::styled("No genre filter", Theme::dimmed())),
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("cinetui", Theme::title())),
        Line::from(""),
        Line::from(Span::styled(
            prompt,
            if editing { Theme::input().fg(Theme::PRIMARY) } else { Theme::input() },
        )),
        Line::from(""),
        genre,
    ];

    let home = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(home, area);
}

/// Render the person screen
pub fn render_actor(frame: &mut Frame, area: Rect, actor_id: u64) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border())
        .title(Span::styled(" PERSON ", Theme::title()));

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("TMDB person #{}", actor_id), Theme::text())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[o] ", Theme::keybind()),
            Span::styled("Open on TMDB   ", Theme::keybind_desc()),
            Span::styled("[Esc] ", Theme::keybind()),
            Span::styled("Back", Theme::keybind_desc()),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        area,
    );
}
