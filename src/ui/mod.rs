//! Terminal UI components
//!
//! Built with ratatui. [`render`] draws the whole frame for an [`App`].

pub mod detail;
pub mod home;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    prelude::*,
    widgets::{Block, Clear, Paragraph},
};

use crate::app::{App, InputMode, Route};

/// Draw the header, the current route, and the status bar
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Style::default().bg(Theme::BACKGROUND)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header(frame, chunks[0], app);

    match app.route {
        Route::Home => home::render_home(
            frame,
            chunks[1],
            &app.home.input,
            app.input_mode == InputMode::Editing,
            app.selected_genre,
        ),
        Route::Movie(_) => {
            if let Some(state) = app.view_state() {
                app.detail.render(frame, chunks[1], &state);
            }
        }
        Route::Actor(id) => home::render_actor(frame, chunks[1], id),
    }

    render_status_bar(frame, chunks[2], app);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let account = match app.session().credentials() {
        Some((account_id, _)) => {
            Span::styled(format!(" account {} ", account_id), Theme::secondary())
        }
        None => Span::styled(" not signed in ", Theme::dimmed()),
    };
    let header = Line::from(vec![
        Span::styled(" CINE", Theme::title()),
        Span::styled("TUI ", Theme::secondary()),
        Span::styled("│", Theme::dimmed()),
        account,
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let line = match &app.status {
        Some(status) => Line::from(Span::styled(format!(" {} ", status), Theme::error())),
        None => Line::from(Span::styled(key_hints(app), Theme::keybind_desc())),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn key_hints(app: &App) -> &'static str {
    match (app.route, app.input_mode) {
        (_, InputMode::Editing) => " Enter:open  Esc:cancel ",
        (Route::Home, _) => " /:movie id  x:clear genre  q:quit ",
        (Route::Movie(_), _) => {
            " f:favorite  w:watchlist  t:trailer  h:homepage  i:imdb  Tab:section  Enter:open  r:refresh  Esc:back "
        }
        (Route::Actor(_), _) => " o:open on TMDB  Esc:back  q:quit ",
    }
}
