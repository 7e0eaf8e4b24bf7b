//! Movie information view
//!
//! Renders a [`ViewState`]: a loading panel, the not-found panel, or the full
//! detail with poster, metadata, list actions, cast and recommendations.
//! The trailer modal draws on top when open.

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::screen::{MovieView, TrailerModal, ViewState};
use crate::ui::Theme;

/// Focusable sections of the detail view
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DetailFocus {
    #[default]
    Genres,
    Cast,
    Recommendations,
}

impl DetailFocus {
    /// Next section; recommendations are skipped when the movie has none
    pub fn next(self, has_recommendations: bool) -> Self {
        match self {
            DetailFocus::Genres => DetailFocus::Cast,
            DetailFocus::Cast if has_recommendations => DetailFocus::Recommendations,
            DetailFocus::Cast | DetailFocus::Recommendations => DetailFocus::Genres,
        }
    }

    pub fn prev(self, has_recommendations: bool) -> Self {
        match self {
            DetailFocus::Genres if has_recommendations => DetailFocus::Recommendations,
            DetailFocus::Genres | DetailFocus::Recommendations => DetailFocus::Cast,
            DetailFocus::Cast => DetailFocus::Genres,
        }
    }
}

/// What Enter activates in the current section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Genre(u64),
    Actor(u64),
    Movie(u64),
}

/// Focus and per-section cursor of the detail view
#[derive(Debug, Default, Clone)]
pub struct DetailView {
    pub focus: DetailFocus,
    pub selected_genre: usize,
    pub selected_cast: usize,
    pub selected_recommendation: usize,
}

impl DetailView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the first entry of the first section
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn focus_next(&mut self, view: &MovieView) {
        self.focus = self.focus.next(has_recommendations(view));
    }

    pub fn focus_prev(&mut self, view: &MovieView) {
        self.focus = self.focus.prev(has_recommendations(view));
    }

    fn section_len(&self, view: &MovieView) -> usize {
        match self.focus {
            DetailFocus::Genres => view.genres.len(),
            DetailFocus::Cast => view.top_cast.len(),
            DetailFocus::Recommendations => view.recommendations.as_ref().map_or(0, Vec::len),
        }
    }

    fn cursor_mut(&mut self) -> &mut usize {
        match self.focus {
            DetailFocus::Genres => &mut self.selected_genre,
            DetailFocus::Cast => &mut self.selected_cast,
            DetailFocus::Recommendations => &mut self.selected_recommendation,
        }
    }

    pub fn up(&mut self) {
        let cursor = self.cursor_mut();
        *cursor = cursor.saturating_sub(1);
    }

    pub fn down(&mut self, view: &MovieView) {
        let len = self.section_len(view);
        let cursor = self.cursor_mut();
        if len > 0 && *cursor < len - 1 {
            *cursor += 1;
        }
    }

    /// Keep cursors inside their sections after the view changed
    pub fn clamp(&mut self, view: &MovieView) {
        let clamp = |cursor: &mut usize, len: usize| {
            *cursor = (*cursor).min(len.saturating_sub(1));
        };
        clamp(&mut self.selected_genre, view.genres.len());
        clamp(&mut self.selected_cast, view.top_cast.len());
        clamp(
            &mut self.selected_recommendation,
            view.recommendations.as_ref().map_or(0, Vec::len),
        );
        if self.focus == DetailFocus::Recommendations && !has_recommendations(view) {
            self.focus = DetailFocus::Genres;
        }
    }

    /// Entry under the cursor in the focused section
    pub fn selection(&self, view: &MovieView) -> Option<Selection> {
        match self.focus {
            DetailFocus::Genres => view
                .genres
                .get(self.selected_genre)
                .map(|g| Selection::Genre(g.id)),
            DetailFocus::Cast => view
                .top_cast
                .get(self.selected_cast)
                .map(|c| Selection::Actor(c.id)),
            DetailFocus::Recommendations => view
                .recommendations
                .as_ref()
                .and_then(|r| r.get(self.selected_recommendation))
                .map(|m| Selection::Movie(m.id)),
        }
    }

    /// Render the detail view
    pub fn render(&self, frame: &mut Frame, area: Rect, state: &ViewState) {
        match state {
            ViewState::Loading => render_loading(frame, area),
            ViewState::Error(message) => render_not_found(frame, area, message),
            ViewState::Loaded(view) => {
                self.render_loaded(frame, area, view);
                if let Some(trailer) = view.trailer.as_ref().filter(|t| t.open) {
                    render_trailer(frame, area, trailer);
                }
            }
        }
    }

    fn render_loaded(&self, frame: &mut Frame, area: Rect, view: &MovieView) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(12), Constraint::Length(9)])
            .split(area);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(30)])
            .split(rows[0]);

        render_poster(frame, top[0], view);
        self.render_info(frame, top[1], view);

        match &view.recommendations {
            Some(_) => {
                let bottom = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(rows[1]);
                self.render_cast(frame, bottom[0], view);
                self.render_recommendations(frame, bottom[1], view);
            }
            None => self.render_cast(frame, rows[1], view),
        }
    }

    fn render_info(&self, frame: &mut Frame, area: Rect, view: &MovieView) {
        let block = panel(" MOVIE ", false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = vec![Line::from(Span::styled(view.title_line.clone(), Theme::title()))];
        if !view.tagline.is_empty() {
            lines.push(Line::from(Span::styled(view.tagline.clone(), Theme::secondary())));
        }
        lines.push(Line::from(vec![
            Span::styled(star_bar(view.stars), Theme::rating()),
            Span::styled(format!(" {:.1}", view.stars), Theme::rating()),
            Span::styled(format!("  ({:.1}/10)", view.vote_average), Theme::dimmed()),
            Span::styled("  │  ", Theme::dimmed()),
            Span::styled(view.runtime_line.clone(), Theme::text()),
        ]));
        lines.push(self.genre_line(view));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(view.overview.clone(), Theme::text())));
        lines.push(Line::from(""));
        lines.push(action_line(view));

        let mut links = Vec::new();
        if let Some(url) = &view.homepage_url {
            links.push(Span::styled("[h] ", Theme::keybind()));
            links.push(Span::styled(url.clone(), Theme::link()));
            links.push(Span::raw("  "));
        }
        if let Some(url) = &view.imdb_url {
            links.push(Span::styled("[i] ", Theme::keybind()));
            links.push(Span::styled(url.clone(), Theme::link()));
        }
        if !links.is_empty() {
            lines.push(Line::from(links));
        }

        let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn genre_line(&self, view: &MovieView) -> Line<'static> {
        let focused = self.focus == DetailFocus::Genres;
        let mut spans = vec![Span::styled("Genres: ", Theme::dimmed())];
        for (i, genre) in view.genres.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" · ", Theme::dimmed()));
            }
            let style = if focused && i == self.selected_genre {
                Theme::selected()
            } else {
                Theme::text()
            };
            spans.push(Span::styled(genre.name.clone(), style));
        }
        Line::from(spans)
    }

    fn render_cast(&self, frame: &mut Frame, area: Rect, view: &MovieView) {
        let focused = self.focus == DetailFocus::Cast;
        let block = panel(" TOP BILLED CAST ", focused);

        if view.top_cast.is_empty() {
            let empty = Paragraph::new("No cast information")
                .style(Theme::dimmed())
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = view
            .top_cast
            .iter()
            .enumerate()
            .map(|(i, member)| {
                let selected = focused && i == self.selected_cast;
                ListItem::new(Line::from(vec![
                    Span::styled(
                        member.name.clone(),
                        if selected { Theme::selected() } else { Theme::text() },
                    ),
                    Span::styled(format!("  {}", member.short_character()), Theme::dimmed()),
                ]))
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }

    fn render_recommendations(&self, frame: &mut Frame, area: Rect, view: &MovieView) {
        let Some(recommendations) = &view.recommendations else {
            return;
        };
        let focused = self.focus == DetailFocus::Recommendations;
        let block = panel(" YOU MIGHT ALSO LIKE ", focused);

        let inner = block.inner(area);
        let visible = inner.height as usize;
        let offset = if self.selected_recommendation >= visible {
            self.selected_recommendation + 1 - visible
        } else {
            0
        };

        let items: Vec<ListItem> = recommendations
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible.max(1))
            .map(|(i, movie)| {
                let selected = focused && i == self.selected_recommendation;
                ListItem::new(Line::from(vec![
                    Span::styled(
                        movie.to_string(),
                        if selected { Theme::selected() } else { Theme::text() },
                    ),
                    Span::styled(format!("  ★ {:.1}", movie.vote_average), Theme::rating()),
                ]))
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }
}

fn has_recommendations(view: &MovieView) -> bool {
    view.recommendations.as_ref().is_some_and(|r| !r.is_empty())
}

fn panel(title: &'static str, focused: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        })
        .title(Span::styled(title, Theme::title()))
}

/// Five-cell star bar for a 0..=5 rating
pub fn star_bar(stars: f32) -> String {
    let stars = stars.clamp(0.0, 5.0);
    let full = stars.floor() as usize;
    let half = stars - stars.floor() >= 0.5;
    let empty = 5 - full - usize::from(half);
    format!("{}{}{}", "★".repeat(full), if half { "½" } else { "" }, "☆".repeat(empty))
}

fn action_line(view: &MovieView) -> Line<'static> {
    let mut spans = vec![
        Span::styled("[f] ", Theme::keybind()),
        Span::styled(view.favorite_label(), Theme::action(view.is_favorited)),
        Span::raw("   "),
        Span::styled("[w] ", Theme::keybind()),
        Span::styled(
            format!("Watchlist {}", view.watchlist_marker()),
            Theme::action(view.is_watchlisted),
        ),
    ];
    if view.trailer.is_some() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled("[t] ", Theme::keybind()));
        spans.push(Span::styled("Play Trailer", Theme::text()));
    }
    Line::from(spans)
}

fn render_poster(frame: &mut Frame, area: Rect, view: &MovieView) {
    let block = panel(" POSTER ", false);
    let content = match &view.poster_url {
        Some(url) => Paragraph::new(vec![
            Line::from(Span::styled(view.title.clone(), Theme::title())),
            Line::from(""),
            Line::from(Span::styled(url.clone(), Theme::link())),
        ]),
        None => Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("🎬", Theme::dimmed())),
            Line::from(Span::styled("No poster", Theme::dimmed())),
        ]),
    };
    frame.render_widget(
        content
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        area,
    );
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let loading = Paragraph::new("Loading...")
        .style(Theme::loading())
        .alignment(Alignment::Center)
        .block(panel(" MOVIE ", false));
    frame.render_widget(loading, area);
}

fn render_not_found(frame: &mut Frame, area: Rect, message: &str) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Theme::error())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter] ", Theme::keybind()),
            Span::styled("Home", Theme::keybind_desc()),
        ]),
    ];
    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(panel(" NOT FOUND ", false));
    frame.render_widget(body, area);
}

fn render_trailer(frame: &mut Frame, area: Rect, trailer: &TrailerModal) {
    let popup = centered_rect(area, 70, 9);
    frame.render_widget(Clear, popup);

    let title = if trailer.name.is_empty() {
        "Trailer".to_string()
    } else {
        trailer.name.clone()
    };
    let lines = vec![
        Line::from(Span::styled(title, Theme::title())),
        Line::from(""),
        Line::from(Span::styled(trailer.embed_url.clone(), Theme::link())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[o] ", Theme::keybind()),
            Span::styled("Open in browser   ", Theme::keybind_desc()),
            Span::styled("[Esc] ", Theme::keybind()),
            Span::styled("Close", Theme::keybind_desc()),
        ]),
    ];
    let modal = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Theme::popup())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Theme::border_focused())
                .title(Span::styled(" TRAILER ", Theme::title())),
        );
    frame.render_widget(modal, popup);
}

/// Rect of `width` percent and `height` rows centered in `area`
pub fn centered_rect(area: Rect, width_percent: u16, height: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(width_percent.min(100)) / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
