//! App state and core application logic
//!
//! Owns every piece of UI state: the route stack, the home input, the movie
//! screen and its detail cursor. Async work never touches this state
//! directly. Key handlers queue [`Effect`]s, the event loop runs them, and
//! their outcomes come back as [`AppMessage`]s applied on the loop.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::TmdbError;
use crate::catalog::{Catalog, QueryRequest};
use crate::models::{ListKind, TMDB_PERSON_BASE};
use crate::screen::{MovieScreen, MovieView, PendingWrite, ViewState};
use crate::session::Session;
use crate::ui::detail::{DetailView, Selection};

// =============================================================================
// Routes, events, effects
// =============================================================================

/// Screen the app is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    /// Movie id prompt and active genre filter
    #[default]
    Home,
    /// Movie information screen
    Movie(u64),
    /// Person page reached from the cast list
    Actor(u64),
}

/// Current input mode for keyboard handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a movie id on the home screen
    Editing,
}

/// App-wide events any screen may raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Make a genre the global filter and return home
    SelectGenre(u64),
}

/// Side effect requested by a key handler, run by the event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(QueryRequest),
    Write(PendingWrite),
    OpenUrl(String),
}

/// Outcome of an effect, posted back to the loop
#[derive(Debug)]
pub enum AppMessage {
    QuerySettled(QueryRequest),
    WriteSettled(PendingWrite, Result<(), TmdbError>),
}

// =============================================================================
// Home
// =============================================================================

/// Home view state: the movie id being typed
#[derive(Debug, Clone, Default)]
pub struct HomeState {
    pub input: String,
}

impl HomeState {
    /// Append a digit; anything else is ignored
    pub fn insert(&mut self, c: char) -> bool {
        if c.is_ascii_digit() && self.input.len() < 10 {
            self.input.push(c);
            true
        } else {
            false
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }

    /// Parsed id, if the input is a positive number
    pub fn movie_id(&self) -> Option<u64> {
        self.input.parse().ok().filter(|id| *id > 0)
    }
}

// =============================================================================
// Main Application State
// =============================================================================

/// Main application state
#[derive(Debug)]
pub struct App {
    /// Current route
    pub route: Route,
    /// Navigation history stack
    pub nav_stack: Vec<Route>,
    /// Whether the app is running
    pub running: bool,
    pub input_mode: InputMode,
    /// One-line notice in the status bar, cleared on the next key
    pub status: Option<String>,
    pub home: HomeState,
    /// Genre chosen from a movie's genre list
    pub selected_genre: Option<u64>,
    pub detail: DetailView,

    catalog: Catalog,
    session: Session,
    image_base_url: String,
    screen: Option<MovieScreen>,
    effects: Vec<Effect>,
}

impl App {
    pub fn new(catalog: Catalog, session: Session, image_base_url: impl Into<String>) -> Self {
        Self {
            route: Route::Home,
            nav_stack: Vec::new(),
            running: true,
            input_mode: InputMode::Normal,
            status: None,
            home: HomeState::default(),
            selected_genre: None,
            detail: DetailView::new(),
            catalog,
            session,
            image_base_url: image_base_url.into(),
            screen: None,
            effects: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Movie screen, while a movie route is showing
    pub fn screen(&self) -> Option<&MovieScreen> {
        match self.route {
            Route::Movie(_) => self.screen.as_ref(),
            _ => None,
        }
    }

    /// Render state of the movie screen, while a movie route is showing
    pub fn view_state(&self) -> Option<ViewState> {
        self.screen().map(|screen| screen.view_state(&self.catalog))
    }

    /// Drain effects queued since the last call
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Navigate to a new route, pushing the current one to the stack
    pub fn navigate(&mut self, route: Route) {
        if self.route != route {
            self.nav_stack.push(self.route);
            self.route = route;
        }
        self.input_mode = InputMode::Normal;
        self.enter_route();
    }

    /// Go back to previous route
    pub fn back(&mut self) -> bool {
        if self.input_mode == InputMode::Editing {
            self.input_mode = InputMode::Normal;
            return true;
        }

        match self.nav_stack.pop() {
            Some(prev) => {
                self.route = prev;
                self.enter_route();
                true
            }
            None => false,
        }
    }

    pub fn go_home(&mut self) {
        self.navigate(Route::Home);
    }

    fn enter_route(&mut self) {
        let Route::Movie(id) = self.route else {
            return;
        };

        let screen = self.screen.get_or_insert_with(|| {
            MovieScreen::new(id, self.session.clone(), self.image_base_url.clone())
        });
        if screen.movie_id() != id {
            screen.set_movie_id(id);
        }
        self.detail.reset();

        self.effects
            .extend(screen.queries().into_iter().map(Effect::Fetch));
        screen.sync(&self.catalog);
        tracing::debug!(movie_id = id, "entered movie screen");
    }

    /// Handle an app-wide event
    pub fn dispatch(&mut self, event: AppEvent) {
        match event {
            AppEvent::SelectGenre(id) => {
                self.selected_genre = Some(id);
                self.go_home();
            }
        }
    }

    /// Apply the outcome of an effect
    pub fn apply(&mut self, message: AppMessage) {
        let Some(screen) = self.screen.as_mut() else {
            return;
        };
        match message {
            AppMessage::QuerySettled(_) => {
                screen.sync(&self.catalog);
            }
            AppMessage::WriteSettled(write, result) => {
                screen.settle_write(&write, &result);
            }
        }

        if let Some(ViewState::Loaded(view)) = self.view_state() {
            self.detail.clamp(&view);
        }
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    // -------------------------------------------------------------------------
    // Keyboard Event Handling
    // -------------------------------------------------------------------------

    /// Handle keyboard event, returns true if event was consumed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.status = None;

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return true;
        }

        if self.input_mode == InputMode::Editing {
            return self.handle_editing_key(key);
        }

        if key.code == KeyCode::Char('q') {
            self.quit();
            return true;
        }

        match self.route {
            Route::Home => self.handle_home_key(key),
            Route::Movie(_) => self.handle_movie_key(key),
            Route::Actor(id) => self.handle_actor_key(key, id),
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                true
            }
            KeyCode::Enter => {
                self.submit_movie_id();
                true
            }
            KeyCode::Char(c) => self.home.insert(c),
            KeyCode::Backspace => {
                self.home.backspace();
                true
            }
            _ => false,
        }
    }

    fn submit_movie_id(&mut self) {
        match self.home.movie_id() {
            Some(id) => {
                self.home.clear();
                self.navigate(Route::Movie(id));
            }
            None => self.set_status("Enter a numeric TMDB movie id"),
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('/') | KeyCode::Char('i') => {
                self.input_mode = InputMode::Editing;
                true
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.input_mode = InputMode::Editing;
                self.home.insert(c)
            }
            KeyCode::Enter => {
                self.submit_movie_id();
                true
            }
            KeyCode::Char('x') => {
                self.selected_genre = None;
                true
            }
            KeyCode::Esc => self.back(),
            _ => false,
        }
    }

    fn handle_actor_key(&mut self, key: KeyEvent, id: u64) -> bool {
        match key.code {
            KeyCode::Char('o') => {
                self.effects
                    .push(Effect::OpenUrl(format!("{}/{}", TMDB_PERSON_BASE, id)));
                true
            }
            KeyCode::Char('b') => {
                self.go_home();
                true
            }
            KeyCode::Esc => self.back(),
            _ => false,
        }
    }

    fn handle_movie_key(&mut self, key: KeyEvent) -> bool {
        match self.view_state() {
            Some(ViewState::Loaded(view)) => self.handle_loaded_key(key, &view),
            Some(ViewState::Error(_)) => match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('b') => {
                    self.go_home();
                    true
                }
                _ => false,
            },
            Some(ViewState::Loading) | None => match key.code {
                KeyCode::Char('r') => {
                    self.refresh();
                    true
                }
                KeyCode::Char('b') => {
                    self.go_home();
                    true
                }
                KeyCode::Esc => self.back_or_home(),
                _ => false,
            },
        }
    }

    fn handle_loaded_key(&mut self, key: KeyEvent, view: &MovieView) -> bool {
        if view.trailer.as_ref().is_some_and(|t| t.open) {
            return self.handle_trailer_key(key, view);
        }

        match key.code {
            KeyCode::Char('f') => self.toggle(ListKind::Favorite),
            KeyCode::Char('w') => self.toggle(ListKind::Watchlist),
            KeyCode::Char('t') => {
                if let Some(screen) = self.screen.as_mut() {
                    if let Err(e) = screen.open_trailer(&self.catalog) {
                        self.status = Some(e.to_string());
                    }
                }
            }
            KeyCode::Char('h') => self.open_url(view.homepage_url.clone(), "No homepage"),
            KeyCode::Char('i') => self.open_url(view.imdb_url.clone(), "No IMDB entry"),
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Tab => self.detail.focus_next(view),
            KeyCode::BackTab => self.detail.focus_prev(view),
            KeyCode::Up | KeyCode::Char('k') => self.detail.up(),
            KeyCode::Down | KeyCode::Char('j') => self.detail.down(view),
            KeyCode::Enter => match self.detail.selection(view) {
                Some(Selection::Genre(id)) => self.dispatch(AppEvent::SelectGenre(id)),
                Some(Selection::Actor(id)) => self.navigate(Route::Actor(id)),
                Some(Selection::Movie(id)) => self.navigate(Route::Movie(id)),
                None => return false,
            },
            KeyCode::Char('b') => self.go_home(),
            KeyCode::Esc => return self.back_or_home(),
            _ => return false,
        }
        true
    }

    fn handle_trailer_key(&mut self, key: KeyEvent, view: &MovieView) -> bool {
        match key.code {
            KeyCode::Esc => {
                if let Some(screen) = self.screen.as_mut() {
                    screen.close_trailer();
                }
                true
            }
            KeyCode::Char('o') => {
                let url = view.trailer.as_ref().map(|t| t.embed_url.clone());
                self.open_url(url, "No trailer available");
                true
            }
            _ => false,
        }
    }

    fn back_or_home(&mut self) -> bool {
        if !self.back() {
            self.go_home();
        }
        true
    }

    fn toggle(&mut self, kind: ListKind) {
        let Some(screen) = self.screen.as_ref() else {
            return;
        };
        match screen.begin_toggle(kind) {
            Ok(write) => self.effects.push(Effect::Write(write)),
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    /// Invalidate every read of the screen and fetch them again
    fn refresh(&mut self) {
        let Some(screen) = self.screen.as_ref() else {
            return;
        };
        for request in screen.queries() {
            self.catalog.invalidate(&request);
            self.effects.push(Effect::Fetch(request));
        }
    }

    fn open_url(&mut self, url: Option<String>, missing: &str) {
        match url {
            Some(url) => self.effects.push(Effect::OpenUrl(url)),
            None => self.set_status(missing),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
