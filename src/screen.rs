//! Movie information screen
//!
//! Owns the screen's local state: the two membership flags and the trailer
//! modal. Everything else is read from the [`Catalog`] by key. The screen
//! never performs IO itself: it names the reads it needs
//! ([`MovieScreen::queries`]), hands out writes to perform
//! ([`MovieScreen::begin_toggle`]) and absorbs their outcomes
//! ([`MovieScreen::sync`], [`MovieScreen::settle_write`]).

use serde::Serialize;
use thiserror::Error;

use crate::api::{TmdbClient, TmdbError};
use crate::catalog::{Catalog, ListKey, QueryRequest, RecommendationsKey};
use crate::membership::{FlagDeps, MembershipFlag};
use crate::models::{
    CastMember, Genre, ListKind, MovieDetail, MoviePage, MovieSummary, SpokenLanguage,
};
use crate::session::Session;

/// Cast entries shown after dropping those without a portrait
pub const TOP_CAST_LIMIT: usize = 6;

/// Recommendations shown in the "You might also like" section
pub const RECOMMENDATION_LIMIT: usize = 12;

/// Message of the not-found panel
pub const NOT_FOUND_MESSAGE: &str = "Something has gone wrong - Go back";

/// Errors from user actions on the screen
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Sign in to manage your lists")]
    NoSession,
    #[error("Movie is still loading")]
    NotLoaded,
    #[error("No trailer available")]
    NoTrailer,
}

// =============================================================================
// View State
// =============================================================================

/// Top-level render state, evaluated in declaration order
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// Detail read has no cached result yet
    Loading,
    /// Detail read failed; the only way out is home
    Error(String),
    /// Detail available
    Loaded(Box<MovieView>),
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ViewState::Error(_))
    }

    pub fn loaded(&self) -> Option<&MovieView> {
        match self {
            ViewState::Loaded(view) => Some(view),
            _ => None,
        }
    }
}

/// Trailer overlay; only exists when the movie has at least one video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailerModal {
    pub key: String,
    pub name: String,
    pub embed_url: String,
    pub open: bool,
}

/// Everything the loaded screen displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieView {
    pub id: u64,
    pub title: String,
    /// "Title (Year)"
    pub title_line: String,
    pub tagline: String,
    pub overview: String,
    /// 0..=10 as reported by TMDB
    pub vote_average: f32,
    /// 0..=5, one decimal
    pub stars: f32,
    /// "136min / English"
    pub runtime_line: String,
    pub genres: Vec<Genre>,
    pub top_cast: Vec<CastMember>,
    pub poster_url: Option<String>,
    pub homepage_url: Option<String>,
    pub imdb_url: Option<String>,
    pub is_favorited: bool,
    pub is_watchlisted: bool,
    /// `None` means no section at all
    pub recommendations: Option<Vec<MovieSummary>>,
    /// `None` means no modal at all
    pub trailer: Option<TrailerModal>,
}

impl MovieView {
    /// Label of the favorite button
    pub fn favorite_label(&self) -> &'static str {
        if self.is_favorited {
            "Unfavorite"
        } else {
            "Favorite"
        }
    }

    /// Marker on the watchlist button
    pub fn watchlist_marker(&self) -> &'static str {
        if self.is_watchlisted {
            "-"
        } else {
            "+1"
        }
    }
}

// =============================================================================
// Pure helpers
// =============================================================================

/// Drop cast entries without a portrait, then keep the first [`TOP_CAST_LIMIT`]
pub fn top_cast(cast: &[CastMember]) -> Vec<CastMember> {
    cast.iter()
        .filter(|c| c.has_portrait())
        .take(TOP_CAST_LIMIT)
        .cloned()
        .collect()
}

/// Half of a 0..10 vote, rounded to one decimal
pub fn star_rating(vote_average: f32) -> f32 {
    (vote_average * 5.0).round() / 10.0
}

/// "{runtime}min", plus " / {language}" for the first spoken language
pub fn runtime_line(runtime: Option<u32>, languages: &[SpokenLanguage]) -> String {
    let mut line = runtime.map(|r| format!("{}min", r)).unwrap_or_default();
    if let Some(language) = languages.first() {
        line.push_str(&format!(" / {}", language.name));
    }
    line
}

/// Recommendations section, present iff the page reports any results
pub fn recommendations_section(page: Option<&MoviePage>) -> Option<Vec<MovieSummary>> {
    page.filter(|p| p.total_results > 0)
        .map(|p| p.results.iter().take(RECOMMENDATION_LIMIT).cloned().collect())
}

/// Join an image CDN prefix and a TMDB image path
pub fn image_url(base: &str, path: Option<&str>) -> Option<String> {
    let path = path.filter(|p| !p.is_empty())?;
    Some(format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

// =============================================================================
// Writes
// =============================================================================

/// A list write handed out by [`MovieScreen::begin_toggle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub kind: ListKind,
    pub account_id: u64,
    pub session_id: String,
    pub movie_id: u64,
    /// Membership requested: the inverse of the flag when the write began
    pub value: bool,
}

impl PendingWrite {
    pub async fn send(&self, client: &TmdbClient) -> Result<(), TmdbError> {
        client
            .set_list_membership(
                self.kind,
                self.account_id,
                &self.session_id,
                self.movie_id,
                self.value,
            )
            .await
    }
}

// =============================================================================
// Screen
// =============================================================================

/// Local state of the movie information screen
#[derive(Debug, Clone)]
pub struct MovieScreen {
    movie_id: u64,
    session: Session,
    image_base_url: String,
    favorited: MembershipFlag,
    watchlisted: MembershipFlag,
    trailer_open: bool,
}

impl MovieScreen {
    pub fn new(movie_id: u64, session: Session, image_base_url: impl Into<String>) -> Self {
        Self {
            movie_id,
            session,
            image_base_url: image_base_url.into(),
            favorited: MembershipFlag::default(),
            watchlisted: MembershipFlag::default(),
            trailer_open: false,
        }
    }

    pub fn movie_id(&self) -> u64 {
        self.movie_id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Switch to another movie; flags and the trailer start over
    pub fn set_movie_id(&mut self, movie_id: u64) {
        if movie_id == self.movie_id {
            return;
        }
        self.movie_id = movie_id;
        self.favorited.reset();
        self.watchlisted.reset();
        self.trailer_open = false;
    }

    /// Key of the first page of a membership list, when signed in
    pub fn list_key(&self, kind: ListKind) -> Option<ListKey> {
        self.session
            .credentials()
            .map(|(account_id, session_id)| ListKey {
                kind,
                account_id,
                session_id: session_id.to_string(),
                page: 1,
            })
    }

    pub fn recommendations_key(&self) -> RecommendationsKey {
        RecommendationsKey {
            movie_id: self.movie_id,
            page: 1,
        }
    }

    /// Reads the screen depends on; all independent, none chained
    pub fn queries(&self) -> Vec<QueryRequest> {
        let mut requests = vec![QueryRequest::Movie(self.movie_id)];
        requests.extend(
            [ListKind::Favorite, ListKind::Watchlist]
                .into_iter()
                .filter_map(|kind| self.list_key(kind))
                .map(QueryRequest::List),
        );
        requests.push(QueryRequest::Recommendations(self.recommendations_key()));
        requests
    }

    pub fn is_favorited(&self) -> bool {
        self.favorited.get()
    }

    pub fn is_watchlisted(&self) -> bool {
        self.watchlisted.get()
    }

    pub fn flag(&self, kind: ListKind) -> bool {
        match kind {
            ListKind::Favorite => self.favorited.get(),
            ListKind::Watchlist => self.watchlisted.get(),
        }
    }

    fn flag_mut(&mut self, kind: ListKind) -> &mut MembershipFlag {
        match kind {
            ListKind::Favorite => &mut self.favorited,
            ListKind::Watchlist => &mut self.watchlisted,
        }
    }

    /// Re-derive membership flags whose inputs changed; returns whether any did
    pub fn sync(&mut self, catalog: &Catalog) -> bool {
        let movie = catalog.movie_state(self.movie_id);
        let loaded_id = movie.data().map(|m| m.id);
        let mut changed = false;

        for kind in [ListKind::Favorite, ListKind::Watchlist] {
            let list = self
                .list_key(kind)
                .map(|key| catalog.list_state(&key))
                .unwrap_or_default();
            let deps = FlagDeps {
                movie_key: self.movie_id,
                movie_version: movie.version,
                list_version: list.version,
            };
            changed |= self.flag_mut(kind).sync(deps, list.data(), loaded_id);
        }
        changed
    }

    /// Start a toggle: the write asks for the inverse of the flag as it is now
    ///
    /// Not guarded against re-entry: starting twice before either settles
    /// yields two writes with the same `value`.
    pub fn begin_toggle(&self, kind: ListKind) -> Result<PendingWrite, ActionError> {
        let (account_id, session_id) = self.session.credentials().ok_or(ActionError::NoSession)?;
        Ok(PendingWrite {
            kind,
            account_id,
            session_id: session_id.to_string(),
            movie_id: self.movie_id,
            value: !self.flag(kind),
        })
    }

    /// Absorb a settled write: failures are logged, and the flag flips either way
    pub fn settle_write(&mut self, write: &PendingWrite, result: &Result<(), TmdbError>) {
        if let Err(e) = result {
            tracing::warn!(
                list = %write.kind,
                movie_id = write.movie_id,
                error = %e,
                "list write failed"
            );
        }
        if write.movie_id != self.movie_id {
            tracing::debug!(
                movie_id = write.movie_id,
                current = self.movie_id,
                "dropping settled write for another movie"
            );
            return;
        }
        self.flag_mut(write.kind).flip();
    }

    pub fn is_trailer_open(&self) -> bool {
        self.trailer_open
    }

    /// Open the trailer modal; only possible once a trailer is known to exist
    pub fn open_trailer(&mut self, catalog: &Catalog) -> Result<(), ActionError> {
        let movie = catalog.movie_state(self.movie_id);
        let detail = movie.data().ok_or(ActionError::NotLoaded)?;
        if detail.first_video().is_none() {
            return Err(ActionError::NoTrailer);
        }
        self.trailer_open = true;
        Ok(())
    }

    pub fn close_trailer(&mut self) {
        self.trailer_open = false;
    }

    /// Current render state
    pub fn view_state(&self, catalog: &Catalog) -> ViewState {
        let movie = catalog.movie_state(self.movie_id);

        if movie.is_fetching {
            return ViewState::Loading;
        }
        if movie.error.is_some() {
            return ViewState::Error(NOT_FOUND_MESSAGE.to_string());
        }
        let Some(detail) = movie.data() else {
            return ViewState::Loading;
        };

        let recommendations = catalog.recommendations_state(&self.recommendations_key());
        ViewState::Loaded(Box::new(self.build_view(detail, recommendations.data())))
    }

    fn build_view(&self, detail: &MovieDetail, recommendations: Option<&MoviePage>) -> MovieView {
        let trailer = detail.first_video().map(|video| TrailerModal {
            key: video.key.clone(),
            name: video.name.clone(),
            embed_url: video.embed_url(),
            open: self.trailer_open,
        });

        MovieView {
            id: detail.id,
            title: detail.title.clone(),
            title_line: format!("{} ({})", detail.title, detail.year().unwrap_or_default()),
            tagline: detail.tagline.clone(),
            overview: detail.overview.clone(),
            vote_average: detail.vote_average,
            stars: star_rating(detail.vote_average),
            runtime_line: runtime_line(detail.runtime, &detail.spoken_languages),
            genres: detail.genres.clone(),
            top_cast: top_cast(&detail.credits.cast),
            poster_url: image_url(&self.image_base_url, detail.poster_path.as_deref()),
            homepage_url: detail.homepage_url().map(str::to_string),
            imdb_url: detail.imdb_url(),
            is_favorited: self.favorited.get(),
            is_watchlisted: self.watchlisted.get(),
            recommendations: recommendations_section(recommendations),
            trailer,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
