//! cinetui - movie information screen for the terminal
//!
//! Shows a TMDB movie's details, cast, trailer and recommendations, and lets
//! a signed-in user toggle the movie in their favorites and watchlist.
//!
//! # Modules
//!
//! - `models` - TMDB payloads and list kinds
//! - `api` - TMDB client
//! - `query` - keyed, cached, deduplicated reads
//! - `catalog` - the screen's four reads on top of `query`
//! - `membership` - list membership flags
//! - `screen` - movie screen state, view model, optimistic writes
//! - `session` / `config` - on-disk state
//! - `app` / `ui` - TUI state machine and rendering
//! - `cli` / `commands` - scriptable subcommands

pub mod api;
pub mod app;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod membership;
pub mod models;
pub mod query;
pub mod screen;
pub mod session;
pub mod ui;

// Re-export commonly used types
pub use models::{CastMember, Genre, ListKind, MovieDetail, MoviePage, MovieSummary, Video};

pub use api::{TmdbClient, TmdbError};
pub use app::{App, Route};
pub use catalog::{Catalog, QueryRequest};
pub use screen::{MovieScreen, MovieView, ViewState};
pub use session::Session;
