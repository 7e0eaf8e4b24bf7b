//! API clients for external services
//!
//! - TMDB: movie metadata, recommendations, and account lists

pub mod tmdb;

pub use tmdb::{TmdbClient, TmdbError};
