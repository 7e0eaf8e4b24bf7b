//! Data structures for cinetui
//!
//! Shared models organized by domain:
//! - **Movie**: TMDB movie detail with credits and videos appended
//! - **Lists**: paginated movie summaries (account lists, recommendations)
//! - **Account**: list kinds the user can add a movie to

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base URL for embeddable YouTube players
pub const YOUTUBE_EMBED_BASE: &str = "https://www.youtube.com/embed";

/// Base URL for IMDB title pages
pub const IMDB_TITLE_BASE: &str = "https://www.imdb.com/title";

/// Base URL for TMDB person pages
pub const TMDB_PERSON_BASE: &str = "https://www.themoviedb.org/person";

// =============================================================================
// Movie Models (TMDB)
// =============================================================================

/// Detailed movie information from TMDB (`append_to_response=videos,credits`)
///
/// Every field the remote may omit or null deserializes to a default, so a
/// partial payload still yields a usable value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tagline: String,
    #[serde(default, deserialize_with = "null_default")]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default, deserialize_with = "null_default")]
    pub spoken_languages: Vec<SpokenLanguage>,
    #[serde(default, deserialize_with = "null_default")]
    pub genres: Vec<Genre>,
    #[serde(default, deserialize_with = "null_default")]
    pub credits: Credits,
    #[serde(default, deserialize_with = "null_default")]
    pub videos: Videos,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub imdb_id: Option<String>,
}

impl MovieDetail {
    /// Release year, taken from the part of `release_date` before the first `-`
    pub fn year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .filter(|y| !y.is_empty())
    }

    /// First trailer video, if the payload carries any
    pub fn first_video(&self) -> Option<&Video> {
        self.videos.results.first()
    }

    /// IMDB title page URL
    pub fn imdb_url(&self) -> Option<String> {
        self.imdb_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| format!("{}/{}", IMDB_TITLE_BASE, id))
    }

    /// Homepage URL, if the movie has a non-empty one
    pub fn homepage_url(&self) -> Option<&str> {
        self.homepage.as_deref().filter(|h| !h.is_empty())
    }
}

impl fmt::Display for MovieDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year() {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{}", self.title),
        }
    }
}

/// Genre tag on a movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Spoken language entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpokenLanguage {
    #[serde(default)]
    pub iso_639_1: String,
    #[serde(default)]
    pub english_name: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// `credits` block appended to the movie detail
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default, deserialize_with = "null_default")]
    pub cast: Vec<CastMember>,
}

/// One billed cast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub character: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: u32,
}

impl CastMember {
    /// Character name up to the first `/` ("Bruce Wayne / The Batman" -> "Bruce Wayne")
    pub fn short_character(&self) -> &str {
        self.character
            .split('/')
            .next()
            .map(str::trim)
            .unwrap_or_default()
    }

    /// Whether the entry has a portrait image
    pub fn has_portrait(&self) -> bool {
        self.profile_path.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// `videos` block appended to the movie detail
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Videos {
    #[serde(default, deserialize_with = "null_default")]
    pub results: Vec<Video>,
}

/// Video attached to a movie (trailers, teasers, clips)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub site: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl Video {
    /// Embeddable player URL for this video
    pub fn embed_url(&self) -> String {
        format!("{}/{}", YOUTUBE_EMBED_BASE, self.key)
    }
}

// =============================================================================
// List Models
// =============================================================================

/// Movie summary as it appears in lists and recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
}

impl fmt::Display for MovieSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = self
            .release_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .filter(|y| !y.is_empty());
        match year {
            Some(y) => write!(f, "{} ({})", self.title, y),
            None => write!(f, "{}", self.title),
        }
    }
}

/// One page of a paginated movie collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    #[serde(default)]
    pub page: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub results: Vec<MovieSummary>,
    #[serde(default)]
    pub total_results: u32,
    #[serde(default)]
    pub total_pages: u32,
}

impl MoviePage {
    /// Whether a movie with this id is on the page
    pub fn contains(&self, movie_id: u64) -> bool {
        self.results.iter().any(|m| m.id == movie_id)
    }
}

// =============================================================================
// Account Models
// =============================================================================

/// User-owned movie list the screen can toggle membership in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Favorite,
    Watchlist,
}

impl ListKind {
    /// Read path under `/account/{id}/`
    pub fn list_path(&self) -> &'static str {
        match self {
            ListKind::Favorite => "favorite/movies",
            ListKind::Watchlist => "watchlist/movies",
        }
    }

    /// Write path under `/account/{id}/`, also the boolean field name in the body
    pub fn write_path(&self) -> &'static str {
        match self {
            ListKind::Favorite => "favorite",
            ListKind::Watchlist => "watchlist",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListKind::Favorite => write!(f, "Favorites"),
            ListKind::Watchlist => write!(f, "Watchlist"),
        }
    }
}

/// TMDB sends explicit `null` for some collections; treat it like a missing field
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_detail_tolerates_nulls() {
        let json = r#"{
            "id": 550,
            "title": "Fight Club",
            "tagline": null,
            "overview": null,
            "genres": null,
            "credits": null,
            "videos": null,
            "spoken_languages": null
        }"#;

        let movie: MovieDetail = serde_json::from_str(json).unwrap();
        assert_eq!(movie.id, 550);
        assert!(movie.tagline.is_empty());
        assert!(movie.genres.is_empty());
        assert!(movie.credits.cast.is_empty());
        assert!(movie.first_video().is_none());
    }

    #[test]
    fn test_year_from_release_date() {
        let mut movie = MovieDetail {
            release_date: Some("1999-10-15".into()),
            ..Default::default()
        };
        assert_eq!(movie.year(), Some("1999"));

        movie.release_date = Some(String::new());
        assert_eq!(movie.year(), None);

        movie.release_date = None;
        assert_eq!(movie.year(), None);
    }

    #[test]
    fn test_short_character() {
        let member = CastMember {
            id: 1,
            name: "Robert Pattinson".into(),
            character: "Bruce Wayne / The Batman".into(),
            profile_path: None,
            order: 0,
        };
        assert_eq!(member.short_character(), "Bruce Wayne");
        assert!(!member.has_portrait());
    }

    #[test]
    fn test_video_kind_renamed() {
        let video: Video =
            serde_json::from_str(r#"{"key":"mqqft2x_Aa4","site":"YouTube","type":"Trailer"}"#)
                .unwrap();
        assert_eq!(video.kind, "Trailer");
        assert_eq!(video.embed_url(), "https://www.youtube.com/embed/mqqft2x_Aa4");
    }

    #[test]
    fn test_imdb_and_homepage_urls() {
        let movie = MovieDetail {
            imdb_id: Some("tt0137523".into()),
            homepage: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            movie.imdb_url().as_deref(),
            Some("https://www.imdb.com/title/tt0137523")
        );
        assert!(movie.homepage_url().is_none());
    }

    #[test]
    fn test_list_kind_paths() {
        assert_eq!(ListKind::Favorite.list_path(), "favorite/movies");
        assert_eq!(ListKind::Watchlist.list_path(), "watchlist/movies");
        assert_eq!(ListKind::Favorite.write_path(), "favorite");
        assert_eq!(ListKind::Watchlist.write_path(), "watchlist");
    }

    #[test]
    fn test_movie_page_contains() {
        let page = MoviePage {
            page: 1,
            results: vec![MovieSummary {
                id: 42,
                title: "Answer".into(),
                release_date: None,
                poster_path: None,
                vote_average: 0.0,
            }],
            total_results: 1,
            total_pages: 1,
        };
        assert!(page.contains(42));
        assert!(!page.contains(7));
    }
}
