//! TMDB (The Movie Database) API client
//!
//! Movie metadata, recommendations, and the account lists (favorites,
//! watchlist) of the signed-in user.
//! API docs: https://developer.themoviedb.org/docs

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::{ListKind, MovieDetail, MoviePage};

/// Default TMDB v3 endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Keys at least this long are v4 read access tokens and go in a Bearer header
const BEARER_MIN_LEN: usize = 64;

/// TMDB API error types
#[derive(Error, Debug)]
pub enum TmdbError {
    #[error("Resource not found (404)")]
    NotFound,

    #[error("Unauthorized (401): check the API key or session")]
    Unauthorized,

    #[error("Rate limited (429)")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

/// Body of a favorite/watchlist write
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListWrite {
    pub media_type: &'static str,
    pub media_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watchlist: Option<bool>,
}

impl ListWrite {
    /// Body that sets membership of a movie in the given list
    pub fn movie(kind: ListKind, media_id: u64, value: bool) -> Self {
        let (favorite, watchlist) = match kind {
            ListKind::Favorite => (Some(value), None),
            ListKind::Watchlist => (None, Some(value)),
        };
        Self {
            media_type: "movie",
            media_id,
            favorite,
            watchlist,
        }
    }
}

/// TMDB API client
#[derive(Debug, Clone)]
pub struct TmdbClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl TmdbClient {
    /// Create a new TMDB client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Attach credentials: Bearer header for v4 tokens, `api_key` query param otherwise
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        if self.api_key.len() >= BEARER_MIN_LEN {
            request.header("Authorization", format!("Bearer {}", self.api_key))
        } else {
            request.query(&[("api_key", self.api_key.as_str())])
        }
    }

    /// Send a request and hand back any 2xx response. No retries: failures surface as-is.
    async fn dispatch(&self, request: RequestBuilder) -> Result<Response, TmdbError> {
        let response = self
            .authorize(request)
            .header("Accept", "application/json")
            .send()
            .await?;
        check_status(response)
    }

    /// Send a request and decode a JSON body
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TmdbError> {
        let body = self.dispatch(request).await?.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| TmdbError::InvalidResponse(format!("JSON parse error: {}", e)))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, TmdbError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%endpoint, "TMDB GET");
        self.send(self.client.get(&url).query(query)).await
    }

    /// Get movie details by ID, with videos and credits appended
    pub async fn movie(&self, id: u64) -> Result<MovieDetail, TmdbError> {
        let endpoint = format!("/movie/{}", id);
        self.get(
            &endpoint,
            &[("append_to_response", "videos,credits".to_string())],
        )
        .await
    }

    /// Get recommendations for a movie
    pub async fn recommendations(&self, movie_id: u64, page: u32) -> Result<MoviePage, TmdbError> {
        let endpoint = format!("/movie/{}/recommendations", movie_id);
        self.get(&endpoint, &[("page", page.to_string())]).await
    }

    /// Get one page of the user's favorite or watchlist movies
    pub async fn account_list(
        &self,
        kind: ListKind,
        account_id: u64,
        session_id: &str,
        page: u32,
    ) -> Result<MoviePage, TmdbError> {
        let endpoint = format!("/account/{}/{}", account_id, kind.list_path());
        self.get(
            &endpoint,
            &[
                ("session_id", session_id.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }

    /// Add a movie to (or remove it from) the user's favorite or watchlist
    ///
    /// Only success or failure is consumed; the response body is not inspected.
    pub async fn set_list_membership(
        &self,
        kind: ListKind,
        account_id: u64,
        session_id: &str,
        movie_id: u64,
        value: bool,
    ) -> Result<(), TmdbError> {
        let url = format!("{}/account/{}/{}", self.base_url, account_id, kind.write_path());
        let body = ListWrite::movie(kind, movie_id, value);
        tracing::debug!(list = %kind, movie_id, value, "TMDB POST");

        let request = self
            .client
            .post(&url)
            .query(&[("session_id", session_id)])
            .json(&body);
        self.dispatch(request).await?;
        Ok(())
    }
}

/// Map a TMDB status code onto the client's error type
fn check_status(response: Response) -> Result<Response, TmdbError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(TmdbError::NotFound),
        StatusCode::UNAUTHORIZED => Err(TmdbError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => Err(TmdbError::RateLimited),
        status => Err(TmdbError::ServerError(status.as_u16())),
    }
}
