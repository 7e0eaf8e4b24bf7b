//! Cached catalog reads for the movie screen
//!
//! Wraps [`TmdbClient`] with one [`QueryCache`] per read kind. Keys carry
//! every argument of the request, so a response can only ever land in the
//! entry it was requested for.

use std::sync::Arc;
use std::time::Duration;

use crate::api::TmdbClient;
use crate::models::{ListKind, MovieDetail, MoviePage};
use crate::query::{QueryCache, QueryResult, QueryState};

/// Key of an account list read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListKey {
    pub kind: ListKind,
    pub account_id: u64,
    pub session_id: String,
    pub page: u32,
}

/// Key of a recommendations read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecommendationsKey {
    pub movie_id: u64,
    pub page: u32,
}

/// One read the screen wants performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRequest {
    Movie(u64),
    List(ListKey),
    Recommendations(RecommendationsKey),
}

/// TMDB client plus the caches the screen reads from
#[derive(Debug, Clone)]
pub struct Catalog {
    client: TmdbClient,
    movies: Arc<QueryCache<u64, MovieDetail>>,
    lists: Arc<QueryCache<ListKey, MoviePage>>,
    recommendations: Arc<QueryCache<RecommendationsKey, MoviePage>>,
}

impl Catalog {
    pub fn new(client: TmdbClient, max_age: Duration) -> Self {
        Self {
            client,
            movies: Arc::new(QueryCache::new(max_age)),
            lists: Arc::new(QueryCache::new(max_age)),
            recommendations: Arc::new(QueryCache::new(max_age)),
        }
    }

    /// Underlying client, for writes
    pub fn client(&self) -> &TmdbClient {
        &self.client
    }

    pub async fn movie(&self, id: u64) -> QueryResult<MovieDetail> {
        let client = self.client.clone();
        self.movies
            .ensure(id, move || async move { client.movie(id).await })
            .await
    }

    pub async fn account_list(&self, key: ListKey) -> QueryResult<MoviePage> {
        let client = self.client.clone();
        let (kind, account_id, page) = (key.kind, key.account_id, key.page);
        let session_id = key.session_id.clone();
        self.lists
            .ensure(key, move || async move {
                client.account_list(kind, account_id, &session_id, page).await
            })
            .await
    }

    pub async fn recommendations(&self, key: RecommendationsKey) -> QueryResult<MoviePage> {
        let client = self.client.clone();
        self.recommendations
            .ensure(key, move || async move {
                client.recommendations(key.movie_id, key.page).await
            })
            .await
    }

    /// Run one request; secondary read failures are logged and otherwise ignored
    pub async fn load(&self, request: &QueryRequest) -> bool {
        let outcome = match request {
            QueryRequest::Movie(id) => self.movie(*id).await.map(|_| ()),
            QueryRequest::List(key) => self.account_list(key.clone()).await.map(|_| ()),
            QueryRequest::Recommendations(key) => self.recommendations(*key).await.map(|_| ()),
        };

        match outcome {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(?request, error = %e, "catalog read failed");
                false
            }
        }
    }

    pub fn movie_state(&self, id: u64) -> QueryState<MovieDetail> {
        self.movies.snapshot(&id)
    }

    pub fn list_state(&self, key: &ListKey) -> QueryState<MoviePage> {
        self.lists.snapshot(key)
    }

    pub fn recommendations_state(&self, key: &RecommendationsKey) -> QueryState<MoviePage> {
        self.recommendations.snapshot(key)
    }

    /// Mark a request's entry stale so the next load refetches it
    pub fn invalidate(&self, request: &QueryRequest) {
        match request {
            QueryRequest::Movie(id) => self.movies.invalidate(id),
            QueryRequest::List(key) => self.lists.invalidate(key),
            QueryRequest::Recommendations(key) => self.recommendations.invalidate(key),
        }
    }
}
