//! End-to-end flow tests
//!
//! Drive a [`MovieScreen`] against a [`Catalog`] backed by a mock TMDB:
//! load -> derive flags -> render state -> toggle -> settle.

use std::time::Duration;

use cinetui::api::TmdbClient;
use cinetui::catalog::{Catalog, QueryRequest};
use cinetui::models::ListKind;
use cinetui::screen::{ActionError, MovieScreen, ViewState, NOT_FOUND_MESSAGE};
use cinetui::session::Session;
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;

const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
const ACCOUNT: u64 = 42;
const SESSION: &str = "sess-1";

// =============================================================================
// Fixtures
// =============================================================================

fn movie_json(id: u64, with_trailer: bool) -> String {
    let videos = if with_trailer {
        json!([{"key": "qtRKdVHc-cE", "name": "Official Trailer", "site": "YouTube", "type": "Trailer"}])
    } else {
        json!([])
    };
    json!({
        "id": id,
        "title": format!("Movie {}", id),
        "tagline": "Tagline",
        "overview": "Overview",
        "poster_path": "/poster.jpg",
        "release_date": "1999-10-15",
        "runtime": 139,
        "vote_average": 8.4,
        "imdb_id": "tt0137523",
        "genres": [{"id": 18, "name": "Drama"}],
        "spoken_languages": [{"iso_639_1": "en", "name": "English"}],
        "credits": {"cast": [
            {"id": 819, "name": "Edward Norton", "character": "Narrator", "profile_path": "/n.jpg", "order": 0}
        ]},
        "videos": {"results": videos}
    })
    .to_string()
}

fn page_json(ids: &[u64]) -> String {
    let results: Vec<_> = ids
        .iter()
        .map(|id| json!({"id": id, "title": format!("Movie {}", id)}))
        .collect();
    json!({
        "page": 1,
        "results": results,
        "total_results": ids.len(),
        "total_pages": 1
    })
    .to_string()
}

async fn mock_get(server: &mut ServerGuard, path: &str, status: usize, body: String) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

fn catalog(server: &ServerGuard) -> Catalog {
    let client = TmdbClient::with_base_url("test_key", server.url());
    Catalog::new(client, Duration::from_secs(300))
}

fn signed_in(movie_id: u64) -> MovieScreen {
    MovieScreen::new(movie_id, Session::authenticated(ACCOUNT, SESSION), IMAGE_BASE)
}

/// Run every read the screen names, then derive its flags
async fn load(screen: &mut MovieScreen, catalog: &Catalog) {
    for request in screen.queries() {
        catalog.load(&request).await;
    }
    screen.sync(catalog);
}

// =============================================================================
// Loading & Caching
// =============================================================================

#[tokio::test]
async fn test_screen_is_loading_before_first_read() {
    let server = Server::new_async().await;
    let catalog = catalog(&server);
    let screen = signed_in(550);

    assert_eq!(screen.view_state(&catalog), ViewState::Loading);
}

#[tokio::test]
async fn test_concurrent_reads_share_one_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/movie/550")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(movie_json(550, true))
        .expect(1)
        .create_async()
        .await;

    let catalog = catalog(&server);
    let request = QueryRequest::Movie(550);
    let (a, b) = tokio::join!(catalog.load(&request), catalog.load(&request));
    assert!(a && b);

    // Fresh data is served from the cache
    assert!(catalog.load(&request).await);

    mock.assert_async().await;
    assert_eq!(catalog.movie_state(550).version, 1);
}

#[tokio::test]
async fn test_anonymous_screen_skips_list_reads() {
    let server = Server::new_async().await;
    let screen = MovieScreen::new(550, Session::Anonymous, IMAGE_BASE);

    let queries = screen.queries();
    assert_eq!(queries.len(), 2);
    assert!(!queries.iter().any(|q| matches!(q, QueryRequest::List(_))));

    let catalog = catalog(&server);
    assert!(matches!(
        screen.begin_toggle(ListKind::Favorite),
        Err(ActionError::NoSession)
    ));
    assert_eq!(screen.view_state(&catalog), ViewState::Loading);
}

// =============================================================================
// Derived Flags & View
// =============================================================================

#[tokio::test]
async fn test_flags_derive_from_account_lists() {
    let mut server = Server::new_async().await;
    let _movie = mock_get(&mut server, "/movie/550", 200, movie_json(550, true)).await;
    let fav_page = page_json(&[13, 550]);
    let _fav = mock_get(&mut server, "/account/42/favorite/movies", 200, fav_page).await;
    let _wl = mock_get(&mut server, "/account/42/watchlist/movies", 200, page_json(&[13])).await;
    let recs_page = page_json(&[807, 680]);
    let _recs = mock_get(&mut server, "/movie/550/recommendations", 200, recs_page).await;

    let catalog = catalog(&server);
    let mut screen = signed_in(550);
    load(&mut screen, &catalog).await;

    assert!(screen.is_favorited());
    assert!(!screen.is_watchlisted());

    let ViewState::Loaded(view) = screen.view_state(&catalog) else {
        panic!("expected loaded screen");
    };
    assert_eq!(view.title_line, "Movie 550 (1999)");
    assert_eq!(view.stars, 4.2);
    assert_eq!(view.runtime_line, "139min / English");
    assert_eq!(view.favorite_label(), "Unfavorite");
    assert_eq!(view.watchlist_marker(), "+1");
    assert_eq!(
        view.poster_url.as_deref(),
        Some("https://image.tmdb.org/t/p/w500/poster.jpg")
    );
    assert_eq!(view.recommendations.as_ref().map(Vec::len), Some(2));
    assert!(view.trailer.as_ref().is_some_and(|t| !t.open));
}

#[tokio::test]
async fn test_detail_error_wins_over_loaded_secondary_reads() {
    let mut server = Server::new_async().await;
    let _movie = mock_get(&mut server, "/movie/550", 404, r#"{"status_code": 34}"#.into()).await;
    let _fav = mock_get(&mut server, "/account/42/favorite/movies", 200, page_json(&[550])).await;
    let _wl = mock_get(&mut server, "/account/42/watchlist/movies", 200, page_json(&[550])).await;
    let _recs = mock_get(&mut server, "/movie/550/recommendations", 200, page_json(&[807])).await;

    let catalog = catalog(&server);
    let mut screen = signed_in(550);
    load(&mut screen, &catalog).await;

    let state = screen.view_state(&catalog);
    assert!(state.is_error());
    assert_eq!(state, ViewState::Error(NOT_FOUND_MESSAGE.to_string()));

    // No loaded movie means nothing to be a member of
    assert!(!screen.is_favorited());
    assert!(!screen.is_watchlisted());
}

#[tokio::test]
async fn test_failed_secondary_reads_degrade_quietly() {
    let mut server = Server::new_async().await;
    let _movie = mock_get(&mut server, "/movie/550", 200, movie_json(550, true)).await;
    let _fav = mock_get(&mut server, "/account/42/favorite/movies", 500, "oops".into()).await;
    let _wl = mock_get(&mut server, "/account/42/watchlist/movies", 401, "{}".into()).await;
    let _recs = mock_get(&mut server, "/movie/550/recommendations", 503, "down".into()).await;

    let catalog = catalog(&server);
    let mut screen = signed_in(550);
    load(&mut screen, &catalog).await;

    let view = screen
        .view_state(&catalog)
        .loaded()
        .cloned()
        .expect("detail loaded");
    assert!(!view.is_favorited);
    assert!(!view.is_watchlisted);
    assert!(view.recommendations.is_none());
}

#[tokio::test]
async fn test_empty_recommendations_hide_section() {
    let mut server = Server::new_async().await;
    let _movie = mock_get(&mut server, "/movie/550", 200, movie_json(550, true)).await;
    let _recs = mock_get(&mut server, "/movie/550/recommendations", 200, page_json(&[])).await;

    let catalog = catalog(&server);
    let mut screen = MovieScreen::new(550, Session::Anonymous, IMAGE_BASE);
    load(&mut screen, &catalog).await;

    let view = screen.view_state(&catalog).loaded().cloned().expect("loaded");
    assert!(view.recommendations.is_none());
}

#[tokio::test]
async fn test_no_videos_means_no_trailer() {
    let mut server = Server::new_async().await;
    let _movie = mock_get(&mut server, "/movie/550", 200, movie_json(550, false)).await;
    let _recs = mock_get(&mut server, "/movie/550/recommendations", 200, page_json(&[])).await;

    let catalog = catalog(&server);
    let mut screen = MovieScreen::new(550, Session::Anonymous, IMAGE_BASE);
    load(&mut screen, &catalog).await;

    assert_eq!(screen.open_trailer(&catalog), Err(ActionError::NoTrailer));
    assert!(!screen.is_trailer_open());
    let view = screen.view_state(&catalog).loaded().cloned().expect("loaded");
    assert!(view.trailer.is_none());
}

#[tokio::test]
async fn test_trailer_opens_and_closes() {
    let mut server = Server::new_async().await;
    let _movie = mock_get(&mut server, "/movie/550", 200, movie_json(550, true)).await;
    let _recs = mock_get(&mut server, "/movie/550/recommendations", 200, page_json(&[])).await;

    let catalog = catalog(&server);
    let mut screen = MovieScreen::new(550, Session::Anonymous, IMAGE_BASE);

    assert_eq!(screen.open_trailer(&catalog), Err(ActionError::NotLoaded));

    load(&mut screen, &catalog).await;
    screen.open_trailer(&catalog).unwrap();

    let view = screen.view_state(&catalog).loaded().cloned().expect("loaded");
    let trailer = view.trailer.expect("trailer");
    assert!(trailer.open);
    assert_eq!(trailer.embed_url, "https://www.youtube.com/embed/qtRKdVHc-cE");

    screen.close_trailer();
    assert!(!screen.is_trailer_open());
}

#[tokio::test]
async fn test_movie_change_rederives_flags() {
    let mut server = Server::new_async().await;
    let _m1 = mock_get(&mut server, "/movie/550", 200, movie_json(550, true)).await;
    let _m2 = mock_get(&mut server, "/movie/551", 200, movie_json(551, true)).await;
    let _fav = mock_get(&mut server, "/account/42/favorite/movies", 200, page_json(&[550])).await;
    let _wl = mock_get(&mut server, "/account/42/watchlist/movies", 200, page_json(&[551])).await;
    let _r1 = mock_get(&mut server, "/movie/550/recommendations", 200, page_json(&[])).await;
    let _r2 = mock_get(&mut server, "/movie/551/recommendations", 200, page_json(&[])).await;

    let catalog = catalog(&server);
    let mut screen = signed_in(550);
    load(&mut screen, &catalog).await;
    assert!(screen.is_favorited());
    assert!(!screen.is_watchlisted());

    screen.set_movie_id(551);
    assert!(!screen.is_favorited());

    load(&mut screen, &catalog).await;
    assert!(!screen.is_favorited());
    assert!(screen.is_watchlisted());
    assert_eq!(screen.view_state(&catalog).loaded().map(|v| v.id), Some(551));
}

// =============================================================================
// Optimistic Toggles
// =============================================================================

#[tokio::test]
async fn test_toggle_flips_and_survives_until_list_changes() {
    let mut server = Server::new_async().await;
    let _movie = mock_get(&mut server, "/movie/550", 200, movie_json(550, true)).await;
    let fav = server
        .mock("GET", "/account/42/favorite/movies")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(page_json(&[13]))
        .expect(2)
        .create_async()
        .await;
    let _wl = mock_get(&mut server, "/account/42/watchlist/movies", 200, page_json(&[])).await;
    let _recs = mock_get(&mut server, "/movie/550/recommendations", 200, page_json(&[])).await;
    let write = server
        .mock("POST", "/account/42/favorite")
        .match_query(Matcher::UrlEncoded("session_id".into(), SESSION.into()))
        .match_body(Matcher::Json(json!({
            "media_type": "movie",
            "media_id": 550,
            "favorite": true
        })))
        .with_status(201)
        .with_body(r#"{"success": true}"#)
        .expect(1)
        .create_async()
        .await;

    let catalog = catalog(&server);
    let mut screen = signed_in(550);
    load(&mut screen, &catalog).await;
    assert!(!screen.is_favorited());

    let pending = screen.begin_toggle(ListKind::Favorite).unwrap();
    assert!(pending.value);
    let result = pending.send(catalog.client()).await;
    assert!(result.is_ok());
    screen.settle_write(&pending, &result);
    assert!(screen.is_favorited());

    // Nothing the flag depends on changed, so the flip stands
    assert!(!screen.sync(&catalog));
    assert!(screen.is_favorited());

    // A refetched list is the new source of truth
    let key = screen.list_key(ListKind::Favorite).unwrap();
    catalog.invalidate(&QueryRequest::List(key.clone()));
    catalog.load(&QueryRequest::List(key)).await;
    assert!(screen.sync(&catalog));
    assert!(!screen.is_favorited());

    write.assert_async().await;
    fav.assert_async().await;
}

#[tokio::test]
async fn test_failed_write_still_flips() {
    let mut server = Server::new_async().await;
    let _movie = mock_get(&mut server, "/movie/550", 200, movie_json(550, true)).await;
    let _fav = mock_get(&mut server, "/account/42/favorite/movies", 200, page_json(&[])).await;
    let _wl = mock_get(&mut server, "/account/42/watchlist/movies", 200, page_json(&[550])).await;
    let _recs = mock_get(&mut server, "/movie/550/recommendations", 200, page_json(&[])).await;
    let write = server
        .mock("POST", "/account/42/watchlist")
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let catalog = catalog(&server);
    let mut screen = signed_in(550);
    load(&mut screen, &catalog).await;
    assert!(screen.is_watchlisted());

    let pending = screen.begin_toggle(ListKind::Watchlist).unwrap();
    assert!(!pending.value);
    let result = pending.send(catalog.client()).await;
    assert!(result.is_err());
    screen.settle_write(&pending, &result);

    assert!(!screen.is_watchlisted());
    write.assert_async().await;
}

#[tokio::test]
async fn test_rapid_double_toggle_sends_two_writes() {
    let mut server = Server::new_async().await;
    let _movie = mock_get(&mut server, "/movie/550", 200, movie_json(550, true)).await;
    let _fav = mock_get(&mut server, "/account/42/favorite/movies", 200, page_json(&[])).await;
    let _wl = mock_get(&mut server, "/account/42/watchlist/movies", 200, page_json(&[])).await;
    let _recs = mock_get(&mut server, "/movie/550/recommendations", 200, page_json(&[])).await;
    let write = server
        .mock("POST", "/account/42/favorite")
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({"favorite": true})))
        .with_status(201)
        .with_body(r#"{"success": true}"#)
        .expect(2)
        .create_async()
        .await;

    let catalog = catalog(&server);
    let mut screen = signed_in(550);
    load(&mut screen, &catalog).await;

    // Both begin before either settles, so both ask for the same value
    let first = screen.begin_toggle(ListKind::Favorite).unwrap();
    let second = screen.begin_toggle(ListKind::Favorite).unwrap();
    assert_eq!(first.value, second.value);

    let (r1, r2) = tokio::join!(first.send(catalog.client()), second.send(catalog.client()));
    screen.settle_write(&first, &r1);
    screen.settle_write(&second, &r2);

    // Two flips cancel out
    assert!(!screen.is_favorited());
    write.assert_async().await;
}

#[tokio::test]
async fn test_write_for_previous_movie_is_dropped() {
    let mut server = Server::new_async().await;
    let _m1 = mock_get(&mut server, "/movie/550", 200, movie_json(550, true)).await;
    let _fav = mock_get(&mut server, "/account/42/favorite/movies", 200, page_json(&[])).await;
    let _wl = mock_get(&mut server, "/account/42/watchlist/movies", 200, page_json(&[])).await;
    let _r1 = mock_get(&mut server, "/movie/550/recommendations", 200, page_json(&[])).await;
    let _write = server
        .mock("POST", "/account/42/favorite")
        .match_query(Matcher::Any)
        .with_status(201)
        .with_body(r#"{"success": true}"#)
        .create_async()
        .await;

    let catalog = catalog(&server);
    let mut screen = signed_in(550);
    load(&mut screen, &catalog).await;

    let pending = screen.begin_toggle(ListKind::Favorite).unwrap();
    screen.set_movie_id(551);
    let result = pending.send(catalog.client()).await;
    screen.settle_write(&pending, &result);

    assert!(!screen.is_favorited());
}
