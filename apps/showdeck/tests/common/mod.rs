//! Test infrastructure for showdeck integration tests.
//!
//! Provides a stub of the TVMaze API served on an ephemeral local port for
//! transport-level tests, plus a scripted `CatalogSource` for driving the
//! aggregator and autocomplete engines without HTTP.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::{Path, Query, RawQuery, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use showdeck::error::{AppError, Result};
use showdeck::models::{merge_shows_by_id, Rating, Show};
use showdeck::services::CatalogSource;

/// Build a minimal show value for fixtures and assertions.
pub fn show(id: u64, name: &str, genres: &[&str], rating: Option<f64>) -> Show {
    Show {
        id,
        name: name.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        rating: Rating { average: rating },
        image: None,
        summary: None,
        language: None,
        premiered: None,
        ended: None,
        status: None,
    }
}

/// The same show as raw JSON, for stub responses.
pub fn show_json(id: u64, name: &str, genres: &[&str], rating: Option<f64>) -> Value {
    json!({
        "id": id,
        "name": name,
        "genres": genres,
        "rating": { "average": rating },
    })
}

// =============================================================================
// Stub TVMaze API
// =============================================================================

#[derive(Clone, Default)]
pub struct StubState {
    /// Number of `/shows` listing requests served.
    pub page_hits: Arc<AtomicUsize>,
    /// Number of `/search/shows` requests served.
    pub search_hits: Arc<AtomicUsize>,
}

pub struct StubApi {
    pub base_url: String,
    pub state: StubState,
}

/// Spawn the stub TVMaze API on an ephemeral port.
///
/// Listing pages: page 0 -> ids [1, 2], page 1 -> ids [2, 3] with id 2
/// renamed, page 9 -> 500, anything else -> []. Search: terms containing
/// "office" match two shows. Detail: show 1 with cast and episodes, and the
/// handler insists on both embed directives appearing exactly once. `/slow`
/// stalls before answering; `/error`, `/missing` and `/echo` exercise the
/// transport edge cases.
pub async fn spawn_stub() -> StubApi {
    let state = StubState::default();
    let app = Router::new()
        .route("/shows", get(list_shows))
        .route("/shows/:id", get(show_detail))
        .route("/search/shows", get(search_shows))
        .route("/slow", get(slow))
        .route("/error", get(error_route))
        .route("/missing", get(missing))
        .route("/echo", get(echo))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let addr = listener.local_addr().expect("Failed to read stub address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub server failed");
    });

    StubApi {
        base_url: format!("http://{}", addr),
        state,
    }
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<u32>,
}

async fn list_shows(
    State(state): State<StubState>,
    Query(query): Query<PageQuery>,
) -> axum::response::Response {
    state.page_hits.fetch_add(1, Ordering::SeqCst);
    match query.page.unwrap_or(0) {
        0 => Json(json!([
            show_json(1, "Under the Dome", &["Drama", "Science-Fiction"], Some(6.5)),
            show_json(2, "Person of Interest", &["Action", "Crime"], Some(8.8)),
        ]))
        .into_response(),
        1 => Json(json!([
            show_json(2, "Person of Interest (revised)", &["Action", "Crime"], Some(8.9)),
            show_json(3, "Bitten", &["Drama", "Horror"], Some(7.0)),
        ]))
        .into_response(),
        9 => (StatusCode::INTERNAL_SERVER_ERROR, "listing backend down").into_response(),
        _ => Json(json!([])).into_response(),
    }
}

#[derive(Deserialize)]
struct SearchTermQuery {
    q: Option<String>,
}

async fn search_shows(
    State(state): State<StubState>,
    Query(query): Query<SearchTermQuery>,
) -> Json<Value> {
    state.search_hits.fetch_add(1, Ordering::SeqCst);
    let q = query.q.unwrap_or_default().to_lowercase();
    if q.contains("office") {
        Json(json!([
            { "score": 0.91, "show": show_json(526, "The Office", &["Comedy"], Some(8.5)) },
            { "score": 0.52, "show": show_json(1313, "Office Girls", &["Comedy", "Romance"], None) },
        ]))
    } else {
        Json(json!([]))
    }
}

async fn show_detail(Path(id): Path<u64>, RawQuery(query): RawQuery) -> axum::response::Response {
    // Both embeds must be requested, each exactly once. The keys arrive
    // percent-encoded (embed%5B%5D), so match on prefix/suffix.
    let query = query.unwrap_or_default();
    let embeds: Vec<&str> = query
        .split('&')
        .filter(|pair| pair.starts_with("embed"))
        .collect();
    let cast_count = embeds.iter().filter(|pair| pair.ends_with("=cast")).count();
    let episodes_count = embeds
        .iter()
        .filter(|pair| pair.ends_with("=episodes"))
        .count();
    if cast_count != 1 || episodes_count != 1 {
        return (
            StatusCode::BAD_REQUEST,
            "expected embed[]=cast and embed[]=episodes exactly once",
        )
            .into_response();
    }

    if id != 1 {
        return (StatusCode::NOT_FOUND, "").into_response();
    }

    let mut detail = show_json(1, "Under the Dome", &["Drama", "Science-Fiction"], Some(6.5));
    detail["officialSite"] = json!("https://www.cbs.com/shows/under-the-dome/");
    detail["_embedded"] = json!({
        "cast": [
            { "person": { "name": "Mike Vogel" }, "character": { "name": "Dale Barbara" } },
            { "person": { "name": "Rachelle Lefevre" }, "character": { "name": "Julia Shumway" } },
        ],
        "episodes": [
            { "id": 1, "name": "Pilot", "season": 1, "number": 1, "airdate": "2013-06-24" },
            { "id": 2, "name": "The Fire", "season": 1, "number": 2, "airdate": "" },
        ],
    });
    Json(detail).into_response()
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(500)).await;
    Json(json!([]))
}

async fn error_route() -> axum::response::Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

async fn missing() -> axum::response::Response {
    (StatusCode::NOT_FOUND, "").into_response()
}

async fn echo(RawQuery(query): RawQuery) -> Json<Value> {
    Json(json!({ "query": query.unwrap_or_default() }))
}

// =============================================================================
// Scripted catalog source
// =============================================================================

/// How a scripted call should fail.
#[derive(Debug, Clone, Copy)]
pub enum ScriptedFailure {
    Abort,
    Http,
}

/// Scripted `CatalogSource` for engine tests: canned pages and search
/// results, optional delays, optional failures, and call counters.
#[derive(Default)]
pub struct ScriptedCatalog {
    pages: Mutex<HashMap<u32, Vec<Show>>>,
    search_results: Mutex<HashMap<String, Vec<Show>>>,
    index_delay: Mutex<Option<Duration>>,
    search_delay: Mutex<Option<Duration>>,
    fail_index: Mutex<Option<ScriptedFailure>>,
    fail_search: Mutex<Option<ScriptedFailure>>,
    index_calls: AtomicUsize,
    search_calls: AtomicUsize,
    seen_queries: Mutex<Vec<String>>,
}

impl ScriptedCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn put_page(&self, page: u32, shows: Vec<Show>) {
        self.pages.lock().unwrap().insert(page, shows);
    }

    pub fn put_search(&self, query: &str, shows: Vec<Show>) {
        self.search_results
            .lock()
            .unwrap()
            .insert(query.to_string(), shows);
    }

    pub fn delay_index(&self, delay: Duration) {
        *self.index_delay.lock().unwrap() = Some(delay);
    }

    pub fn delay_search(&self, delay: Duration) {
        *self.search_delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_index_with(&self, failure: ScriptedFailure) {
        *self.fail_index.lock().unwrap() = Some(failure);
    }

    pub fn fail_search_with(&self, failure: ScriptedFailure) {
        *self.fail_search.lock().unwrap() = Some(failure);
    }

    pub fn clear_index_failure(&self) {
        *self.fail_index.lock().unwrap() = None;
    }

    pub fn index_calls(&self) -> usize {
        self.index_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Queries actually issued, in order.
    pub fn seen_queries(&self) -> Vec<String> {
        self.seen_queries.lock().unwrap().clone()
    }

    fn failure_error(failure: ScriptedFailure) -> AppError {
        match failure {
            ScriptedFailure::Abort => AppError::Aborted,
            ScriptedFailure::Http => AppError::Http {
                status: 500,
                url: "http://stub.invalid/shows".to_string(),
                message: "boom".to_string(),
            },
        }
    }
}

#[async_trait]
impl CatalogSource for ScriptedCatalog {
    async fn fetch_shows_index(&self, pages: &[u32]) -> Result<Vec<Show>> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.index_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(failure) = *self.fail_index.lock().unwrap() {
            return Err(Self::failure_error(failure));
        }

        let scripted = self.pages.lock().unwrap();
        let mut merged = Vec::new();
        merge_shows_by_id(
            &mut merged,
            pages
                .iter()
                .flat_map(|p| scripted.get(p).cloned().unwrap_or_default()),
        );
        Ok(merged)
    }

    async fn search_shows(&self, query: &str, cancel: CancellationToken) -> Result<Vec<Show>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_queries.lock().unwrap().push(query.to_string());

        let delay = *self.search_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::select! {
                _ = cancel.cancelled() => return Err(AppError::Aborted),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        if cancel.is_cancelled() {
            return Err(AppError::Aborted);
        }
        if let Some(failure) = *self.fail_search.lock().unwrap() {
            return Err(Self::failure_error(failure));
        }

        Ok(self
            .search_results
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }
}
