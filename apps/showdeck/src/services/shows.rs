//! Show index aggregator.
//!
//! Owns the cumulative deduplicated show collection, the page cursor, and
//! the genre buckets derived from it. One instance typically lives for the
//! whole process, but the state sits in the instance rather than in module
//! globals so tests can construct isolated indexes.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{merge_shows_by_id, Show};
use crate::services::genre::group_by_genre_sorted;
use crate::services::tvmaze::CatalogSource;

/// Point-in-time copy of the aggregator state, for readers and tests.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexSnapshot {
    pub shows: Vec<Show>,
    pub genre_buckets: BTreeMap<String, Vec<Show>>,
    pub next_page: u32,
    pub has_more: bool,
    pub initialized: bool,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
struct IndexState {
    shows: Vec<Show>,
    genre_buckets: BTreeMap<String, Vec<Show>>,
    next_page: u32,
    has_more: bool,
    initialized: bool,
    loading: bool,
    error: Option<String>,
}

impl Default for IndexState {
    fn default() -> Self {
        Self {
            shows: Vec::new(),
            genre_buckets: BTreeMap::new(),
            next_page: 0,
            has_more: true,
            initialized: false,
            loading: false,
            error: None,
        }
    }
}

/// In-memory show index over a remote catalog.
///
/// Single writer (its own operations), any number of readers. The genre
/// buckets are recomputed from the show set after every mutation and never
/// patched incrementally, so they cannot drift.
pub struct ShowIndex {
    source: Arc<dyn CatalogSource>,
    initial_pages: Vec<u32>,
    state: RwLock<IndexState>,
}

impl ShowIndex {
    /// Create an empty index over `source`, with `initial_pages` as the
    /// range `init` requests.
    pub fn new(source: Arc<dyn CatalogSource>, initial_pages: Vec<u32>) -> Self {
        Self {
            source,
            initial_pages,
            state: RwLock::new(IndexState::default()),
        }
    }

    /// Initialize the index from the configured initial page range.
    ///
    /// Idempotent unless `force` is set: once initialized, repeated calls
    /// leave the state untouched. A cancelled fetch leaves the prior state
    /// intact apart from clearing the loading flag; any other failure
    /// records an error message and keeps prior data.
    pub async fn init(&self, force: bool) {
        {
            let mut state = self.state.write().await;
            if state.initialized && !force {
                return;
            }
            state.loading = true;
            state.error = None;
        }

        let result = self.source.fetch_shows_index(&self.initial_pages).await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(shows) => {
                state.next_page = self
                    .initial_pages
                    .iter()
                    .copied()
                    .max()
                    .map_or(0, |p| p + 1);
                state.has_more = true;
                state.genre_buckets = group_by_genre_sorted(&shows);
                state.shows = shows;
                state.initialized = true;
                tracing::debug!(
                    shows = state.shows.len(),
                    next_page = state.next_page,
                    "Show index initialized"
                );
            }
            Err(e) if e.is_aborted() => {}
            Err(e) => {
                tracing::warn!(error = %e, "Initial show load failed");
                state.error = Some(format!("Failed to load shows: {}", e));
            }
        }
    }

    /// Fetch the next `count` pages and merge them into the index.
    ///
    /// No-op while a fetch is outstanding or once the end of the catalog
    /// has been reached. An empty merged result marks the end of the
    /// catalog without advancing the cursor; end-of-catalog is sticky
    /// until a forced re-init.
    pub async fn load_more(&self, count: u32) {
        let start;
        let pages: Vec<u32>;
        {
            let mut state = self.state.write().await;
            if !state.has_more || state.loading {
                return;
            }
            state.loading = true;
            state.error = None;
            start = state.next_page;
            pages = (start..start + count).collect();
        }

        let result = self.source.fetch_shows_index(&pages).await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(next) if next.is_empty() => {
                state.has_more = false;
                tracing::debug!(page = start, "Reached end of catalog");
            }
            Ok(next) => {
                merge_shows_by_id(&mut state.shows, next);
                state.next_page = start + count;
                state.genre_buckets = group_by_genre_sorted(&state.shows);
                tracing::debug!(
                    shows = state.shows.len(),
                    next_page = state.next_page,
                    "Show index extended"
                );
            }
            Err(e) if e.is_aborted() => {}
            Err(e) => {
                tracing::warn!(error = %e, "Loading more shows failed");
                state.error = Some(format!("Failed to load more shows: {}", e));
            }
        }
    }

    /// Copy of the full aggregator state.
    pub async fn snapshot(&self) -> IndexSnapshot {
        let state = self.state.read().await;
        IndexSnapshot {
            shows: state.shows.clone(),
            genre_buckets: state.genre_buckets.clone(),
            next_page: state.next_page,
            has_more: state.has_more,
            initialized: state.initialized,
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    /// Currently populated genre names, derived from the buckets.
    pub async fn top_genres(&self) -> Vec<String> {
        self.state
            .read()
            .await
            .genre_buckets
            .keys()
            .cloned()
            .collect()
    }

    /// Current genre buckets.
    pub async fn genre_buckets(&self) -> BTreeMap<String, Vec<Show>> {
        self.state.read().await.genre_buckets.clone()
    }

    /// Whether a fetch is outstanding.
    pub async fn loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Message of the last failed operation, cleared when a new one starts.
    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Whether further pages may exist.
    pub async fn has_more(&self) -> bool {
        self.state.read().await.has_more
    }
}
