//! TVMaze catalog service client.
//!
//! Typed wrappers over the HTTP transport for the show listing, fuzzy
//! search, and show detail endpoints.

use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::ApiConfig;
use crate::error::Result;
use crate::models::{merge_shows_by_id, SearchHit, Show, ShowDetail};
use crate::services::http::{GetOptions, HttpClient};

/// Remote source of catalog data.
///
/// The show index aggregator and the autocomplete controller depend on
/// this seam rather than on the concrete client, so tests can script
/// responses without a server.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch and merge several listing pages; fails if any page fails.
    async fn fetch_shows_index(&self, pages: &[u32]) -> Result<Vec<Show>>;

    /// Free-text fuzzy search over the catalog, cancellable via `cancel`.
    async fn search_shows(&self, query: &str, cancel: CancellationToken) -> Result<Vec<Show>>;
}

/// TVMaze API client.
pub struct TvMazeClient {
    http: HttpClient,
    listing_timeout: Duration,
    detail_timeout: Duration,
}

impl TvMazeClient {
    /// Create a new client for the configured API base URL.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(&config.base_url)?,
            listing_timeout: config.listing_timeout(),
            detail_timeout: config.detail_timeout(),
        })
    }

    /// Create a new client wrapped in Arc for shared access.
    pub fn new_shared(config: &ApiConfig) -> Result<Arc<Self>> {
        Ok(Arc::new(Self::new(config)?))
    }

    /// Fetch one page of the show listing.
    ///
    /// An empty page signals the end of the catalog.
    pub async fn fetch_shows_page(&self, page: u32) -> Result<Vec<Show>> {
        tracing::debug!(page, "Fetching show listing page");

        self.http
            .get(
                "/shows",
                GetOptions {
                    params: vec![("page", page.to_string())],
                    timeout: Some(self.listing_timeout),
                    ..Default::default()
                },
            )
            .await
    }

    /// Fetch a show's detail with cast and episodes embedded.
    pub async fn get_show(&self, id: u64) -> Result<ShowDetail> {
        tracing::debug!(show_id = id, "Fetching show detail");

        self.http
            .get(
                &format!("/shows/{}", id),
                GetOptions {
                    params: vec![
                        ("embed[]", "cast".to_string()),
                        ("embed[]", "episodes".to_string()),
                    ],
                    timeout: Some(self.detail_timeout),
                    ..Default::default()
                },
            )
            .await
    }
}

#[async_trait]
impl CatalogSource for TvMazeClient {
    async fn fetch_shows_index(&self, pages: &[u32]) -> Result<Vec<Show>> {
        tracing::debug!(?pages, "Fetching show index pages");

        let results = try_join_all(pages.iter().map(|p| self.fetch_shows_page(*p))).await?;

        // try_join_all yields page results in requested order regardless of
        // completion order, so the merge is deterministic: first appearance
        // fixes a show's position, later pages win on value.
        let mut merged = Vec::new();
        merge_shows_by_id(&mut merged, results.into_iter().flatten());
        Ok(merged)
    }

    async fn search_shows(&self, query: &str, cancel: CancellationToken) -> Result<Vec<Show>> {
        tracing::debug!(query = %query, "Searching shows");

        let hits: Vec<SearchHit> = self
            .http
            .get(
                "/search/shows",
                GetOptions {
                    params: vec![("q", query.to_string())],
                    timeout: Some(self.listing_timeout),
                    cancel: Some(cancel),
                },
            )
            .await?;

        Ok(hits.into_iter().map(|hit| hit.show).collect())
    }
}
