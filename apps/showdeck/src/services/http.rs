//! HTTP transport for the catalog API.
//!
//! A GET-only client over reqwest with query-parameter encoding, a
//! per-call timeout, and support for an externally owned cancellation
//! token. Stateless per call; no caching happens at this layer.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};

/// Default per-call timeout for listing and search requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Options for a single GET request.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Query parameters, appended in insertion order. Callers omit a
    /// parameter entirely rather than passing an empty value.
    pub params: Vec<(&'static str, String)>,
    /// Per-call timeout; [`DEFAULT_TIMEOUT`] when unset.
    pub timeout: Option<Duration>,
    /// Externally owned cancellation token. Cancellation and timeout both
    /// surface as [`AppError::Aborted`], whichever fires first.
    pub cancel: Option<CancellationToken>,
}

/// GET-only HTTP client bound to a base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new client for the given base URL (trailing slash trimmed).
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Perform a GET request and decode the JSON response body.
    ///
    /// Non-2xx responses fail with [`AppError::Http`] carrying the status,
    /// the resolved URL, and the response body text (falling back to the
    /// status line when the body is empty).
    pub async fn get<T: DeserializeOwned>(&self, path: &str, options: GetOptions) -> Result<T> {
        let GetOptions {
            params,
            timeout,
            cancel,
        } = options;
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let cancel = cancel.unwrap_or_default();

        if cancel.is_cancelled() {
            return Err(AppError::Aborted);
        }

        let url = self.build_url(path);
        tracing::trace!(url = %url, ?timeout, "GET");
        let request = self.client.get(url.as_str()).query(&params);

        let call = async {
            let response = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    AppError::Aborted
                } else {
                    AppError::Internal(format!("GET {} failed: {}", url, e))
                }
            })?;

            let status = response.status();
            let resolved_url = response.url().to_string();

            if !status.is_success() {
                let message = match response.text().await {
                    Ok(body) if !body.is_empty() => body,
                    _ => format!(
                        "{} {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("Unknown")
                    ),
                };
                return Err(AppError::Http {
                    status: status.as_u16(),
                    url: resolved_url,
                    message,
                });
            }

            response
                .json::<T>()
                .await
                .map_err(|e| AppError::Decode(e.to_string()))
        };

        // The timeout spans the whole call, body included; external
        // cancellation races it.
        tokio::select! {
            _ = cancel.cancelled() => Err(AppError::Aborted),
            result = tokio::time::timeout(timeout, call) => match result {
                Err(_elapsed) => Err(AppError::Aborted),
                Ok(result) => result,
            },
        }
    }

    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}
