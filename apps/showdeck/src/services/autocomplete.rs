//! Debounced, cancellable search-as-you-type controller.
//!
//! Each keystroke supersedes the previous one: the pending debounce timer
//! is invalidated and any in-flight search is cancelled. A monotonically
//! increasing sequence number stamps every keystroke; debounce timers and
//! search completions presenting a stale sequence are discarded, so a slow
//! response can never overwrite fresher results.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::models::Show;
use crate::services::tvmaze::CatalogSource;

/// Tuning knobs for the controller.
#[derive(Debug, Clone)]
pub struct AutocompleteConfig {
    /// Minimum trimmed term length before a search is issued.
    pub min_chars: usize,
    /// Quiet period after the last keystroke before the search fires.
    pub debounce: Duration,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            min_chars: 2,
            debounce: Duration::from_millis(250),
        }
    }
}

/// Visible state of the suggestion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// List hidden, nothing pending.
    Closed,
    /// Debounce timer pending.
    Opening,
    /// Search request in flight.
    Loading,
    /// Suggestions available.
    Ready,
    /// Search completed with no hits.
    Empty,
}

/// What a committed search resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The raw typed term.
    Term(String),
    /// A highlighted suggestion.
    Show { id: u64, name: String },
}

#[derive(Debug)]
struct ControllerState {
    term: String,
    phase: Phase,
    suggestions: Vec<Show>,
    highlighted: Option<usize>,
    /// Bumped on every keystroke, submit, close, and dispose. A debounce
    /// timer or search completion carrying an older value is stale.
    seq: u64,
    inflight: Option<CancellationToken>,
}

impl ControllerState {
    /// Invalidate pending timers and cancel the in-flight search, if any.
    fn supersede(&mut self) {
        self.seq += 1;
        if let Some(token) = self.inflight.take() {
            token.cancel();
        }
    }
}

/// Autocomplete controller for one search box.
///
/// Create one per rendered search input and call [`Autocomplete::dispose`]
/// when the owning view goes away.
pub struct Autocomplete {
    source: Arc<dyn CatalogSource>,
    config: AutocompleteConfig,
    state: Mutex<ControllerState>,
}

impl Autocomplete {
    /// Create a new controller over `source`.
    pub fn new(source: Arc<dyn CatalogSource>, config: AutocompleteConfig) -> Self {
        Self {
            source,
            config,
            state: Mutex::new(ControllerState {
                term: String::new(),
                phase: Phase::Closed,
                suggestions: Vec::new(),
                highlighted: None,
                seq: 0,
                inflight: None,
            }),
        }
    }

    /// Create a new controller wrapped in Arc for shared access.
    pub fn new_shared(source: Arc<dyn CatalogSource>, config: AutocompleteConfig) -> Arc<Self> {
        Arc::new(Self::new(source, config))
    }

    /// Record a keystroke.
    ///
    /// Supersedes any pending debounce timer and cancels any in-flight
    /// search. A trimmed term below the configured minimum closes the list
    /// and clears suggestions; otherwise a fresh debounce timer starts.
    pub async fn set_term(self: &Arc<Self>, term: &str) {
        let mut state = self.state.lock().await;
        state.term = term.to_string();
        state.supersede();
        state.highlighted = None;

        let query = term.trim().to_string();
        if query.chars().count() < self.config.min_chars {
            state.phase = Phase::Closed;
            state.suggestions.clear();
            return;
        }

        state.phase = Phase::Opening;
        let seq = state.seq;
        drop(state);

        let controller = Arc::clone(self);
        let delay = self.config.debounce;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            controller.run_search(seq, query).await;
        });
    }

    /// Issue the debounced search unless this timer has been superseded.
    async fn run_search(&self, seq: u64, query: String) {
        let token = CancellationToken::new();
        {
            let mut state = self.state.lock().await;
            if state.seq != seq {
                return;
            }
            state.phase = Phase::Loading;
            state.inflight = Some(token.clone());
        }

        let result = self.source.search_shows(&query, token).await;

        let mut state = self.state.lock().await;
        if state.seq != seq {
            // A newer keystroke owns the state now; this response is stale.
            return;
        }
        state.inflight = None;
        match result {
            Ok(shows) => {
                state.phase = if shows.is_empty() {
                    Phase::Empty
                } else {
                    Phase::Ready
                };
                state.suggestions = shows;
                state.highlighted = None;
            }
            Err(e) if e.is_aborted() => {
                // Timed out without being superseded: stop showing the
                // spinner, keep whatever suggestions were already there.
                state.phase = if state.suggestions.is_empty() {
                    Phase::Closed
                } else {
                    Phase::Ready
                };
            }
            Err(e) => {
                tracing::debug!(error = %e, "Suggestion search failed");
                state.phase = Phase::Closed;
                state.suggestions.clear();
                state.highlighted = None;
            }
        }
    }

    /// Move the highlight down, wrapping past the end of the list.
    pub async fn move_down(&self) {
        let mut state = self.state.lock().await;
        let len = state.suggestions.len();
        if len == 0 {
            return;
        }
        state.highlighted = Some(state.highlighted.map_or(0, |i| (i + 1) % len));
    }

    /// Move the highlight up, wrapping past the start of the list.
    pub async fn move_up(&self) {
        let mut state = self.state.lock().await;
        let len = state.suggestions.len();
        if len == 0 {
            return;
        }
        state.highlighted = Some(state.highlighted.map_or(len - 1, |i| (i + len - 1) % len));
    }

    /// Commit the highlighted suggestion, or the raw typed term when
    /// nothing is highlighted.
    ///
    /// Returns what was committed (`None` when the term is empty and
    /// nothing is highlighted). Closes the list and cancels any pending
    /// timer or in-flight request. Navigation is the caller's job.
    pub async fn submit(&self) -> Option<Submission> {
        let mut state = self.state.lock().await;
        state.supersede();

        let submission = match state.highlighted.and_then(|i| state.suggestions.get(i)) {
            Some(show) => Some(Submission::Show {
                id: show.id,
                name: show.name.clone(),
            }),
            None => {
                let term = state.term.trim();
                if term.is_empty() {
                    None
                } else {
                    Some(Submission::Term(term.to_string()))
                }
            }
        };

        state.phase = Phase::Closed;
        state.highlighted = None;
        submission
    }

    /// Close the list (Escape), cancelling any pending timer or request.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.supersede();
        state.phase = Phase::Closed;
        state.highlighted = None;
    }

    /// Release the controller when the owning view unmounts.
    ///
    /// Cancels the pending timer and any in-flight request; safe to call
    /// more than once. Spawned tasks observe the bumped sequence and exit
    /// without touching state.
    pub async fn dispose(&self) {
        self.close().await;
    }

    /// Current phase of the suggestion list.
    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase
    }

    /// Current suggestions.
    pub async fn suggestions(&self) -> Vec<Show> {
        self.state.lock().await.suggestions.clone()
    }

    /// Currently highlighted suggestion index, if any.
    pub async fn highlighted(&self) -> Option<usize> {
        self.state.lock().await.highlighted
    }

    /// The term as last typed.
    pub async fn term(&self) -> String {
        self.state.lock().await.term.clone()
    }
}
