//! Search session state machine.
//!
//! ```text
//!            begin_search              complete_search(Ok)
//! ┌──────┐ ─────────────► ┌───────────┐ ─────────────────► ┌───────────┐
//! │ Idle │                │ Searching │                    │ Populated │
//! └──────┘                └─────┬─────┘ ◄───────────────── └───────────┘
//!                               │         begin_search
//!         complete_search(Err)  ▼
//!                          ┌────────┐  begin_search
//!                          │ Failed ├──────────────► Searching
//!                          └────────┘
//! ```
//!
//! Every submission gets a [`SearchTicket`] carrying a monotonically
//! increasing token. Only the response for the newest ticket may commit;
//! late answers to earlier submissions are dropped.

use crate::actions::Favorites;
use crate::error::{ConsoleError, Result};
use crate::result_set::{ResultSet, SearchSnapshot};
use crate::view::{RenderedView, SortMode, SourceFilter, ViewState, render_view};
use unisearch_client::{ClientError, SearchBackend, SearchResponse};

/// Identifies one search submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    token: u64,
    query: String,
}

impl SearchTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Where the session is in its search lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing searched yet.
    #[default]
    Idle,
    /// Waiting for the response to `ticket`.
    Searching(SearchTicket),
    /// The newest response is installed.
    Populated,
    /// The newest search failed; the form accepts a new submission.
    Failed { message: String },
}

/// Outcome of offering a response to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    /// The response was installed. `total` may be zero: an empty result is
    /// a normal outcome, not a failure.
    Populated { total: usize },
    /// The newest search failed.
    Failed { message: String },
    /// The response belonged to an older submission and was discarded.
    Stale,
}

/// Owns all per-session state: the current results, sticky view
/// preferences and favorites.
#[derive(Debug, Default)]
pub struct SessionController {
    state: SessionState,
    snapshot: Option<SearchSnapshot>,
    view: ViewState,
    favorites: Favorites,
    last_token: u64,
}

impl SessionController {
    /// Start a session with the given initial view preferences.
    pub fn new(view: ViewState) -> Self {
        Self {
            view,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Whether the result area should show a loading indicator.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Searching(_))
    }

    /// The installed search, if any.
    pub fn snapshot(&self) -> Option<&SearchSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn results(&self) -> Option<&ResultSet> {
        self.snapshot.as_ref().map(|s| &s.results)
    }

    /// The query of the installed or in-flight search.
    pub fn query(&self) -> Option<&str> {
        match &self.state {
            SessionState::Searching(ticket) => Some(ticket.query()),
            _ => self.snapshot.as_ref().map(|s| s.query.as_str()),
        }
    }

    pub fn trending(&self) -> &[String] {
        self.snapshot.as_ref().map(|s| s.trending.as_slice()).unwrap_or(&[])
    }

    pub fn recommendations(&self) -> &[String] {
        self.snapshot
            .as_ref()
            .map(|s| s.recommendations.as_slice())
            .unwrap_or(&[])
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn set_filter(&mut self, filter: SourceFilter) {
        tracing::debug!(%filter, "source filter changed");
        self.view.filter = filter;
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        tracing::debug!(%sort, "sort mode changed");
        self.view.sort = sort;
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn favorites_mut(&mut self) -> &mut Favorites {
        &mut self.favorites
    }

    /// Submit a new query.
    ///
    /// Clears the previous results and derived lists immediately, so stale
    /// results never show next to the loading indicator, and issues a ticket
    /// that supersedes every earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::InvalidInput`] for a blank query; the session
    /// is left unchanged.
    pub fn begin_search(&mut self, query: &str) -> Result<SearchTicket> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ConsoleError::InvalidInput("search query is empty".into()));
        }
        self.last_token += 1;
        let ticket = SearchTicket {
            token: self.last_token,
            query: query.to_string(),
        };
        if let SessionState::Searching(previous) = &self.state {
            tracing::debug!(superseded = previous.token, "search superseded");
        }
        self.snapshot = None;
        self.state = SessionState::Searching(ticket.clone());
        tracing::info!(token = ticket.token, "search started");
        Ok(ticket)
    }

    /// Whether `ticket` is the one the session is waiting on.
    pub fn is_current(&self, ticket: &SearchTicket) -> bool {
        matches!(&self.state, SessionState::Searching(current) if current == ticket)
    }

    /// Offer the backend's answer for `ticket`.
    ///
    /// Installs the result set, trending and recommendations together when
    /// `ticket` is current; otherwise discards the answer.
    pub fn complete_search(
        &mut self,
        ticket: &SearchTicket,
        outcome: std::result::Result<SearchResponse, ClientError>,
    ) -> Commit {
        if !self.is_current(ticket) {
            tracing::debug!(token = ticket.token, latest = self.last_token, "stale response discarded");
            return Commit::Stale;
        }
        match outcome {
            Ok(response) => {
                let snapshot = SearchSnapshot::from_response(ticket.query(), response);
                let total = snapshot.results.total_items();
                tracing::info!(token = ticket.token, total, "search populated");
                self.snapshot = Some(snapshot);
                self.state = SessionState::Populated;
                Commit::Populated { total }
            }
            Err(e) => {
                tracing::warn!(token = ticket.token, error = %e, "search failed");
                let message = format!("Search failed: {e}");
                self.state = SessionState::Failed {
                    message: message.clone(),
                };
                Commit::Failed { message }
            }
        }
    }

    /// Run one complete search round trip against `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::InvalidInput`] for a blank query. Backend
    /// failures are reported as [`Commit::Failed`].
    pub async fn search<B: SearchBackend>(&mut self, backend: &B, query: &str) -> Result<Commit> {
        let ticket = self.begin_search(query)?;
        let outcome = backend.search(ticket.query()).await;
        Ok(self.complete_search(&ticket, outcome))
    }

    /// Apply the sticky view preferences to the installed results.
    pub fn render(&self) -> RenderedView {
        match &self.snapshot {
            Some(snapshot) => render_view(&snapshot.results, &self.view, &snapshot.query),
            None => RenderedView::default(),
        }
    }
}
