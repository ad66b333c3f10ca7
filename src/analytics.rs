//! Dashboard data: on-demand snapshots of search and click analytics.

use crate::actions::Notice;
use chrono::{DateTime, Utc};
use unisearch_client::{AnalyticsResponse, ClientError, SearchBackend};

/// Analytics as of one fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSnapshot {
    /// `(term, count)` pairs in backend order.
    pub trending: Vec<(String, u64)>,
    /// `(url, count)` pairs in backend order.
    pub most_clicked: Vec<(String, u64)>,
    pub fetched_at: DateTime<Utc>,
}

impl AnalyticsSnapshot {
    pub fn from_response(response: AnalyticsResponse) -> Self {
        Self {
            trending: response.trending,
            most_clicked: response.most_clicked,
            fetched_at: Utc::now(),
        }
    }

    /// First `n` trending terms.
    pub fn top_trending(&self, n: usize) -> &[(String, u64)] {
        &self.trending[..n.min(self.trending.len())]
    }

    /// First `n` most clicked urls.
    pub fn top_clicked(&self, n: usize) -> &[(String, u64)] {
        &self.most_clicked[..n.min(self.most_clicked.len())]
    }
}

/// Identifies one dashboard fetch. Only the newest may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Dashboard visibility plus the last fetched snapshot.
#[derive(Debug, Default)]
pub struct AnalyticsAdapter {
    visible: bool,
    snapshot: Option<AnalyticsSnapshot>,
    generation: u64,
}

impl AnalyticsAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn snapshot(&self) -> Option<&AnalyticsSnapshot> {
        self.snapshot.as_ref()
    }

    /// Flip visibility. Returns a ticket when the dashboard became visible
    /// and a fresh fetch is due.
    pub fn toggle(&mut self) -> Option<FetchTicket> {
        self.visible = !self.visible;
        tracing::debug!(visible = self.visible, "dashboard toggled");
        if self.visible {
            self.generation += 1;
            Some(FetchTicket(self.generation))
        } else {
            None
        }
    }

    /// Whether `ticket` is the newest fetch and the dashboard is still open.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.visible && ticket.0 == self.generation
    }

    /// Install the outcome of the fetch identified by `ticket`.
    ///
    /// A successful fetch replaces the snapshot wholesale. A failure keeps
    /// the previous snapshot and yields an error notice. Outcomes for
    /// superseded tickets are dropped and yield `None`.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<AnalyticsResponse, ClientError>,
    ) -> Option<Notice> {
        if ticket.0 != self.generation {
            tracing::debug!(ticket = ticket.0, latest = self.generation, "stale analytics discarded");
            return None;
        }
        match outcome {
            Ok(response) => {
                let snapshot = AnalyticsSnapshot::from_response(response);
                tracing::info!(
                    trending = snapshot.trending.len(),
                    most_clicked = snapshot.most_clicked.len(),
                    "analytics refreshed"
                );
                self.snapshot = Some(snapshot);
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "analytics fetch failed");
                Some(Notice::error(format!("Could not load analytics: {e}")))
            }
        }
    }

    /// Toggle and, when the dashboard opens, fetch right away.
    pub async fn toggle_dashboard<B: SearchBackend>(&mut self, backend: &B) -> Option<Notice> {
        let ticket = self.toggle()?;
        let outcome = backend.analytics().await;
        self.complete_fetch(ticket, outcome)
    }
}
