//! Trait definition for the search backend seam.
//!
//! The console talks to the backend only through [`SearchBackend`], so the
//! session and action logic can run against an in-memory double in tests
//! and against [`HttpBackend`](crate::api::HttpBackend) in production.

use crate::error::ClientError;
use crate::types::{AnalyticsResponse, ExportFormat, ExportSections, ResultItem, SearchResponse};
use bytes::Bytes;
use std::future::Future;

/// The request/response contract of the search backend.
///
/// Every call returns an explicit [`ClientError`] on failure; nothing is
/// retried here. All implementations must be `Send + Sync` so calls can run
/// on spawned tasks.
pub trait SearchBackend: Send + Sync {
    /// Run a search across all upstream sources.
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<SearchResponse, ClientError>> + Send;

    /// Render `results` server-side as a downloadable file.
    fn export(
        &self,
        results: &ExportSections,
        format: ExportFormat,
    ) -> impl Future<Output = Result<Bytes, ClientError>> + Send;

    /// Persist a favorite. Resolves once the backend acknowledges it.
    fn favorite(&self, item: &ResultItem) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Record that `url` was opened.
    fn record_click(&self, url: &str) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Fetch aggregate search and click counts.
    fn analytics(&self) -> impl Future<Output = Result<AnalyticsResponse, ClientError>> + Send;

    /// List favorites persisted by the backend.
    fn favorites(&self) -> impl Future<Output = Result<Vec<ResultItem>, ClientError>> + Send;
}
