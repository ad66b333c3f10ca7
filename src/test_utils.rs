//! Shared test utilities used across multiple test modules.

use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use unisearch_client::{
    AnalyticsResponse, ClientError, ExportFormat, ExportSections, RANKED_KEY, ResultItem,
    SearchBackend, SearchResponse,
};

/// In-memory backend with canned responses and call recording.
#[derive(Default)]
pub struct MockBackend {
    responses: HashMap<String, SearchResponse>,
    delays: HashMap<String, Duration>,
    analytics: AnalyticsResponse,
    persisted: Vec<ResultItem>,
    fail_search: bool,
    fail_clicks: bool,
    fail_favorites: bool,
    fail_analytics: bool,
    clicks: Mutex<Vec<String>>,
    favorited: Mutex<Vec<ResultItem>>,
    exports: Mutex<Vec<(ExportSections, ExportFormat)>>,
    analytics_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, query: &str, response: SearchResponse) -> Self {
        self.responses.insert(query.to_string(), response);
        self
    }

    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub fn with_analytics(mut self, analytics: AnalyticsResponse) -> Self {
        self.analytics = analytics;
        self
    }

    pub fn with_persisted_favorites(mut self, items: Vec<ResultItem>) -> Self {
        self.persisted = items;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn failing_clicks(mut self) -> Self {
        self.fail_clicks = true;
        self
    }

    pub fn failing_favorites(mut self) -> Self {
        self.fail_favorites = true;
        self
    }

    pub fn failing_analytics(mut self) -> Self {
        self.fail_analytics = true;
        self
    }

    pub fn clicks(&self) -> Vec<String> {
        self.clicks.lock().expect("clicks lock").clone()
    }

    pub fn favorited(&self) -> Vec<ResultItem> {
        self.favorited.lock().expect("favorited lock").clone()
    }

    pub fn exports(&self) -> Vec<(ExportSections, ExportFormat)> {
        self.exports.lock().expect("exports lock").clone()
    }

    pub fn analytics_calls(&self) -> usize {
        self.analytics_calls.load(Ordering::SeqCst)
    }

    /// Wait until at least `n` clicks were recorded, or give up after a second.
    pub async fn wait_for_clicks(&self, n: usize) {
        for _ in 0..100 {
            if self.clicks.lock().expect("clicks lock").len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

fn down() -> ClientError {
    ClientError::Transport("mock backend unavailable".into())
}

impl SearchBackend for MockBackend {
    async fn search(&self, query: &str) -> Result<SearchResponse, ClientError> {
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail_search {
            return Err(down());
        }
        Ok(self.responses.get(query).cloned().unwrap_or_default())
    }

    async fn export(
        &self,
        results: &ExportSections,
        format: ExportFormat,
    ) -> Result<Bytes, ClientError> {
        self.exports
            .lock()
            .expect("exports lock")
            .push((results.clone(), format));
        Ok(Bytes::from(format!("{format}:{}", results.len())))
    }

    async fn favorite(&self, item: &ResultItem) -> Result<(), ClientError> {
        if self.fail_favorites {
            return Err(down());
        }
        self.favorited
            .lock()
            .expect("favorited lock")
            .push(item.clone());
        Ok(())
    }

    async fn record_click(&self, url: &str) -> Result<(), ClientError> {
        if self.fail_clicks {
            return Err(down());
        }
        self.clicks.lock().expect("clicks lock").push(url.to_string());
        Ok(())
    }

    async fn analytics(&self) -> Result<AnalyticsResponse, ClientError> {
        self.analytics_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_analytics {
            return Err(down());
        }
        Ok(self.analytics.clone())
    }

    async fn favorites(&self) -> Result<Vec<ResultItem>, ClientError> {
        Ok(self.persisted.clone())
    }
}

/// A response with one Google, one Exa and one YouTube result mentioning
/// `query`, plus a ranked view over all three.
pub fn sample_response(query: &str) -> SearchResponse {
    let google = ResultItem::new(
        "Google",
        format!("{query} guide"),
        format!("https://google.example/{query}"),
        format!("All about {query}."),
    );
    let exa = ResultItem::new(
        "Exa",
        format!("Deep dive into {query}"),
        format!("https://exa.example/{query}"),
        format!("Why {query} matters"),
    );
    let youtube = ResultItem::new(
        "YouTube",
        format!("{query} in 100 seconds"),
        format!("https://youtube.example/{query}"),
        "A short video".to_string(),
    );
    let mut results = BTreeMap::new();
    results.insert(
        RANKED_KEY.to_string(),
        vec![exa.clone(), google.clone(), youtube.clone()],
    );
    results.insert("Google".to_string(), vec![google]);
    results.insert("Exa".to_string(), vec![exa]);
    results.insert("YouTube".to_string(), vec![youtube]);
    SearchResponse {
        results,
        recommendations: vec![format!("{query} tutorial")],
        trending: vec![query.to_string()],
    }
}
