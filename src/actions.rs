//! User actions against the current result set.
//!
//! The [`ActionCoordinator`] mediates copy, view, favorite and export
//! requests. Actions never change which results are displayed: favorites
//! accumulate in [`Favorites`], exports snapshot the view at call time, and
//! click tracking is fire-and-forget.
//!
//! Long-running actions are split into a `*_request` half, which captures
//! everything it needs and returns an owned future that can be spawned, and
//! a fold half that applies the acknowledgment to local state.

use crate::error::{ConsoleError, Result};
use crate::desktop::Desktop;
use crate::view::RenderedView;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use unisearch_client::{ClientError, ExportFormat, ResultItem, SearchBackend};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A short, non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

/// Favorites saved during this session, in the order they were acknowledged.
///
/// The list only grows. An item whose URL is already present is not added a
/// second time, matching the backend, which stores each favorite once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Favorites {
    items: Vec<ResultItem>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ResultItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.items.iter().any(|item| item.url == url)
    }

    /// Append `item`. Returns `false` if its URL was already saved.
    pub fn append(&mut self, item: ResultItem) -> bool {
        if self.contains_url(&item.url) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Apply a favorite acknowledgment.
    ///
    /// The item is appended only once the backend acknowledged it.
    ///
    /// # Errors
    ///
    /// Returns the backend failure; the list is left untouched.
    pub fn acknowledge(&mut self, ack: FavoriteAck) -> Result<Notice> {
        match ack.result {
            Ok(()) => {
                let title = ack.item.title.clone();
                if self.append(ack.item) {
                    tracing::info!(count = self.len(), "favorite saved");
                    Ok(Notice::success("Saved to favorites!"))
                } else {
                    Ok(Notice::info(format!("\"{title}\" is already a favorite")))
                }
            }
            Err(e) => {
                tracing::warn!(url = %ack.item.url, error = %e, "favorite not saved");
                Err(e.into())
            }
        }
    }

    /// Append every persisted item not already present. Returns how many
    /// were added.
    pub fn merge_persisted(&mut self, items: Vec<ResultItem>) -> usize {
        items
            .into_iter()
            .map(|item| self.append(item))
            .filter(|added| *added)
            .count()
    }
}

/// Backend answer to a favorite request, carrying the item it was for.
#[derive(Debug)]
pub struct FavoriteAck {
    pub item: ResultItem,
    pub result: std::result::Result<(), ClientError>,
}

/// Reject anything but absolute http(s) links before they reach a browser.
pub fn validate_link(link: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(link)
        .map_err(|e| ConsoleError::InvalidInput(format!("not a valid link: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ConsoleError::InvalidInput(format!(
            "refusing to open {other}: link"
        ))),
    }
}

/// Mediates user actions between the console, the backend and the desktop.
pub struct ActionCoordinator<B, D> {
    backend: Arc<B>,
    desktop: Arc<D>,
    download_dir: PathBuf,
    notices: mpsc::UnboundedSender<Notice>,
}

impl<B, D> ActionCoordinator<B, D>
where
    B: SearchBackend + 'static,
    D: Desktop + 'static,
{
    /// Create a coordinator. Failures of fire-and-forget work are reported
    /// on `notices`.
    pub fn new(
        backend: Arc<B>,
        desktop: Arc<D>,
        download_dir: PathBuf,
        notices: mpsc::UnboundedSender<Notice>,
    ) -> Self {
        Self {
            backend,
            desktop,
            download_dir,
            notices,
        }
    }

    /// Directory exports are written to.
    pub fn download_dir(&self) -> &PathBuf {
        &self.download_dir
    }

    /// Copy the literal URL to the clipboard.
    ///
    /// Clipboard tools are external processes, so the write runs on the
    /// blocking pool rather than on a runtime worker.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Clipboard`] if no clipboard is available.
    pub async fn copy_link(&self, url: &str) -> Result<Notice> {
        let desktop = Arc::clone(&self.desktop);
        let text = url.to_string();
        tokio::task::spawn_blocking(move || desktop.write_text(&text))
            .await
            .map_err(|e| ConsoleError::Clipboard(format!("clipboard task failed: {e}")))??;
        tracing::debug!(url, "link copied");
        Ok(Notice::success("Link copied!"))
    }

    /// Report the view to the backend without waiting, then open the link.
    ///
    /// The click notification runs on a spawned task; its failure is sent to
    /// the notice channel and never blocks or cancels the navigation.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::InvalidInput`] for non-http(s) links and
    /// [`ConsoleError::Browser`] if the browser cannot be launched.
    pub fn record_view(&self, url: &str) -> Result<Notice> {
        validate_link(url)?;
        self.spawn_click(url);
        self.desktop.open(url)?;
        Ok(Notice::info(format!("Opened {url}")))
    }

    fn spawn_click(&self, url: &str) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(url, "no async runtime; click not recorded");
            return;
        };
        let backend = Arc::clone(&self.backend);
        let notices = self.notices.clone();
        let url = url.to_string();
        runtime.spawn(async move {
            if let Err(e) = backend.record_click(&url).await {
                tracing::warn!(url, error = %e, "click notification failed");
                let _ = notices.send(Notice::error(format!("Could not record click: {e}")));
            }
        });
    }

    /// Build the backend half of a favorite action.
    pub fn favorite_request(
        &self,
        item: ResultItem,
    ) -> impl Future<Output = FavoriteAck> + Send + use<B, D> {
        let backend = Arc::clone(&self.backend);
        async move {
            let result = backend.favorite(&item).await;
            FavoriteAck { item, result }
        }
    }

    /// Save `item` as a favorite and wait for the acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns the backend failure; `favorites` is left untouched.
    pub async fn favorite(&self, item: ResultItem, favorites: &mut Favorites) -> Result<Notice> {
        let ack = self.favorite_request(item).await;
        favorites.acknowledge(ack)
    }

    /// Build an export of exactly what `view` displays right now.
    ///
    /// The payload is captured before this returns, so later filter or sort
    /// changes cannot alter it.
    pub fn export_request(
        &self,
        view: &RenderedView,
        format: ExportFormat,
    ) -> impl Future<Output = Result<PathBuf>> + Send + use<B, D> {
        let backend = Arc::clone(&self.backend);
        let payload = view.displayed_results();
        let target = self.download_dir.join(format.file_name());
        async move {
            let bytes = backend.export(&payload, format).await?;
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&target, &bytes).await?;
            tracing::info!(%format, path = %target.display(), size = bytes.len(), "export written");
            Ok(target)
        }
    }

    /// Export the current view and write it to the download directory.
    ///
    /// # Errors
    ///
    /// Returns backend failures and I/O errors writing the file.
    pub async fn export(&self, view: &RenderedView, format: ExportFormat) -> Result<PathBuf> {
        self.export_request(view, format).await
    }

    /// Build a request for the favorites the backend already persisted.
    pub fn favorites_request(
        &self,
    ) -> impl Future<Output = std::result::Result<Vec<ResultItem>, ClientError>> + Send + use<B, D>
    {
        let backend = Arc::clone(&self.backend);
        async move { backend.favorites().await }
    }

    /// Load persisted favorites into `favorites`. Returns how many were added.
    ///
    /// # Errors
    ///
    /// Returns the backend failure; `favorites` is left untouched.
    pub async fn sync_favorites(&self, favorites: &mut Favorites) -> Result<usize> {
        let persisted = self.favorites_request().await?;
        Ok(favorites.merge_persisted(persisted))
    }
}
