//! Interactive line console over a search session.
//!
//! The [`Console`] reads one command per line and runs backend work on
//! spawned tasks, so a slow search never blocks copy, view or dashboard
//! commands. Finished work comes back through a completion channel and is
//! applied on the console task, which is the only writer of session state.
//!
//! A new search aborts the task of the previous one; any answer that still
//! slips through is discarded by the session's ticket check.

pub mod command;
pub mod render;

pub use command::{Command, USAGE, parse};

use crate::actions::{ActionCoordinator, FavoriteAck, Notice};
use crate::analytics::{AnalyticsAdapter, FetchTicket};
use crate::config::ConsoleConfig;
use crate::desktop::Desktop;
use crate::error::Result;
use crate::session::{Commit, SearchTicket, SessionController};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use unisearch_client::{
    AnalyticsResponse, ClientError, ExportFormat, ResultItem, SearchBackend, SearchResponse,
};

/// Whether the console keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Background work reporting back to the console task.
#[derive(Debug)]
enum Completion {
    Search {
        ticket: SearchTicket,
        outcome: std::result::Result<SearchResponse, ClientError>,
    },
    Favorite(FavoriteAck),
    Export {
        format: ExportFormat,
        outcome: Result<PathBuf>,
    },
    Analytics {
        ticket: FetchTicket,
        outcome: std::result::Result<AnalyticsResponse, ClientError>,
    },
    FavoritesSynced(std::result::Result<Vec<ResultItem>, ClientError>),
}

/// Line-oriented search console writing to `W`.
pub struct Console<B, D, W> {
    backend: Arc<B>,
    actions: ActionCoordinator<B, D>,
    session: SessionController,
    analytics: AnalyticsAdapter,
    out: W,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    notices_rx: mpsc::UnboundedReceiver<Notice>,
    search_task: Option<JoinHandle<()>>,
    /// Spawned non-search tasks whose completion has not been applied yet.
    pending: usize,
}

impl<B, D, W> Console<B, D, W>
where
    B: SearchBackend + 'static,
    D: Desktop + 'static,
    W: AsyncWrite + Unpin,
{
    pub fn new(backend: Arc<B>, desktop: Arc<D>, config: &ConsoleConfig, out: W) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();
        let actions = ActionCoordinator::new(
            Arc::clone(&backend),
            desktop,
            config.download_dir(),
            notices_tx,
        );
        Self {
            backend,
            actions,
            session: SessionController::new(config.view),
            analytics: AnalyticsAdapter::new(),
            out,
            completions_tx,
            completions_rx,
            notices_rx,
            search_task: None,
            pending: 0,
        }
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn analytics(&self) -> &AnalyticsAdapter {
        &self.analytics
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Read commands from `input` until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns I/O errors reading input or writing output. Command and
    /// backend failures are shown as notices and never end the loop.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        self.say("unisearch console. Type `help` for commands.\n").await?;
        let mut lines = input.lines();
        loop {
            tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => {
                        if self.dispatch(&line).await? == Flow::Quit {
                            break;
                        }
                    }
                    None => {
                        tracing::info!("input closed");
                        break;
                    }
                },
                Some(completion) = self.completions_rx.recv() => self.apply(completion).await?,
                Some(notice) = self.notices_rx.recv() => self.notify(&notice).await?,
            }
        }
        if let Some(task) = self.search_task.take() {
            task.abort();
        }
        Ok(())
    }

    /// Handle one input line.
    ///
    /// # Errors
    ///
    /// Returns only output I/O errors.
    pub async fn dispatch(&mut self, line: &str) -> Result<Flow> {
        let command = match parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => {
                self.notify(&Notice::error(e.to_string())).await?;
                return Ok(Flow::Continue);
            }
        };
        tracing::debug!(?command, "dispatch");

        match command {
            Command::Search(query) => self.start_search(&query).await?,
            Command::Filter(filter) => {
                self.session.set_filter(filter);
                self.refresh().await?;
            }
            Command::Sort(sort) => {
                self.session.set_sort(sort);
                self.refresh().await?;
            }
            Command::Export(format) => self.start_export(format).await?,
            Command::Copy(n) => {
                if let Some(item) = self.displayed(n).await? {
                    let notice = self
                        .actions
                        .copy_link(&item.url)
                        .await
                        .unwrap_or_else(|e| Notice::error(format!("Could not copy link: {e}")));
                    self.notify(&notice).await?;
                }
            }
            Command::View(n) => {
                if let Some(item) = self.displayed(n).await? {
                    let notice = self
                        .actions
                        .record_view(&item.url)
                        .unwrap_or_else(|e| Notice::error(format!("Could not open link: {e}")));
                    self.notify(&notice).await?;
                }
            }
            Command::Favorite(n) => {
                if let Some(item) = self.displayed(n).await? {
                    let request = self.actions.favorite_request(item);
                    self.spawn(async move { Completion::Favorite(request.await) });
                }
            }
            Command::Favorites => {
                let text = render::favorites(self.session.favorites());
                self.say(&text).await?;
            }
            Command::Dashboard => self.toggle_dashboard().await?,
            Command::Help => self.say(&format!("{USAGE}\n")).await?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Apply completions until no backend work is outstanding, then flush
    /// queued notices.
    ///
    /// # Errors
    ///
    /// Returns output I/O errors.
    pub async fn settle(&mut self) -> Result<()> {
        while self.pending > 0 || self.session.is_loading() {
            match self.completions_rx.recv().await {
                Some(completion) => self.apply(completion).await?,
                None => break,
            }
        }
        while let Ok(notice) = self.notices_rx.try_recv() {
            self.notify(&notice).await?;
        }
        Ok(())
    }

    /// Load the favorites the backend already persisted, in the background.
    pub fn start_favorites_sync(&mut self) {
        let request = self.actions.favorites_request();
        self.spawn(async move { Completion::FavoritesSynced(request.await) });
    }

    async fn start_search(&mut self, query: &str) -> Result<()> {
        let ticket = match self.session.begin_search(query) {
            Ok(ticket) => ticket,
            Err(e) => return self.notify(&Notice::error(e.to_string())).await,
        };
        if let Some(previous) = self.search_task.take() {
            previous.abort();
        }
        let backend = Arc::clone(&self.backend);
        let tx = self.completions_tx.clone();
        let task_ticket = ticket.clone();
        self.search_task = Some(tokio::spawn(async move {
            let outcome = backend.search(task_ticket.query()).await;
            let _ = tx.send(Completion::Search {
                ticket: task_ticket,
                outcome,
            });
        }));
        self.refresh().await
    }

    async fn start_export(&mut self, format: ExportFormat) -> Result<()> {
        if self.session.results().is_none() {
            return self
                .notify(&Notice::error("Nothing to export yet. Run a search first."))
                .await;
        }
        let request = self.actions.export_request(&self.session.render(), format);
        self.spawn(async move {
            Completion::Export {
                format,
                outcome: request.await,
            }
        });
        self.notify(&Notice::info(format!("Exporting {}...", format.file_name())))
            .await
    }

    async fn toggle_dashboard(&mut self) -> Result<()> {
        let Some(ticket) = self.analytics.toggle() else {
            return self.say("Dashboard hidden.\n").await;
        };
        let backend = Arc::clone(&self.backend);
        self.spawn(async move {
            Completion::Analytics {
                ticket,
                outcome: backend.analytics().await,
            }
        });
        self.say("Loading analytics...\n").await
    }

    fn spawn<F>(&mut self, work: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.completions_tx.clone();
        self.pending += 1;
        tokio::spawn(async move {
            let _ = tx.send(work.await);
        });
    }

    async fn apply(&mut self, completion: Completion) -> Result<()> {
        if !matches!(completion, Completion::Search { .. }) {
            self.pending = self.pending.saturating_sub(1);
        }
        match completion {
            Completion::Search { ticket, outcome } => {
                if self.session.complete_search(&ticket, outcome) != Commit::Stale {
                    self.search_task = None;
                    self.refresh().await?;
                }
            }
            Completion::Favorite(ack) => {
                let notice = self
                    .session
                    .favorites_mut()
                    .acknowledge(ack)
                    .unwrap_or_else(|e| Notice::error(format!("Could not save favorite: {e}")));
                self.notify(&notice).await?;
            }
            Completion::Export { format, outcome } => {
                let notice = match outcome {
                    Ok(path) => Notice::success(format!(
                        "Exported {} to {}",
                        format.file_name(),
                        path.display()
                    )),
                    Err(e) => Notice::error(format!("Export failed: {e}")),
                };
                self.notify(&notice).await?;
            }
            Completion::Analytics { ticket, outcome } => {
                let current = self.analytics.is_current(ticket);
                if let Some(notice) = self.analytics.complete_fetch(ticket, outcome) {
                    self.notify(&notice).await?;
                } else if current {
                    let text = self.analytics.snapshot().map(render::dashboard);
                    if let Some(text) = text {
                        self.say(&text).await?;
                    }
                }
            }
            Completion::FavoritesSynced(outcome) => match outcome {
                Ok(items) => {
                    let added = self.session.favorites_mut().merge_persisted(items);
                    tracing::info!(added, "persisted favorites loaded");
                    if added > 0 {
                        self.notify(&Notice::info(format!("Loaded {added} saved favorites")))
                            .await?;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "favorites sync failed");
                    self.notify(&Notice::error(format!("Could not load saved favorites: {e}")))
                        .await?;
                }
            },
        }
        Ok(())
    }

    /// The n-th displayed item, or an error notice when there is none.
    async fn displayed(&mut self, n: usize) -> Result<Option<ResultItem>> {
        let item = self.session.render().item(n).map(|a| a.item.clone());
        if item.is_none() {
            self.notify(&Notice::error(format!("No result #{n} on screen")))
                .await?;
        }
        Ok(item)
    }

    async fn refresh(&mut self) -> Result<()> {
        let text = render::results(&self.session);
        self.say(&text).await
    }

    async fn notify(&mut self, notice: &Notice) -> Result<()> {
        self.say(&format!("{notice}\n")).await
    }

    async fn say(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::MemoryDesktop;
    use crate::test_utils::{MockBackend, sample_response};
    use crate::view::{SortMode, SourceFilter};
    use std::time::Duration;
    use unisearch_client::{AnalyticsResponse, Source};

    type TestConsole = Console<MockBackend, MemoryDesktop, Vec<u8>>;

    fn console(backend: MockBackend) -> (TestConsole, Arc<MockBackend>, Arc<MemoryDesktop>, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = ConsoleConfig::default();
        config.export.directory = Some(dir.path().to_path_buf());
        let backend = Arc::new(backend);
        let desktop = Arc::new(MemoryDesktop::new());
        let console = Console::new(Arc::clone(&backend), Arc::clone(&desktop), &config, Vec::new());
        (console, backend, desktop, dir)
    }

    fn output(console: &TestConsole) -> String {
        String::from_utf8_lossy(console.output()).into_owned()
    }

    async fn run_lines(console: &mut TestConsole, lines: &[&str]) {
        for line in lines {
            console.dispatch(line).await.expect("dispatch");
            console.settle().await.expect("settle");
        }
    }

    #[tokio::test]
    async fn search_renders_results() {
        let (mut console, _, _, _dir) =
            console(MockBackend::new().with_response("rust", sample_response("rust")));
        run_lines(&mut console, &["rust"]).await;
        let out = output(&console);
        assert!(out.contains("Searching for \"rust\"..."));
        assert!(out.contains("== Ranked (3) =="));
        assert!(out.contains("[[rust]]"));
    }

    #[tokio::test]
    async fn failed_search_keeps_console_usable() {
        let (mut console, _, _, _dir) = console(MockBackend::new().failing_search());
        run_lines(&mut console, &["rust"]).await;
        assert!(output(&console).contains("Search failed"));
        assert!(!console.session().is_loading());
    }

    #[tokio::test]
    async fn newer_search_wins_over_slow_older_one() {
        let backend = MockBackend::new()
            .with_response("slow", sample_response("slow"))
            .with_response("fast", sample_response("fast"))
            .with_delay("slow", Duration::from_millis(100));
        let (mut console, _, _, _dir) = console(backend);
        console.dispatch("slow").await.expect("dispatch");
        console.dispatch("fast").await.expect("dispatch");
        console.settle().await.expect("settle");
        tokio::time::sleep(Duration::from_millis(150)).await;
        console.settle().await.expect("settle");

        let snapshot = console.session().snapshot().expect("snapshot");
        assert_eq!(snapshot.query, "fast");
        assert!(!output(&console).contains("slow guide"));
    }

    #[tokio::test]
    async fn filter_and_sort_rerender() {
        let (mut console, _, _, _dir) =
            console(MockBackend::new().with_response("rust", sample_response("rust")));
        run_lines(&mut console, &["rust", "filter google", "sort za"]).await;
        assert_eq!(console.session().view().filter, SourceFilter::Only(Source::Google));
        assert_eq!(console.session().view().sort, SortMode::Za);
        assert!(output(&console).contains("Showing Google | sort za"));
    }

    #[tokio::test]
    async fn item_actions_use_display_numbers() {
        let (mut console, backend, desktop, _dir) =
            console(MockBackend::new().with_response("rust", sample_response("rust")));
        run_lines(&mut console, &["rust", "copy 1", "view 2", "fav 3"]).await;

        assert_eq!(desktop.clipboard().as_deref(), Some("https://exa.example/rust"));
        assert_eq!(desktop.opened(), vec!["https://google.example/rust".to_string()]);
        backend.wait_for_clicks(1).await;
        assert_eq!(backend.clicks(), vec!["https://google.example/rust".to_string()]);
        let favorites = console.session().favorites().items();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].url, "https://youtube.example/rust");

        let out = output(&console);
        assert!(out.contains("[ok] Link copied!"));
        assert!(out.contains("[ok] Saved to favorites!"));
    }

    #[tokio::test]
    async fn out_of_range_item_reported() {
        let (mut console, _, desktop, _dir) =
            console(MockBackend::new().with_response("rust", sample_response("rust")));
        run_lines(&mut console, &["rust", "copy 42"]).await;
        assert!(output(&console).contains("[error] No result #42 on screen"));
        assert!(desktop.clipboard().is_none());
    }

    #[tokio::test]
    async fn export_writes_displayed_view() {
        let (mut console, backend, _, dir) =
            console(MockBackend::new().with_response("rust", sample_response("rust")));
        run_lines(&mut console, &["rust", "filter Exa", "export csv"]).await;

        let exports = backend.exports();
        assert_eq!(exports.len(), 1);
        let keys: Vec<_> = exports[0].0.keys().cloned().collect();
        assert_eq!(keys, vec!["Ranked".to_string(), "Exa".to_string()]);
        assert!(dir.path().join("results.csv").is_file());
        assert!(output(&console).contains("[ok] Exported results.csv"));
    }

    #[tokio::test]
    async fn export_before_search_refused() {
        let (mut console, backend, _, _dir) = console(MockBackend::new());
        run_lines(&mut console, &["export json"]).await;
        assert!(backend.exports().is_empty());
        assert!(output(&console).contains("Nothing to export yet"));
    }

    #[tokio::test]
    async fn dashboard_toggles() {
        let analytics = AnalyticsResponse {
            trending: vec![("rust".into(), 7)],
            most_clicked: vec![("https://exa.example/rust".into(), 2)],
        };
        let (mut console, backend, _, _dir) =
            console(MockBackend::new().with_analytics(analytics));
        run_lines(&mut console, &["dashboard"]).await;
        assert!(console.analytics().is_visible());
        assert!(output(&console).contains("Trending searches:"));
        run_lines(&mut console, &["dashboard"]).await;
        assert!(!console.analytics().is_visible());
        assert!(output(&console).contains("Dashboard hidden."));
        assert_eq!(backend.analytics_calls(), 1);
    }

    #[tokio::test]
    async fn favorites_sync_and_listing() {
        let persisted = vec![ResultItem::new("Google", "Kept", "https://g.example/kept", "")];
        let (mut console, _, _, _dir) =
            console(MockBackend::new().with_persisted_favorites(persisted));
        console.start_favorites_sync();
        console.settle().await.expect("settle");
        run_lines(&mut console, &["favorites"]).await;
        let out = output(&console);
        assert!(out.contains("[info] Loaded 1 saved favorites"));
        assert!(out.contains("[Google] Kept"));
    }

    #[tokio::test]
    async fn bad_command_is_a_notice() {
        let (mut console, _, _, _dir) = console(MockBackend::new());
        run_lines(&mut console, &["copy 0"]).await;
        assert!(output(&console).contains("[error] invalid input: copy expects a result number"));
    }

    #[tokio::test]
    async fn keyword_led_text_searches() {
        let (mut console, _, _, _dir) = console(
            MockBackend::new().with_response("sort algorithms", sample_response("sort algorithms")),
        );
        run_lines(&mut console, &["sort algorithms"]).await;
        let out = output(&console);
        assert!(out.contains("Searching for \"sort algorithms\"..."));
        assert!(out.contains("== Ranked (3) =="));
        assert_eq!(console.session().view().sort, SortMode::Default);
    }

    #[tokio::test]
    async fn run_stops_at_quit() {
        let (mut console, _, _, _dir) =
            console(MockBackend::new().with_response("rust", sample_response("rust")));
        let input: &[u8] = b"help\nquit\nrust\n";
        console.run(input).await.expect("run");
        let out = output(&console);
        assert!(out.contains("Commands:"));
        assert!(console.session().snapshot().is_none());
    }
}
