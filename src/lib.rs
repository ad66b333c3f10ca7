//! unisearch: a console over a multi-source search backend.
//!
//! One query fans out (server-side) to Exa, Google and YouTube; the backend
//! answers with per-source sections plus a cross-source "Ranked" section.
//! This crate keeps that answer as a session and lets the user filter, sort,
//! highlight, export, favorite and inspect analytics for it.
//!
//! # Architecture
//!
//! - **Result set**: the backend's sections, replaced wholesale per search
//! - **View**: pure filter/sort/highlight transforms re-run on every render
//! - **Actions**: copy, view, favorite and export against the displayed view
//! - **Session**: the search state machine with its stale-response guard
//! - **Analytics**: on-demand dashboard snapshots
//! - **Console**: the line-oriented surface tying it together

pub mod actions;
pub mod analytics;
pub mod config;
pub mod console;
pub mod desktop;
pub mod error;
pub mod logging;
pub mod result_set;
pub mod session;
pub mod view;

#[cfg(test)]
pub(crate) mod test_utils;

pub use actions::{ActionCoordinator, Favorites, Notice, NoticeLevel};
pub use analytics::{AnalyticsAdapter, AnalyticsSnapshot};
pub use config::ConsoleConfig;
pub use console::Console;
pub use desktop::{Browser, Clipboard, Desktop, MemoryDesktop, SystemDesktop};
pub use error::{ConsoleError, Result};
pub use result_set::{ResultSet, SearchSnapshot};
pub use session::{Commit, SearchTicket, SessionController, SessionState};
pub use view::{RenderedView, SortMode, SourceFilter, ViewState, present, render_view};
