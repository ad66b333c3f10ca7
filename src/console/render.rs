//! Plain-text rendering of session state.
//!
//! Highlighted query matches are wrapped in `[[` `]]` so they survive
//! terminals without color and are easy to assert on.

use crate::actions::Favorites;
use crate::analytics::AnalyticsSnapshot;
use crate::session::{SessionController, SessionState};
use crate::view::{RenderedView, Section};
use std::fmt::Write;

pub const MATCH_OPEN: &str = "[[";
pub const MATCH_CLOSE: &str = "]]";

/// Rows shown per dashboard table.
pub const DASHBOARD_ROWS: usize = 10;

/// Render the result area for the session's current state.
pub fn results(session: &SessionController) -> String {
    match session.state() {
        SessionState::Idle => "Type a query to search, or `help` for commands.\n".to_string(),
        SessionState::Searching(ticket) => format!("Searching for \"{}\"...\n", ticket.query()),
        SessionState::Failed { message } => format!("{message}\nSubmit a query to try again.\n"),
        SessionState::Populated => populated(session, &session.render()),
    }
}

fn populated(session: &SessionController, view: &RenderedView) -> String {
    let mut out = String::new();
    if !session.trending().is_empty() {
        let _ = writeln!(out, "Trending: {}", session.trending().join(", "));
    }
    if !session.recommendations().is_empty() {
        let _ = writeln!(out, "Recommendations: {}", session.recommendations().join(", "));
    }
    let state = session.view();
    let _ = writeln!(out, "Showing {} | sort {}", state.filter, state.sort);

    let mut position = 1;
    for section in view.ranked.iter().chain(view.sections.iter()) {
        out.push('\n');
        position = write_section(&mut out, section, position);
    }
    out
}

/// Write one section, numbering items from `start`. Returns the next number.
fn write_section(out: &mut String, section: &Section, start: usize) -> usize {
    let _ = writeln!(out, "== {} ({}) ==", section.key, section.len());
    if section.is_empty() {
        let _ = writeln!(out, "   no results");
        return start;
    }
    for (offset, annotated) in section.items.iter().enumerate() {
        let item = &annotated.item;
        let _ = writeln!(out, "{:>3}. [{}] {}", start + offset, item.source, item.title);
        let _ = writeln!(out, "     {}", item.url);
        let snippet = annotated.marked_snippet(MATCH_OPEN, MATCH_CLOSE);
        if !snippet.is_empty() {
            let _ = writeln!(out, "     {snippet}");
        }
    }
    start + section.len()
}

/// Render saved favorites.
pub fn favorites(favorites: &Favorites) -> String {
    if favorites.is_empty() {
        return "No favorites yet. Use `fav <n>` to save one.\n".to_string();
    }
    let mut out = format!("Favorites ({}):\n", favorites.len());
    for (i, item) in favorites.items().iter().enumerate() {
        let _ = writeln!(out, "{:>3}. [{}] {}", i + 1, item.source, item.title);
        let _ = writeln!(out, "     {}", item.url);
    }
    out
}

/// Render the analytics dashboard.
pub fn dashboard(snapshot: &AnalyticsSnapshot) -> String {
    let mut out = format!(
        "Analytics as of {}\n",
        snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    table(&mut out, "Trending searches", snapshot.top_trending(DASHBOARD_ROWS));
    table(&mut out, "Most clicked", snapshot.top_clicked(DASHBOARD_ROWS));
    out
}

fn table(out: &mut String, title: &str, rows: &[(String, u64)]) {
    let _ = writeln!(out, "\n{title}:");
    if rows.is_empty() {
        let _ = writeln!(out, "   no data");
        return;
    }
    let width = rows.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
    for (label, count) in rows {
        let _ = writeln!(out, "   {label:<width$}  {count:>6}");
    }
}
