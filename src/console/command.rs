//! Line command grammar.

use crate::error::{ConsoleError, Result};
use crate::view::{SortMode, SourceFilter};
use unisearch_client::ExportFormat;

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Filter(SourceFilter),
    Sort(SortMode),
    Export(ExportFormat),
    /// Copy the link of the n-th displayed item (1-based).
    Copy(usize),
    /// Open the n-th displayed item and record the click.
    View(usize),
    /// Save the n-th displayed item as a favorite.
    Favorite(usize),
    Favorites,
    Dashboard,
    Help,
    Quit,
}

pub const USAGE: &str = "\
Commands:
  search <query>     search every source (bare text works too)
  filter <source>    show All, Exa, Google or YouTube
  sort <mode>        default, az or za
  export <format>    save the displayed results as csv or json
  copy <n>           copy the link of result n
  view <n>           open result n in the browser
  fav <n>            save result n to favorites
  favorites          list saved favorites
  dashboard          show or hide search analytics
  help               show this help
  quit               leave the console";

/// Parse one input line. Blank lines yield `None`.
///
/// Text that does not start with a command word is a search, and so is a
/// command word followed by an argument it cannot take (`sort algorithms`).
///
/// # Errors
///
/// Returns [`ConsoleError::InvalidInput`] when a command word has no
/// argument, or a result number is `0`.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let search = || Command::Search(line.to_string());
    let command = match word.to_ascii_lowercase().as_str() {
        "search" | "s" => Command::Search(required(word, rest)?.to_string()),
        "filter" | "f" => required(word, rest)?.parse().map_or_else(|_| search(), Command::Filter),
        "sort" => required(word, rest)?.parse().map_or_else(|_| search(), Command::Sort),
        "export" => required(word, rest)?.parse().map_or_else(|_| search(), Command::Export),
        "copy" => index(word, rest)?.map_or_else(search, Command::Copy),
        "view" | "open" => index(word, rest)?.map_or_else(search, Command::View),
        "fav" | "favorite" => index(word, rest)?.map_or_else(search, Command::Favorite),
        "favorites" | "favs" if rest.is_empty() => Command::Favorites,
        "dashboard" | "stats" if rest.is_empty() => Command::Dashboard,
        "help" | "?" if rest.is_empty() => Command::Help,
        "quit" | "exit" | "q" if rest.is_empty() => Command::Quit,
        _ => Command::Search(line.to_string()),
    };
    Ok(Some(command))
}

fn invalid(message: String) -> ConsoleError {
    ConsoleError::InvalidInput(message)
}

fn required<'a>(word: &str, rest: &'a str) -> Result<&'a str> {
    if rest.is_empty() {
        Err(invalid(format!("{word} needs an argument (try `help`)")))
    } else {
        Ok(rest)
    }
}

/// A 1-based result number, or `None` when the argument is not a number.
fn index(word: &str, rest: &str) -> Result<Option<usize>> {
    match required(word, rest)?.parse::<usize>() {
        Ok(0) => Err(invalid(format!("{word} expects a result number from 1"))),
        Ok(n) => Ok(Some(n)),
        Err(_) => Ok(None),
    }
}
