//! View transform pipeline: filter, sort and highlight a result set.
//!
//! Everything here is a pure function of a [`ResultSet`], the sticky
//! [`ViewState`] and the submitted query, so it is re-run on every render
//! and never writes back into the result set.

use crate::result_set::ResultSet;
use icu_collator::{Collator, CollatorOptions};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use unisearch_client::{ExportSections, RANKED_KEY, ResultItem, Source};

/// Ordering applied to each source section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Backend order.
    #[default]
    Default,
    /// Title ascending.
    Az,
    /// Title descending.
    Za,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Az => "az",
            Self::Za => "za",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "az" | "a-z" => Ok(Self::Az),
            "za" | "z-a" => Ok(Self::Za),
            other => Err(format!("unknown sort mode: {other} (expected default, az or za)")),
        }
    }
}

/// Which source sections are shown. The ranked block ignores this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourceFilter {
    #[default]
    All,
    Only(Source),
}

impl SourceFilter {
    /// Whether `source` passes this filter.
    pub fn admits(&self, source: Source) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => *only == source,
        }
    }
}

impl fmt::Display for SourceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(source) => f.write_str(source.name()),
        }
    }
}

impl FromStr for SourceFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<Source>().map(Self::Only)
    }
}

impl TryFrom<String> for SourceFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SourceFilter> for String {
    fn from(filter: SourceFilter) -> Self {
        filter.to_string()
    }
}

/// Sticky user preferences that outlive individual searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub filter: SourceFilter,
    pub sort: SortMode,
}

/// A run of snippet text, either plain or matching the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    Match(String),
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(text) | Self::Match(text) => text,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match(_))
    }
}

/// A result paired with its highlighted snippet.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedResultItem {
    pub item: ResultItem,
    pub snippet: Vec<Segment>,
}

impl AnnotatedResultItem {
    /// Number of highlighted spans in the snippet.
    pub fn match_count(&self) -> usize {
        self.snippet.iter().filter(|s| s.is_match()).count()
    }

    /// The snippet text with highlights removed.
    pub fn plain_snippet(&self) -> String {
        self.snippet.iter().map(Segment::text).collect()
    }

    /// The snippet with every match wrapped in `open`/`close`.
    pub fn marked_snippet(&self, open: &str, close: &str) -> String {
        let mut out = String::with_capacity(self.item.snippet.len());
        for segment in &self.snippet {
            match segment {
                Segment::Plain(text) => out.push_str(text),
                Segment::Match(text) => {
                    out.push_str(open);
                    out.push_str(text);
                    out.push_str(close);
                }
            }
        }
        out
    }
}

thread_local! {
    static COLLATOR: Option<Collator> =
        Collator::try_new(&Default::default(), CollatorOptions::new()).ok();
}

/// Compare titles the way a human-facing listing orders them.
///
/// Uses the Unicode root collation, so accented letters sort with their base
/// letter and case only breaks ties. The raw text breaks any remaining tie,
/// so only identical titles compare equal.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    COLLATOR
        .with(|collator| match collator {
            Some(collator) => collator.compare(a, b),
            None => {
                let folded_a = a.chars().flat_map(char::to_lowercase);
                let folded_b = b.chars().flat_map(char::to_lowercase);
                folded_a.cmp(folded_b).then_with(|| b.cmp(a))
            }
        })
        .then_with(|| a.cmp(b))
}

/// Sort `items` in place. `sort_by` is stable, so equal titles keep their
/// backend order.
pub fn sort_items(items: &mut [ResultItem], mode: SortMode) {
    match mode {
        SortMode::Default => {}
        SortMode::Az => items.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortMode::Za => items.sort_by(|a, b| compare_titles(&b.title, &a.title)),
    }
}

/// Split `text` into plain and matching runs for `query`.
///
/// Matching is literal and case-insensitive: the query is escaped before it
/// reaches the regex engine. An empty query returns the text unchanged as a
/// single plain run.
pub fn highlight(text: &str, query: &str) -> Vec<Segment> {
    if query.is_empty() {
        return vec![Segment::Plain(text.to_string())];
    }
    let pattern = match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::debug!(error = %e, "highlight pattern rejected; showing snippet as-is");
            return vec![Segment::Plain(text.to_string())];
        }
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for found in pattern.find_iter(text) {
        if found.start() > last {
            segments.push(Segment::Plain(text[last..found.start()].to_string()));
        }
        segments.push(Segment::Match(found.as_str().to_string()));
        last = found.end();
    }
    if last < text.len() || segments.is_empty() {
        segments.push(Segment::Plain(text[last..].to_string()));
    }
    segments
}

/// Sort and highlight one section's items.
pub fn present(items: &[ResultItem], query: &str, sort: SortMode) -> Vec<AnnotatedResultItem> {
    let mut ordered = items.to_vec();
    sort_items(&mut ordered, sort);
    ordered
        .into_iter()
        .map(|item| {
            let snippet = highlight(&item.snippet, query);
            AnnotatedResultItem { item, snippet }
        })
        .collect()
}

/// One rendered section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Section key (`"Ranked"` or a source name).
    pub key: String,
    pub items: Vec<AnnotatedResultItem>,
}

impl Section {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// An empty section renders as "no results", not as a failure.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// What the console shows for the current result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedView {
    /// The ranked block, present only when the backend sent ranked items.
    pub ranked: Option<Section>,
    /// Source sections admitted by the filter, in [`Source::all`] order.
    pub sections: Vec<Section>,
}

impl RenderedView {
    /// Every displayed item in display order: ranked block first.
    pub fn items(&self) -> impl Iterator<Item = &AnnotatedResultItem> {
        self.ranked
            .iter()
            .chain(self.sections.iter())
            .flat_map(|section| section.items.iter())
    }

    /// The displayed item at 1-based position `index`.
    pub fn item(&self, index: usize) -> Option<&AnnotatedResultItem> {
        index.checked_sub(1).and_then(|i| self.items().nth(i))
    }

    /// Keys of the displayed sections, ranked block first.
    pub fn section_keys(&self) -> Vec<&str> {
        self.ranked
            .iter()
            .chain(self.sections.iter())
            .map(|section| section.key.as_str())
            .collect()
    }

    /// The displayed results as plain sections, keyed in display order with
    /// the ranked block first. Empty sections are left out.
    pub fn displayed_results(&self) -> ExportSections {
        self.ranked
            .iter()
            .chain(self.sections.iter())
            .filter(|section| !section.is_empty())
            .map(|section| {
                let items = section.items.iter().map(|a| a.item.clone()).collect();
                (section.key.clone(), items)
            })
            .collect()
    }
}

/// Apply the view state to a result set.
///
/// The ranked block keeps backend order and ignores filter and sort; source
/// sections are selected by exact filter match and sorted per `state.sort`.
pub fn render_view(results: &ResultSet, state: &ViewState, query: &str) -> RenderedView {
    let ranked = results.has_ranked().then(|| Section {
        key: RANKED_KEY.to_string(),
        items: present(results.ranked(), query, SortMode::Default),
    });

    let sections = Source::all()
        .iter()
        .filter(|source| state.filter.admits(**source))
        .map(|source| Section {
            key: source.name().to_string(),
            items: present(results.source_section(*source), query, state.sort),
        })
        .collect();

    RenderedView { ranked, sections }
}
