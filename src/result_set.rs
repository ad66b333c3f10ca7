//! In-memory model of one search response.
//!
//! A [`ResultSet`] maps section keys (source names plus the reserved
//! `"Ranked"` key) to ordered results. It is never mutated after
//! construction; a new search replaces it wholesale together with the
//! derived trending and recommendation lists held by [`SearchSnapshot`].

use std::collections::BTreeMap;
use unisearch_client::{RANKED_KEY, ResultItem, SearchResponse, Source};

/// Results of one search, grouped by section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    sections: BTreeMap<String, Vec<ResultItem>>,
}

impl ResultSet {
    /// Build a result set from raw sections. Absent sections are simply
    /// missing; nothing here treats them as an error.
    pub fn from_sections(sections: BTreeMap<String, Vec<ResultItem>>) -> Self {
        let set = Self { sections };
        let orphans = set.orphan_ranked().count();
        if orphans > 0 {
            tracing::debug!(orphans, "ranked items missing from their source section");
        }
        set
    }

    /// Section keys present in the payload, including empty ones.
    pub fn section_keys(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Items of `key`, or an empty slice if the section is absent.
    pub fn section(&self, key: &str) -> &[ResultItem] {
        self.sections.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Items of a known source section.
    pub fn source_section(&self, source: Source) -> &[ResultItem] {
        self.section(source.name())
    }

    /// The cross-source ranked view, in backend order.
    pub fn ranked(&self) -> &[ResultItem] {
        self.section(RANKED_KEY)
    }

    /// Whether a non-empty ranked section is present.
    pub fn has_ranked(&self) -> bool {
        !self.ranked().is_empty()
    }

    /// Whether no section holds any item.
    pub fn is_empty(&self) -> bool {
        self.sections.values().all(Vec::is_empty)
    }

    /// Number of distinct results across source sections.
    ///
    /// The ranked section repeats source items, so it is not counted.
    pub fn total_items(&self) -> usize {
        self.sections
            .iter()
            .filter(|(key, _)| key.as_str() != RANKED_KEY)
            .map(|(_, items)| items.len())
            .sum()
    }

    /// Ranked items whose URL does not appear in their own source section.
    pub fn orphan_ranked(&self) -> impl Iterator<Item = &ResultItem> {
        self.ranked().iter().filter(|ranked| {
            !self
                .section(&ranked.source)
                .iter()
                .any(|item| item.url == ranked.url)
        })
    }

    /// Raw sections, keyed by name.
    pub fn sections(&self) -> &BTreeMap<String, Vec<ResultItem>> {
        &self.sections
    }
}

/// A result set together with the query and derived lists it came with.
///
/// The four parts are created together and replaced together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSnapshot {
    pub query: String,
    pub results: ResultSet,
    pub trending: Vec<String>,
    pub recommendations: Vec<String>,
}

impl SearchSnapshot {
    /// Install a backend response for `query`.
    pub fn from_response(query: impl Into<String>, response: SearchResponse) -> Self {
        Self {
            query: query.into(),
            results: ResultSet::from_sections(response.results),
            trending: response.trending,
            recommendations: response.recommendations,
        }
    }
}
