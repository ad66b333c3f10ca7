//! Wire types for the search backend contract.

use serde::{Deserialize, Deserializer, Serialize};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Section key of the cross-source ranked view.
pub const RANKED_KEY: &str = "Ranked";

/// Upstream sources the backend aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Source {
    /// Exa neural search.
    Exa,
    /// Google custom search.
    Google,
    /// YouTube video search.
    YouTube,
}

impl Source {
    /// Returns the section key and display name of this source.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exa => "Exa",
            Self::Google => "Google",
            Self::YouTube => "YouTube",
        }
    }

    /// Returns all known sources in display order.
    pub fn all() -> &'static [Source] {
        &[Self::Exa, Self::Google, Self::YouTube]
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|source| source.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown source: {s}"))
    }
}

/// A single result as returned by the backend.
///
/// `source` stays a plain string so results from sources this client does
/// not know about still decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Name of the upstream source that produced this result.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source: String,
    /// Page or video title.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Result URL; unique within one result set.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    /// Text snippet or description.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub snippet: String,
    /// Relevance score attached by the backend to ranked results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Upstream sources leave titles, links and snippets unset; those arrive as
/// `null` and decode as empty strings.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ResultItem {
    /// Build a result without a ranking score.
    pub fn new(
        source: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            score: None,
        }
    }
}

/// Body of `POST /search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Results requested from each upstream source.
    pub num_results: usize,
}

/// Response of `POST /search`. Every field tolerates absence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    /// Section key to ordered results, including the reserved `"Ranked"` key.
    pub results: BTreeMap<String, Vec<ResultItem>>,
    pub recommendations: Vec<String>,
    pub trending: Vec<String>,
}

/// File formats the backend can render an export in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Wire name sent in the export request.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// File name the downloaded export is saved under.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Csv => "results.csv",
            Self::Json => "results.json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

/// Sections handed to `POST /export`, in the order they are shown.
pub type ExportSections = IndexMap<String, Vec<ResultItem>>;

/// Body of `POST /export`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    pub results: ExportSections,
    pub format: ExportFormat,
}

/// Body of `POST /favorites`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteRequest {
    pub favorite: ResultItem,
}

/// Body of `POST /click`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickRequest {
    pub url: String,
}

/// Acknowledgment returned by write endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ack {
    pub status: String,
}

/// Response of `GET /favorites`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FavoritesResponse {
    pub favorites: Vec<ResultItem>,
}

/// Response of `GET /analytics`: `(term, count)` and `(url, count)` pairs,
/// most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsResponse {
    pub trending: Vec<(String, u64)>,
    pub most_clicked: Vec<(String, u64)>,
}
