//! # unisearch-client
//!
//! Typed client for the unified search backend.
//!
//! The backend fans a query out to several upstream sources (Exa, Google,
//! YouTube), ranks the merged results and keeps search, favorite and click
//! statistics. This crate only consumes that contract; ranking is opaque.
//!
//! ## Design
//!
//! - [`SearchBackend`] is the seam every caller programs against
//! - [`HttpBackend`] implements it over JSON/HTTP with `reqwest`
//! - Every call returns an explicit [`ClientError`]; nothing is retried
//! - Queries are logged only at trace level

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use api::HttpBackend;
pub use backend::SearchBackend;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use types::{
    AnalyticsResponse, ExportFormat, ExportSections, RANKED_KEY, ResultItem, SearchResponse, Source,
};
