//! # Crossref Export
//!
//! Fetches works metadata from the Crossref REST API with cursor-based deep
//! paging and writes one always-quoted CSV row per work.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Works request, page and record types, plus item parsing
//! - [`sources`]: The [`WorksSource`] fetch seam, the Crossref implementation and a mock
//! - [`pagination`]: [`fetch_all`], a lazy stream over every page of a query
//! - [`output`]: Flattening works into CSV rows and writing them
//! - [`export`]: The end-to-end [`Exporter`]
//! - [`diagnostics`]: Sink for non-fatal missing-field warnings
//! - [`utils`]: HTTP client, retry and text normalization
//! - [`config`]: Configuration management

pub mod config;
pub mod diagnostics;
pub mod export;
pub mod models;
pub mod output;
pub mod pagination;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use export::{ExportError, ExportSummary, Exporter};
pub use models::{Work, WorksPage, WorksRequest};
pub use pagination::fetch_all;
pub use sources::{CrossRefSource, SourceError, WorksSource};
