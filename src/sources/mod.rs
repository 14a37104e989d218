//! Works sources.
//!
//! A [`WorksSource`] fetches a single page of works for a [`WorksRequest`].
//! [`CrossRefSource`] talks to the Crossref REST API; [`MockSource`] replays
//! scripted pages and records the requests it saw, for tests.
//!
//! Pagination across pages lives in [`crate::pagination`], not in the sources.

mod crossref;
pub mod mock;

pub use crossref::{CrossRefSource, CROSSREF_API_BASE};
pub use mock::MockSource;

use crate::models::{WorksPage, WorksRequest};
use async_trait::async_trait;

/// The fetch seam between pagination and transport.
#[async_trait]
pub trait WorksSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source
    fn id(&self) -> &str;

    /// Fetch and decode one page.
    ///
    /// `request.cursor` must be the deep-paging marker or a cursor returned
    /// by a previous page of the same query.
    async fn fetch_page(&self, request: &WorksRequest) -> Result<WorksPage, SourceError>;
}

#[async_trait]
impl<T: WorksSource + ?Sized> WorksSource for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    async fn fetch_page(&self, request: &WorksRequest) -> Result<WorksPage, SourceError> {
        (**self).fetch_page(request).await
    }
}

#[async_trait]
impl<T: WorksSource + ?Sized> WorksSource for std::sync::Arc<T> {
    fn id(&self) -> &str {
        (**self).id()
    }

    async fn fetch_page(&self, request: &WorksRequest) -> Result<WorksPage, SourceError> {
        (**self).fetch_page(request).await
    }
}

/// Errors that can occur when fetching a page
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network failure or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// The API answered with a non-success status
    #[error("API returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Malformed body or a field of the wrong type
    #[error("Parse error: {0}")]
    Parse(String),

    /// A required field is absent
    #[error("Missing required field `{field}`{}", for_doi(.doi))]
    MissingField {
        field: &'static str,
        doi: Option<String>,
    },
}

fn for_doi(doi: &Option<String>) -> String {
    doi.as_ref()
        .map(|doi| format!(" for DOI={}", doi))
        .unwrap_or_default()
}

impl SourceError {
    pub(crate) fn missing(field: &'static str, doi: Option<&str>) -> Self {
        SourceError::MissingField {
            field,
            doi: doi.map(str::to_string),
        }
    }

    /// Network failure or non-success status
    pub fn is_transport(&self) -> bool {
        matches!(self, SourceError::Network(_) | SourceError::Status { .. })
    }

    /// Malformed body or missing required field
    pub fn is_parse(&self) -> bool {
        matches!(self, SourceError::Parse(_) | SourceError::MissingField { .. })
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_taxonomy() {
        assert!(SourceError::Network("reset".into()).is_transport());
        assert!(SourceError::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: String::new(),
        }
        .is_transport());
        assert!(SourceError::Parse("bad".into()).is_parse());
        assert!(SourceError::missing("DOI", None).is_parse());
        assert!(!SourceError::missing("DOI", None).is_transport());
    }

    #[test]
    fn test_missing_field_message() {
        let err = SourceError::missing("created.timestamp", Some("10.1/x"));
        assert_eq!(
            err.to_string(),
            "Missing required field `created.timestamp` for DOI=10.1/x"
        );
        assert_eq!(
            SourceError::missing("DOI", None).to_string(),
            "Missing required field `DOI`"
        );
    }
}
