//! CrossRef works source.

use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

use crate::config::HttpConfig;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::models::{WorksPage, WorksRequest};
use crate::sources::{SourceError, WorksSource};
use crate::utils::{with_retry, HttpClient, RetryConfig};

pub const CROSSREF_API_BASE: &str = "https://api.crossref.org";

const WORKS_RESOURCE: &str = "works";

/// Longest slice of an error body kept in a status error
const ERROR_BODY_LIMIT: usize = 200;

/// CrossRef works source
///
/// Fetches pages from the `/works` resource of the Crossref REST API.
#[derive(Debug, Clone)]
pub struct CrossRefSource {
    client: HttpClient,
    base_url: Url,
    retry: RetryConfig,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl CrossRefSource {
    pub fn new(http: &HttpConfig, retry: RetryConfig) -> Result<Self, SourceError> {
        let base_url = Url::parse(&http.base_url).map_err(|e| {
            SourceError::Network(format!("Invalid base URL {}: {}", http.base_url, e))
        })?;

        Ok(Self {
            client: HttpClient::new(http)?,
            base_url,
            retry,
            diagnostics: Arc::new(TracingSink),
        })
    }

    /// Route missing-field diagnostics to `sink` instead of the log
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Full request URL for `request`
    pub fn works_url(&self, request: &WorksRequest) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SourceError::Network(format!("Base URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .push(WORKS_RESOURCE);

        let pairs = request.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    async fn get_body(&self, url: &Url) -> Result<String, SourceError> {
        let response = self
            .client
            .client()
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to query CrossRef: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status,
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read CrossRef response: {}", e)))
    }
}

#[async_trait]
impl WorksSource for CrossRefSource {
    fn id(&self) -> &str {
        "crossref"
    }

    async fn fetch_page(&self, request: &WorksRequest) -> Result<WorksPage, SourceError> {
        let url = self.works_url(request)?;
        tracing::debug!("Works query URL={}", url);

        let body = with_retry(self.retry, || self.get_body(&url)).await?;

        WorksPage::from_body(&body, self.diagnostics.as_ref())
    }
}
