//! HTTP client utilities.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::sources::SourceError;

/// Shared HTTP client with the timeouts from [`HttpConfig`]
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a client from configuration
    pub fn new(config: &HttpConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(user_agent(config.mailto.as_deref()))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| SourceError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// User agent string; with a contact address Crossref routes requests to
/// its polite pool.
pub fn user_agent(mailto: Option<&str>) -> String {
    match mailto.filter(|m| !m.trim().is_empty()) {
        Some(mailto) => format!(
            "{}/{} (mailto:{})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            mailto.trim()
        ),
        None => format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent() {
        let plain = user_agent(None);
        assert!(plain.starts_with("crossref-export/"));
        assert!(!plain.contains("mailto"));

        let polite = user_agent(Some("ops@example.org"));
        assert!(polite.ends_with("(mailto:ops@example.org)"));

        assert_eq!(user_agent(Some("  ")), plain);
    }

    #[test]
    fn test_client_from_default_config() {
        assert!(HttpClient::new(&HttpConfig::default()).is_ok());
    }
}
