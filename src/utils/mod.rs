//! Utility modules supporting the export.
//!
//! - [`HttpClient`]: shared HTTP client with configured timeouts and user agent
//! - [`RetryConfig`] / [`with_retry`]: optional retry with exponential backoff
//! - [`normalize_whitespace`] / [`join_normalized`]: cleanup of multi-valued fields
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use crossref_export::sources::SourceError;
//! use crossref_export::utils::{with_retry, RetryConfig};
//!
//! # async fn fetch_data() -> Result<String, SourceError> { Ok("data".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), SourceError> {
//! let config = RetryConfig::default().max_attempts(3);
//! let body = with_retry(config, || fetch_data()).await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod retry;
mod text;

pub use http::{user_agent, HttpClient};
pub use retry::{with_retry, RetryConfig, TransientError};
pub use text::{join_normalized, normalize_whitespace, FIELD_SEPARATOR};
