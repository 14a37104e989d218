//! Configuration management.
//!
//! Every setting has a default, so the exporter runs with no configuration
//! file at all. Values are layered, lowest priority first:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config`, or [`find_config_file`])
//! 3. environment variables prefixed `CROSSREF_EXPORT_`, with `__` between
//!    section and key (e.g. `CROSSREF_EXPORT_QUERY__ROWS=50`)
//! 4. command-line flags, applied by the binary
//!
//! # Configuration File Format
//!
//! ```toml
//! [query]
//! query = "animal"
//! from_date = "2024-06-01"      # overrides lookback_months
//! lookback_months = 12
//! select = "DOI,title,author,created,publisher"
//! rows = 100
//!
//! [output]
//! path = "/tmp/xref-assignment.csv"
//!
//! [http]
//! base_url = "https://api.crossref.org"
//! read_timeout_secs = 20
//! connect_timeout_secs = 10
//! mailto = "you@example.org"
//!
//! [retry]
//! max_attempts = 1
//! initial_delay_ms = 1000
//! max_delay_ms = 30000
//! backoff_multiplier = 2.0
//! ```

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{from_pub_date_filter, WorksRequest};
use crate::utils::RetryConfig;

pub use config::ConfigError;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CROSSREF_EXPORT";

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "crossref-export.toml";

/// Where the CSV goes when no path is configured
pub const DEFAULT_OUTPUT_PATH: &str = "/tmp/xref-assignment.csv";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// What to search for
    #[serde(default)]
    pub query: QueryConfig,

    /// Where to write
    #[serde(default)]
    pub output: OutputConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Retry settings (single attempt by default)
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Search parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Free-text query
    #[serde(default = "default_query")]
    pub query: String,

    /// Verbatim filter expression; replaces the publication-date filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Earliest publication date; when unset the lookback window applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,

    /// Months before today covered when `from_date` is unset
    #[serde(default = "default_lookback_months")]
    pub lookback_months: u32,

    /// Fields requested from the API
    #[serde(default = "default_select")]
    pub select: String,

    /// Page size
    #[serde(default = "default_rows")]
    pub rows: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            query: default_query(),
            filter: None,
            from_date: None,
            lookback_months: default_lookback_months(),
            select: default_select(),
            rows: default_rows(),
        }
    }
}

fn default_query() -> String {
    "animal".to_string()
}

fn default_lookback_months() -> u32 {
    12
}

fn default_select() -> String {
    "DOI,title,author,created,publisher".to_string()
}

fn default_rows() -> u32 {
    100
}

impl QueryConfig {
    /// First publication date covered, relative to `today`
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        self.from_date.unwrap_or_else(|| {
            today
                .checked_sub_months(Months::new(self.lookback_months))
                .unwrap_or(NaiveDate::MIN)
        })
    }

    /// Filter expression sent with the request
    pub fn filter_expression(&self, today: NaiveDate) -> String {
        match &self.filter {
            Some(filter) => filter.clone(),
            None => from_pub_date_filter(self.start_date(today)),
        }
    }

    /// Initial request, positioned at the start of deep paging
    pub fn build_request(&self, today: NaiveDate) -> WorksRequest {
        WorksRequest::new(self.query.clone())
            .filter(self.filter_expression(today))
            .select(self.select.clone())
            .rows(self.rows)
    }
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// CSV file to create (truncated if it exists)
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// API root; `/works` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Read timeout in seconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Contact address for the Crossref polite pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mailto: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            read_timeout_secs: default_read_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            mailto: None,
        }
    }
}

fn default_base_url() -> String {
    crate::sources::CROSSREF_API_BASE.to_string()
}

fn default_read_timeout() -> u64 {
    20
}

fn default_connect_timeout() -> u64 {
    10
}

impl Config {
    /// Reject settings that cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.path.as_os_str().is_empty() {
            return Err(ConfigError::Message("output.path must not be empty".into()));
        }
        if self.http.read_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "http.read_timeout_secs must be greater than zero".into(),
            ));
        }
        if let Err(e) = url::Url::parse(&self.http.base_url) {
            return Err(ConfigError::Message(format!(
                "http.base_url {:?} is not a valid URL: {}",
                self.http.base_url, e
            )));
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Load configuration from an optional file plus the environment
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: Config = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Locate a configuration file in the working directory or the user config
/// directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("config.toml"))
        .filter(|path| path.is_file())
}
