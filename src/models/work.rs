//! Work model and parsing of raw Crossref items.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagnostics::{DiagnosticSink, FieldMissing, OptionalField};
use crate::sources::SourceError;

/// One bibliographic record returned by the works endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    /// Digital Object Identifier
    pub doi: String,

    /// Titles, in API order (possibly empty)
    pub titles: Vec<String>,

    /// Author names as `"given family"` (possibly empty)
    pub authors: Vec<String>,

    /// Publisher name (empty when the item has none)
    pub publisher: String,

    /// `created.timestamp`, milliseconds since the Unix epoch
    pub created_timestamp: i64,
}

impl Work {
    /// Build a work from one element of `message.items`.
    ///
    /// `DOI` and `created.timestamp` are required; their absence fails the
    /// parse. Missing `publisher`, `title` and `author` are replaced with empty
    /// values and reported to `diagnostics`. A JSON `null` counts as missing.
    pub fn from_item(item: &Value, diagnostics: &dyn DiagnosticSink) -> Result<Self, SourceError> {
        let doi = match present(item, "DOI") {
            Some(Value::String(doi)) => doi.clone(),
            Some(other) => {
                return Err(SourceError::Parse(format!(
                    "DOI must be a string, got {}",
                    other
                )))
            }
            None => return Err(SourceError::missing("DOI", None)),
        };

        let report = |field: OptionalField| {
            diagnostics.field_missing(FieldMissing {
                doi: doi.clone(),
                field,
            })
        };

        let publisher = match present(item, "publisher") {
            Some(Value::String(publisher)) => publisher.clone(),
            Some(other) => other.to_string(),
            None => {
                report(OptionalField::Publisher);
                String::new()
            }
        };

        let titles = match present(item, "title") {
            Some(value) => Vec::<String>::deserialize(value).map_err(|e| {
                SourceError::Parse(format!("title for DOI={} is not a string list: {}", doi, e))
            })?,
            None => {
                report(OptionalField::Title);
                Vec::new()
            }
        };

        let created_timestamp = present(item, "created")
            .and_then(|created| present(created, "timestamp"))
            .ok_or_else(|| SourceError::missing("created.timestamp", Some(&doi)))?
            .as_i64()
            .ok_or_else(|| {
                SourceError::Parse(format!(
                    "created.timestamp for DOI={} is not an integer",
                    doi
                ))
            })?;

        let authors = match present(item, "author") {
            Some(Value::Array(entries)) => entries.iter().map(author_name).collect(),
            Some(_) => {
                return Err(SourceError::Parse(format!(
                    "author for DOI={} is not an array",
                    doi
                )))
            }
            None => {
                report(OptionalField::Author);
                Vec::new()
            }
        };

        Ok(Self {
            doi,
            titles,
            authors,
            publisher,
            created_timestamp,
        })
    }
}

/// Field lookup that treats JSON `null` the same as an absent key
fn present<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| !v.is_null())
}

/// `"given family"`; a side that is missing or not text contributes nothing.
fn author_name(entry: &Value) -> String {
    let given = entry.get("given").and_then(Value::as_str).unwrap_or_default();
    let family = entry.get("family").and_then(Value::as_str).unwrap_or_default();
    format!("{} {}", given, family)
}
