//! One page of works and the rule for continuing past it.

use serde_json::Value;

use crate::diagnostics::DiagnosticSink;
use crate::models::Work;
use crate::sources::SourceError;

/// A decoded page from the works endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksPage {
    /// Works in the order the API returned them
    pub works: Vec<Work>,

    /// `message.total-results`
    pub total_results: u64,

    /// `message.next-cursor`, absent when the API sent none or `null`
    pub next_cursor: Option<String>,
}

impl WorksPage {
    /// Decode a full response body.
    ///
    /// The body must be a JSON object holding a `message` object with an
    /// integer `total-results` and an `items` array. Every item is converted
    /// with [`Work::from_item`]; the first item that fails aborts the page.
    pub fn from_body(body: &str, diagnostics: &dyn DiagnosticSink) -> Result<Self, SourceError> {
        let document: Value = serde_json::from_str(body)?;
        Self::from_document(&document, diagnostics)
    }

    /// Decode an already-parsed response document
    pub fn from_document(
        document: &Value,
        diagnostics: &dyn DiagnosticSink,
    ) -> Result<Self, SourceError> {
        let message = document
            .get("message")
            .filter(|m| m.is_object())
            .ok_or_else(|| SourceError::missing("message", None))?;

        let total_results = message
            .get("total-results")
            .ok_or_else(|| SourceError::missing("total-results", None))?
            .as_u64()
            .ok_or_else(|| SourceError::Parse("total-results is not an integer".to_string()))?;

        let next_cursor = match message.get("next-cursor") {
            None | Some(Value::Null) => None,
            Some(Value::String(cursor)) => Some(cursor.clone()),
            Some(other) => {
                return Err(SourceError::Parse(format!(
                    "next-cursor must be a string, got {}",
                    other
                )))
            }
        };

        let items = message
            .get("items")
            .ok_or_else(|| SourceError::missing("items", None))?
            .as_array()
            .ok_or_else(|| SourceError::Parse("items is not an array".to_string()))?;

        let works = items
            .iter()
            .map(|item| Work::from_item(item, diagnostics))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            works,
            total_results,
            next_cursor,
        })
    }

    /// Cursor for the next request, or `None` when this page is the last.
    ///
    /// Paging continues only while the page is full (exactly `page_size`
    /// works) and the API supplied a cursor. A short page ends the export
    /// even when a cursor is present, and a full page without a cursor ends
    /// it as well.
    ///
    /// This compares against the requested page size rather than
    /// `total_results`. If the final page happens to be exactly full, one
    /// extra request is made and returns an empty page.
    pub fn continuation(&self, page_size: u32) -> Option<&str> {
        let full = usize::try_from(page_size).is_ok_and(|size| self.works.len() == size);
        if full {
            self.next_cursor.as_deref()
        } else {
            None
        }
    }
}
