//! Works search request.

use serde::{Deserialize, Serialize};

/// Cursor value that asks the works endpoint to start deep paging.
///
/// Every response to a deep-paging request carries a `next-cursor` that
/// continues the same result set.
pub const DEEP_PAGING_CURSOR: &str = "*";

/// Parameters for one request to the `/works` endpoint
///
/// A request is an immutable value. Moving to the next page produces a copy
/// with a new cursor via [`WorksRequest::with_cursor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksRequest {
    /// Free-text query
    pub query: String,

    /// Filter expression (e.g. `from-pub-date:2024-01-31`)
    pub filter: String,

    /// Comma-separated field names to return
    pub select: String,

    /// Page size; omitted from the request when zero
    pub rows: u32,

    /// Pagination cursor
    pub cursor: String,
}

impl WorksRequest {
    /// Create a request positioned at the start of deep paging
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filter: String::new(),
            select: String::new(),
            rows: 0,
            cursor: DEEP_PAGING_CURSOR.to_string(),
        }
    }

    /// Set the filter expression
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Set the field selection
    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = select.into();
        self
    }

    /// Set the page size
    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = rows;
        self
    }

    /// Copy of this request continuing from `cursor`
    pub fn with_cursor(&self, cursor: impl Into<String>) -> Self {
        Self {
            cursor: cursor.into(),
            ..self.clone()
        }
    }

    /// Whether this request starts a new deep-paging session
    pub fn is_first_page(&self) -> bool {
        self.cursor == DEEP_PAGING_CURSOR
    }

    /// Query parameters in the order they are sent.
    ///
    /// Blank string fields are left out, and `rows` only appears when it is
    /// greater than zero.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(5);

        for (name, value) in [
            ("query", &self.query),
            ("filter", &self.filter),
            ("select", &self.select),
        ] {
            if !value.trim().is_empty() {
                pairs.push((name, value.clone()));
            }
        }

        if self.rows > 0 {
            pairs.push(("rows", self.rows.to_string()));
        }

        if !self.cursor.trim().is_empty() {
            pairs.push(("cursor", self.cursor.clone()));
        }

        pairs
    }
}

/// Filter expression for works published on or after `date`
pub fn from_pub_date_filter(date: chrono::NaiveDate) -> String {
    format!("from-pub-date:{}", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_new_request_starts_deep_paging() {
        let request = WorksRequest::new("animal");
        assert_eq!(request.cursor, "*");
        assert!(request.is_first_page());
    }

    #[test]
    fn test_query_pairs_full() {
        let request = WorksRequest::new("animal")
            .filter("from-pub-date:2024-01-31")
            .select("DOI,title")
            .rows(100);

        let pairs = request.query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("query", "animal".to_string()),
                ("filter", "from-pub-date:2024-01-31".to_string()),
                ("select", "DOI,title".to_string()),
                ("rows", "100".to_string()),
                ("cursor", "*".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_omit_blank_and_zero() {
        let request = WorksRequest::new("  ").select("").rows(0);
        let pairs = request.query_pairs();
        assert_eq!(pairs, vec![("cursor", "*".to_string())]);
    }

    #[test]
    fn test_with_cursor_keeps_other_fields() {
        let request = WorksRequest::new("animal").rows(20).filter("f");
        let next = request.with_cursor("c1");

        assert_eq!(next.cursor, "c1");
        assert_eq!(next.query, "animal");
        assert_eq!(next.rows, 20);
        assert_eq!(next.filter, "f");
        assert!(!next.is_first_page());
        // source request untouched
        assert_eq!(request.cursor, "*");
    }

    #[test]
    fn test_from_pub_date_filter() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(from_pub_date_filter(date), "from-pub-date:2025-03-07");
    }
}
