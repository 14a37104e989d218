//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::models::{Work, WorksPage, WorksRequest};
use crate::sources::{SourceError, WorksSource};

/// A mock source that replays scripted pages in order and records every
/// request it receives.
#[derive(Debug, Default)]
pub struct MockSource {
    responses: Mutex<VecDeque<Result<WorksPage, SourceError>>>,
    requests: Mutex<Vec<WorksRequest>>,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a page to return.
    pub fn push_page(&self, page: WorksPage) -> &Self {
        self.lock_responses().push_back(Ok(page));
        self
    }

    /// Queue an error to return.
    pub fn push_error(&self, error: SourceError) -> &Self {
        self.lock_responses().push_back(Err(error));
        self
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<WorksRequest> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Cursors of the requests received so far.
    pub fn cursors(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.cursor).collect()
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<WorksPage, SourceError>>> {
        match self.responses.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl WorksSource for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    async fn fetch_page(&self, request: &WorksRequest) -> Result<WorksPage, SourceError> {
        match self.requests.lock() {
            Ok(mut guard) => guard.push(request.clone()),
            Err(poisoned) => poisoned.into_inner().push(request.clone()),
        }

        let next = self.lock_responses().pop_front();
        next.unwrap_or_else(|| {
            Err(SourceError::Network(format!(
                "no scripted response for cursor {}",
                request.cursor
            )))
        })
    }
}

/// Helper function to create a mock work for testing.
pub fn make_work(doi: &str, title: &str) -> Work {
    Work {
        doi: doi.to_string(),
        titles: vec![title.to_string()],
        authors: vec!["Jane Doe".to_string()],
        publisher: "Mock Publisher".to_string(),
        created_timestamp: 1_700_000_000_000,
    }
}

/// Helper function to create a page of `count` works numbered from `start`.
pub fn make_page(start: usize, count: usize, next_cursor: Option<&str>) -> WorksPage {
    WorksPage {
        works: (start..start + count)
            .map(|n| make_work(&format!("10.5555/{}", n), &format!("Work {}", n)))
            .collect(),
        total_results: 0,
        next_cursor: next_cursor.map(str::to_string),
    }
}
