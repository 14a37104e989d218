//! Cursor-based deep paging over a [`WorksSource`].
//!
//! [`Pager`] fetches one page at a time and decides whether to continue.
//! [`fetch_all`] flattens the pages into a lazy stream of [`Work`]s. A page is
//! requested only once every work of the previous page has been consumed, and
//! the stream ends for good after the last page or the first error.

use async_stream::try_stream;
use futures_util::stream::Stream;
use tracing::info;

use crate::models::{Work, WorksPage, WorksRequest};
use crate::sources::{SourceError, WorksSource};

/// Counters for a paging session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagingStats {
    /// Pages fetched successfully
    pub pages: usize,
    /// Works received across all pages
    pub works: usize,
    /// `total-results` reported by the most recent page
    pub total_results: Option<u64>,
}

/// Walks the pages of one query
#[derive(Debug)]
pub struct Pager<S> {
    source: S,
    next_request: Option<WorksRequest>,
    stats: PagingStats,
}

impl<S: WorksSource> Pager<S> {
    pub fn new(source: S, request: WorksRequest) -> Self {
        Self {
            source,
            next_request: Some(request),
            stats: PagingStats::default(),
        }
    }

    pub fn stats(&self) -> PagingStats {
        self.stats
    }

    /// Whether no further page will be requested
    pub fn is_done(&self) -> bool {
        self.next_request.is_none()
    }

    /// Fetch the next page, or `Ok(None)` once paging has finished.
    ///
    /// An error also finishes paging; later calls return `Ok(None)`.
    pub async fn next_page(&mut self) -> Result<Option<WorksPage>, SourceError> {
        let Some(request) = self.next_request.take() else {
            return Ok(None);
        };

        let page = self.source.fetch_page(&request).await?;

        self.stats.pages += 1;
        self.stats.works += page.works.len();
        self.stats.total_results = Some(page.total_results);

        info!(
            "Number of records returned={}, total result count={}, total results fetched={}, next cursor={}",
            page.works.len(),
            page.total_results,
            self.stats.works,
            page.next_cursor.as_deref().unwrap_or("<none>")
        );

        self.next_request = page
            .continuation(request.rows)
            .map(|cursor| request.with_cursor(cursor));

        Ok(Some(page))
    }

    /// Stream of the remaining works, borrowing the pager so its stats stay
    /// readable afterwards.
    pub fn works(&mut self) -> impl Stream<Item = Result<Work, SourceError>> + '_ {
        let pager = self;
        try_stream! {
            while let Some(page) = pager.next_page().await? {
                for work in page.works {
                    yield work;
                }
            }
        }
    }
}

/// Lazy, finite stream of every work matching `request`.
///
/// `request.cursor` should be the deep-paging marker. The stream cannot be
/// restarted; build a new one to re-run the query.
pub fn fetch_all<S: WorksSource>(
    source: S,
    request: WorksRequest,
) -> impl Stream<Item = Result<Work, SourceError>> {
    try_stream! {
        let mut pager = Pager::new(source, request);
        while let Some(page) = pager.next_page().await? {
            for work in page.works {
                yield work;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::{make_page, MockSource};
    use futures_util::{pin_mut, StreamExt, TryStreamExt};

    async fn collect(
        source: &MockSource,
        request: WorksRequest,
    ) -> Result<Vec<Work>, SourceError> {
        fetch_all(source, request).try_collect().await
    }

    #[tokio::test]
    async fn test_two_pages_then_short_page_stops() {
        let mock = MockSource::new();
        mock.push_page(make_page(0, 100, Some("c1")))
            .push_page(make_page(100, 40, Some("c2")));

        let works = collect(&mock, WorksRequest::new("animal").rows(100))
            .await
            .unwrap();

        assert_eq!(works.len(), 140);
        assert_eq!(works[0].doi, "10.5555/0");
        assert_eq!(works[139].doi, "10.5555/139");
        // short final page ends paging even with a cursor
        assert_eq!(mock.cursors(), vec!["*", "c1"]);
    }

    #[tokio::test]
    async fn test_full_page_without_cursor_stops() {
        let mock = MockSource::new();
        mock.push_page(make_page(0, 3, None));

        let works = collect(&mock, WorksRequest::new("q").rows(3)).await.unwrap();

        assert_eq!(works.len(), 3);
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_each_full_page_fetches_exactly_once_more() {
        let mock = MockSource::new();
        mock.push_page(make_page(0, 2, Some("a")))
            .push_page(make_page(2, 2, Some("b")))
            .push_page(make_page(4, 2, Some("c")))
            .push_page(make_page(6, 0, Some("d")));

        let works = collect(&mock, WorksRequest::new("q").rows(2)).await.unwrap();

        assert_eq!(works.len(), 6);
        assert_eq!(mock.cursors(), vec!["*", "a", "b", "c"]);
        let requests = mock.requests();
        assert!(requests.iter().all(|r| r.query == "q" && r.rows == 2));
    }

    #[tokio::test]
    async fn test_zero_rows_fetches_one_page() {
        let mock = MockSource::new();
        mock.push_page(make_page(0, 20, Some("c1")));

        let works = collect(&mock, WorksRequest::new("q")).await.unwrap();
        assert_eq!(works.len(), 20);
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_error_ends_stream_after_earlier_works() {
        let mock = MockSource::new();
        mock.push_page(make_page(0, 2, Some("c1")))
            .push_error(SourceError::Parse("bad page".to_string()))
            .push_page(make_page(2, 2, None));

        let stream = fetch_all(&mock, WorksRequest::new("q").rows(2));
        pin_mut!(stream);

        assert!(stream.next().await.unwrap().is_ok());
        assert!(stream.next().await.unwrap().is_ok());
        assert!(matches!(
            stream.next().await.unwrap(),
            Err(SourceError::Parse(_))
        ));
        assert!(stream.next().await.is_none());
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_stream_is_lazy() {
        let mock = MockSource::new();
        mock.push_page(make_page(0, 2, Some("c1")))
            .push_page(make_page(2, 1, None));

        let stream = fetch_all(&mock, WorksRequest::new("q").rows(2));
        pin_mut!(stream);

        assert!(mock.requests().is_empty());
        stream.next().await.unwrap().unwrap();
        stream.next().await.unwrap().unwrap();
        assert_eq!(mock.requests().len(), 1);
        stream.next().await.unwrap().unwrap();
        assert_eq!(mock.requests().len(), 2);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_pager_stats() {
        let mock = MockSource::new();
        let mut first = make_page(0, 2, Some("c1"));
        first.total_results = 3;
        let mut second = make_page(2, 1, None);
        second.total_results = 3;
        mock.push_page(first).push_page(second);

        let mut pager = Pager::new(&mock, WorksRequest::new("q").rows(2));
        let count = pager.works().try_collect::<Vec<_>>().await.unwrap().len();

        assert_eq!(count, 3);
        assert!(pager.is_done());
        assert_eq!(
            pager.stats(),
            PagingStats {
                pages: 2,
                works: 3,
                total_results: Some(3),
            }
        );
        assert!(pager.next_page().await.unwrap().is_none());
    }
}
