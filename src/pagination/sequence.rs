//! Lazy, cursor-driven iteration over paged resources

use super::types::{Page, PageFetcher, RecordShape};
use crate::error::Result;
use crate::http::{throttle, QueryParams, RateLimit, RateLimiter};
use crate::types::JsonValue;
use futures::stream::{self, Stream};
use std::sync::Arc;
use tracing::debug;

/// A record together with the page it came from
pub type PageRecord = (Arc<Page>, JsonValue);

/// Iteration state: the page being drained and how far into it we are
#[derive(Debug, Clone)]
pub struct Cursor {
    page: Arc<Page>,
    params: QueryParams,
    position: usize,
    pages_fetched: usize,
    exhausted: bool,
}

impl Cursor {
    fn new(page: Page, params: QueryParams) -> Self {
        Self {
            page: Arc::new(page),
            params,
            position: 0,
            pages_fetched: 1,
            exhausted: false,
        }
    }

    fn advance(&mut self, page: Page) {
        self.page = Arc::new(page);
        self.position = 0;
        self.pages_fetched += 1;
    }

    /// The page currently being drained
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Parameters replayed on every continuation request
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Index of the next record within the current page
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// Single-pass sequence of `(page, record)` pairs over a paged resource.
///
/// Pages are fetched on demand: every record of the current page is handed
/// out before the continuation URL is requested, and nothing is fetched
/// ahead. Each continuation request goes through the sequence's own rate
/// limiter, if it has one, and carries the original query parameters.
pub struct PaginatedSequence {
    fetcher: Arc<dyn PageFetcher>,
    cursor: Cursor,
    shape: RecordShape,
    limiter: Option<RateLimiter>,
}

impl PaginatedSequence {
    /// Fetch the first page of `url` and start a sequence over it
    pub async fn start(
        fetcher: Arc<dyn PageFetcher>,
        url: &str,
        params: QueryParams,
        shape: RecordShape,
        rate_limit: Option<RateLimit>,
    ) -> Result<Self> {
        let mut limiter = rate_limit.map(RateLimiter::new);
        throttle(limiter.as_mut()).await;
        let page = fetcher.fetch(url, &params).await?;

        Ok(Self {
            fetcher,
            cursor: Cursor::new(page, params),
            shape,
            limiter,
        })
    }

    /// Start a sequence from a page the caller already holds.
    ///
    /// The rate window starts empty; the fetch of `page` is not counted.
    pub fn from_page(
        fetcher: Arc<dyn PageFetcher>,
        page: Page,
        params: QueryParams,
        shape: RecordShape,
        rate_limit: Option<RateLimit>,
    ) -> Self {
        Self {
            fetcher,
            cursor: Cursor::new(page, params),
            shape,
            limiter: rate_limit.map(RateLimiter::new),
        }
    }

    /// Pull the next `(page, record)` pair, fetching the next page if the
    /// current one is drained. `Ok(None)` marks the end of the sequence.
    ///
    /// After an error the sequence can be polled again, which repeats the
    /// step that failed.
    pub async fn next(&mut self) -> Result<Option<PageRecord>> {
        loop {
            if self.cursor.exhausted {
                return Ok(None);
            }

            let record = self
                .cursor
                .page
                .records(self.shape)?
                .get(self.cursor.position)
                .cloned();

            if let Some(record) = record {
                self.cursor.position += 1;
                return Ok(Some((Arc::clone(&self.cursor.page), record)));
            }

            let Some(next_url) = self.cursor.page.next_url().map(str::to_string) else {
                debug!(
                    "Pagination finished after {} page(s) at {}",
                    self.cursor.pages_fetched,
                    self.cursor.page.url()
                );
                self.cursor.exhausted = true;
                return Ok(None);
            };

            throttle(self.limiter.as_mut()).await;
            debug!(
                "Fetching page {} from {}",
                self.cursor.pages_fetched + 1,
                next_url
            );
            let page = self.fetcher.fetch(&next_url, &self.cursor.params).await?;
            self.cursor.advance(page);
        }
    }

    /// The iteration state
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// The page currently being drained
    pub fn current_page(&self) -> &Page {
        self.cursor.page()
    }

    pub fn shape(&self) -> RecordShape {
        self.shape
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.exhausted
    }

    /// Adapt into a `Stream`. The stream ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<PageRecord>> {
        stream::unfold(Some(self), |state| async move {
            let mut seq = state?;
            match seq.next().await {
                Ok(Some(item)) => Some((Ok(item), Some(seq))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    /// Drain the whole sequence, keeping only the records
    pub async fn collect_records(mut self) -> Result<Vec<JsonValue>> {
        let mut records = Vec::new();
        while let Some((_, record)) = self.next().await? {
            records.push(record);
        }
        Ok(records)
    }
}

impl std::fmt::Debug for PaginatedSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedSequence")
            .field("cursor", &self.cursor)
            .field("shape", &self.shape)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}
