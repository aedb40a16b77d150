//! Lazy cursor-following sequence.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::mem;
use std::ops::ControlFlow;

use futures_util::future::BoxFuture;
use futures_util::stream::{self, Stream};

use crate::error::SdkResult;
use crate::observability::metrics;
use crate::pagination::page::{Page, ToVecLimit};

/// Fetches one page given the cursor of the previous one (`None` for the first).
pub type PageFetcher<T> =
    Box<dyn FnMut(Option<String>) -> BoxFuture<'static, SdkResult<Page<T>>> + Send>;

enum CursorState {
    NotStarted,
    Next(String),
    Exhausted,
}

/// Items of a paginated list, fetched page by page on demand.
///
/// A page is requested only when the buffered items run out and the previous
/// page carried a `nextCursor`. Each cursor is handed to the fetcher once.
/// After a fetch error the sequence is finished; items yielded before the
/// error stay delivered.
pub struct ListCursor<T> {
    fetch: PageFetcher<T>,
    buffer: VecDeque<T>,
    state: CursorState,
    pages_fetched: usize,
}

impl<T> fmt::Debug for ListCursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            CursorState::NotStarted => "not-started",
            CursorState::Next(_) => "has-next",
            CursorState::Exhausted => "exhausted",
        };
        f.debug_struct("ListCursor")
            .field("buffered", &self.buffer.len())
            .field("state", &state)
            .field("pages_fetched", &self.pages_fetched)
            .finish()
    }
}

impl<T: Send + 'static> ListCursor<T> {
    pub fn new<F>(fetch: F) -> Self
    where
        F: FnMut(Option<String>) -> BoxFuture<'static, SdkResult<Page<T>>> + Send + 'static,
    {
        Self {
            fetch: Box::new(fetch),
            buffer: VecDeque::new(),
            state: CursorState::NotStarted,
            pages_fetched: 0,
        }
    }

    /// Number of pages requested so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Next item, fetching the next page if the buffer is empty.
    pub async fn next(&mut self) -> Option<SdkResult<T>> {
        while self.buffer.is_empty() {
            match self.fetch_page().await {
                Ok(Some(page)) => self.buffer.extend(page.items),
                Ok(None) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
        self.buffer.pop_front().map(Ok)
    }

    /// The next page for manual paging.
    ///
    /// Buffered items left over from `next` come back first as a page of
    /// their own. Returns `Ok(None)` once the list is exhausted.
    pub async fn next_page(&mut self) -> SdkResult<Option<Page<T>>> {
        if !self.buffer.is_empty() {
            let next_cursor = match &self.state {
                CursorState::Next(cursor) => Some(cursor.clone()),
                _ => None,
            };
            let items = self.buffer.drain(..).collect();
            return Ok(Some(Page::new(items, next_cursor)));
        }
        self.fetch_page().await
    }

    /// Collect up to `limit` items, fetching no page beyond what is needed.
    pub async fn to_vec(&mut self, limit: ToVecLimit) -> SdkResult<Vec<T>> {
        let max = limit.max();
        let mut items = Vec::new();
        while max.map_or(true, |max| items.len() < max) {
            match self.next().await {
                Some(item) => items.push(item?),
                None => break,
            }
        }
        Ok(items)
    }

    /// Run `handler` on each item until it answers `Break` or the list ends.
    pub async fn for_each<F, Fut>(&mut self, mut handler: F) -> SdkResult<()>
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = ControlFlow<()>>,
    {
        while let Some(item) = self.next().await {
            if handler(item?).await.is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Adapt into a `Stream` of items.
    pub fn into_stream(self) -> impl Stream<Item = SdkResult<T>> + Send + 'static {
        stream::unfold(self, |mut cursor| async move {
            cursor.next().await.map(|item| (item, cursor))
        })
    }

    async fn fetch_page(&mut self) -> SdkResult<Option<Page<T>>> {
        let cursor = match mem::replace(&mut self.state, CursorState::Exhausted) {
            CursorState::Exhausted => return Ok(None),
            CursorState::NotStarted => None,
            CursorState::Next(cursor) => Some(cursor),
        };

        let page = (self.fetch)(cursor).await?;
        self.pages_fetched += 1;
        metrics::record_page_fetched();
        tracing::debug!(
            items = page.items.len(),
            has_next = page.next_cursor.is_some(),
            pages_fetched = self.pages_fetched,
            "Fetched page"
        );

        if let Some(next) = &page.next_cursor {
            self.state = CursorState::Next(next.clone());
        }
        Ok(Some(page))
    }
}
