//!
//! src/paginate.rs  Andrew Belles  Oct 2025
//!
//! Offset based pagination over any page returning endpoint.
//! Pages are pulled lazily so callers that stop early never
//! issue requests they do not need
//!

use std::collections::VecDeque;

use async_trait::async_trait;
use tracing::trace;

use crate::errors::CurateError;

pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Anything that can hand back the page starting at `offset`
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    async fn fetch_page(&self, offset: u32, limit: u32) ->
        Result<Vec<Self::Item>, CurateError>;
}

pub struct Paginator<S: PageSource> {
    source: S,
    page_size: u32,
    offset: u32,
    buffer: VecDeque<S::Item>,
    exhausted: bool
}

impl<S: PageSource> Paginator<S> {
    pub fn new(source: S) -> Self {
        Self::with_page_size(source, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            offset: 0,
            buffer: VecDeque::new(),
            exhausted: false
        }
    }

    /// Next item, fetching a new page only once the buffer runs dry.
    /// A short page is the only end marker.
    pub async fn next(&mut self) -> Result<Option<S::Item>, CurateError> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            if self.exhausted {
                return Ok(None);
            }

            let page = self.source.fetch_page(self.offset, self.page_size).await?;
            trace!(offset = self.offset, len = page.len(), "page.fetched");

            self.offset += self.page_size;
            if page.len() < self.page_size as usize {
                self.exhausted = true;
            }
            self.buffer.extend(page);
        }
    }

    /// Drains every remaining page
    pub async fn collect_all(&mut self) -> Result<Vec<S::Item>, CurateError> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }
}
