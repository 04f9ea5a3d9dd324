//! Token-forwarding pager
//!
//! State is exactly "current response" plus the pending continuation token.
//! There is no prefetching, no buffering beyond one page and no locking: a
//! pager (and the streams built from it) is meant for a single consumer.

use super::types::{PagedRequest, PagedResponse};
use crate::error::Error;
use crate::types::{Metadata, OptionStringExt};
use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::fmt;
use std::future::Future;
use tracing::debug;

type FetchFn<Req, Resp, E> =
    Box<dyn FnMut(Req, Metadata) -> BoxFuture<'static, Result<Resp, E>> + Send>;

/// Lazily fetched, single-pass view over a paginated list call
///
/// Created from a first page that has already been fetched. Further pages are
/// requested only when a consumer of [`pages`](Self::pages) or
/// [`items`](Self::items) needs them, with the same request and metadata as the
/// first call except for the page token. Fetch errors are handed to the
/// consumer unchanged, after which the sequence ends.
///
/// A pager cannot be rewound; issue a new list call to start over.
pub struct Pager<Req, Resp, E = Error> {
    request: Req,
    response: Resp,
    metadata: Metadata,
    fetch: FetchFn<Req, Resp, E>,
}

impl<Req, Resp, E> Pager<Req, Resp, E>
where
    Req: PagedRequest + Send + 'static,
    Resp: PagedResponse + Send + 'static,
    E: Send + 'static,
{
    /// Wrap an already fetched first page
    ///
    /// `fetch` is invoked once per additional page with the request to send and
    /// the metadata of the original call. Construction never calls it.
    pub fn new<F, Fut>(request: Req, response: Resp, metadata: Metadata, mut fetch: F) -> Self
    where
        F: FnMut(Req, Metadata) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Resp, E>> + Send + 'static,
    {
        Self {
            request,
            response,
            metadata,
            fetch: Box::new(move |request, metadata| Box::pin(fetch(request, metadata))),
        }
    }

    /// Request that produced the current page
    pub fn request(&self) -> &Req {
        &self.request
    }

    /// The page currently held in memory
    pub fn response(&self) -> &Resp {
        &self.response
    }

    /// Metadata attached to every page fetch
    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }

    /// Whether the held page announces a further page
    pub fn has_next_page(&self) -> bool {
        !self.response.next_page_token().is_empty()
    }

    /// Stream of whole responses, starting with the held first page
    ///
    /// Yields one element per underlying call. The first element is produced
    /// without I/O.
    pub fn pages(self) -> BoxStream<'static, Result<Resp, E>> {
        let cursor = PageCursor {
            request: self.request,
            pending: Some(self.response),
            next_token: None,
            metadata: self.metadata,
            fetch: self.fetch,
        };

        stream::unfold(cursor, |mut cursor| async move {
            let page = cursor.advance().await?;
            Some((page, cursor))
        })
        .boxed()
    }

    /// Stream of individual items across all pages
    ///
    /// The next page is fetched only after every item of the current one has
    /// been yielded.
    pub fn items(self) -> BoxStream<'static, Result<Resp::Item, E>>
    where
        Resp::Item: Send + 'static,
    {
        self.pages()
            .map_ok(|page| stream::iter(page.into_items().into_iter().map(Ok::<_, E>)))
            .try_flatten()
            .boxed()
    }
}

impl<Req, Resp: fmt::Debug, E> fmt::Debug for Pager<Req, Resp, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("response", &self.response)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Iteration state behind [`Pager::pages`]
struct PageCursor<Req, Resp, E> {
    request: Req,
    pending: Option<Resp>,
    next_token: Option<String>,
    metadata: Metadata,
    fetch: FetchFn<Req, Resp, E>,
}

impl<Req, Resp, E> PageCursor<Req, Resp, E>
where
    Req: PagedRequest,
    Resp: PagedResponse,
{
    async fn advance(&mut self) -> Option<Result<Resp, E>> {
        if let Some(page) = self.pending.take() {
            self.next_token = page.next_page_token().none_if_empty();
            return Some(Ok(page));
        }

        // The token is taken before the call so a failed fetch ends the sequence.
        let token = self.next_token.take()?;
        self.request.set_page_token(token);
        debug!(
            "Fetching next page ({} byte token)",
            self.request.page_token().len()
        );

        match (self.fetch)(self.request.clone(), self.metadata.clone()).await {
            Ok(page) => {
                self.next_token = page.next_page_token().none_if_empty();
                Some(Ok(page))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
