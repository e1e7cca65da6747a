// ── Query subscriptions ──
//
// A `QueryHandle` is one mounted consumer of a cache entry. It keeps the
// entry alive, observes its state, and unsubscribes on drop.

use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::key::{QueryData, QueryKey};
use super::state::{EntryState, QueryState, QueryStatus};
use crate::api::ProductApi;
use crate::error::CoreError;

/// A live subscription to one cached query.
pub struct QueryHandle<T: QueryData> {
    api: ProductApi,
    key: QueryKey,
    entry_id: u64,
    receiver: watch::Receiver<EntryState>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: QueryData> QueryHandle<T> {
    pub(crate) fn new(
        api: ProductApi,
        key: QueryKey,
        entry_id: u64,
        receiver: watch::Receiver<EntryState>,
    ) -> Self {
        Self {
            api,
            key,
            entry_id,
            receiver,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// The entry's state right now.
    pub fn current(&self) -> QueryState<T> {
        QueryState::project(&self.receiver.borrow())
    }

    /// Wait for the next state change.
    /// Returns `None` if the cache entry has gone away.
    pub async fn changed(&mut self) -> Option<QueryState<T>> {
        self.receiver.changed().await.ok()?;
        Some(QueryState::project(&self.receiver.borrow_and_update()))
    }

    /// Wait until no fetch is running, then return the data or the error.
    pub async fn settled(&mut self) -> Result<Arc<T>, CoreError> {
        loop {
            {
                let state = QueryState::<T>::project(&self.receiver.borrow_and_update());
                if !state.is_fetching {
                    match state.status {
                        QueryStatus::Ready(data) => return Ok(data),
                        QueryStatus::Failed(err) => return Err(err),
                        QueryStatus::Loading => {}
                    }
                }
            }
            if self.receiver.changed().await.is_err() {
                return Err(CoreError::Internal(format!(
                    "cache entry for {} dropped while waiting",
                    self.key
                )));
            }
        }
    }

    /// Fetch again unless a fetch is already running.
    pub fn refetch(&self) {
        if let Some(ticket) = self.api.cache().refetch(&self.key, self.entry_id) {
            self.api.spawn_fetch(ticket);
        }
    }

    /// Convert into a `Stream` of states, starting with the current one.
    /// The subscription lives as long as the stream.
    pub fn into_stream(self) -> QueryStream<T> {
        QueryStream {
            inner: WatchStream::new(self.receiver.clone()),
            _handle: self,
        }
    }
}

impl<T: QueryData> Drop for QueryHandle<T> {
    fn drop(&mut self) {
        self.api.cache().release(&self.key, self.entry_id);
    }
}

impl<T: QueryData> std::fmt::Debug for QueryHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryHandle")
            .field("key", &self.key)
            .field("entry_id", &self.entry_id)
            .finish_non_exhaustive()
    }
}

/// `Stream` adapter over a [`QueryHandle`].
pub struct QueryStream<T: QueryData> {
    inner: WatchStream<EntryState>,
    _handle: QueryHandle<T>,
}

impl<T: QueryData> Stream for QueryStream<T> {
    type Item = QueryState<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner)
            .poll_next(cx)
            .map(|next| next.map(|entry| QueryState::project(&entry)))
    }
}
