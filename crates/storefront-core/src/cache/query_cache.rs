// ── Tag-invalidated query cache ──
//
// One entry per `QueryKey`, each publishing its state through a `watch`
// channel. A tag index (`Tag -> keys`) drives invalidation. The cache never
// performs I/O: it hands out `FetchTicket`s and the owner runs the fetch
// and reports back through `complete`.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::trace;

use super::key::{QueryKey, QueryValue, Tag};
use super::state::{EntryState, EntryStatus};
use crate::error::CoreError;

/// Permission to run the single in-flight fetch for one entry.
#[derive(Debug)]
#[must_use = "a ticket must be completed or the entry stays fetching"]
pub struct FetchTicket {
    key: QueryKey,
    entry_id: u64,
    epoch: u64,
}

impl FetchTicket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

/// Returned by [`QueryCache::acquire`].
pub(crate) struct Subscription {
    pub(crate) entry_id: u64,
    pub(crate) receiver: watch::Receiver<EntryState>,
    pub(crate) ticket: Option<FetchTicket>,
}

#[derive(Debug)]
struct Entry {
    /// Distinguishes a re-created entry from an evicted one with the same key.
    id: u64,
    state: watch::Sender<EntryState>,
    subscribers: usize,
    idle_since: Option<Instant>,
    /// Bumped on every invalidation.
    epoch: u64,
    /// Epoch of the running fetch, if any.
    in_flight: Option<u64>,
}

impl Entry {
    fn start_fetch(&mut self, key: &QueryKey) -> FetchTicket {
        self.in_flight = Some(self.epoch);
        self.state.send_modify(|s| s.is_fetching = true);
        FetchTicket {
            key: key.clone(),
            entry_id: self.id,
            epoch: self.epoch,
        }
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<QueryKey, Entry>,
    tags: HashMap<Tag, HashSet<QueryKey>>,
    next_id: u64,
}

impl CacheInner {
    fn insert(&mut self, key: &QueryKey) {
        self.next_id += 1;
        let (state, _) = watch::channel(EntryState::loading());
        for tag in key.provides() {
            self.tags.entry(tag).or_default().insert(key.clone());
        }
        trace!(query = %key, "cache entry created");
        self.entries.insert(
            key.clone(),
            Entry {
                id: self.next_id,
                state,
                subscribers: 0,
                idle_since: None,
                epoch: 0,
                in_flight: None,
            },
        );
    }

    fn remove(&mut self, key: &QueryKey) {
        if self.entries.remove(key).is_none() {
            return;
        }
        for tag in key.provides() {
            if let Some(keys) = self.tags.get_mut(&tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.tags.remove(&tag);
                }
            }
        }
        trace!(query = %key, "cache entry evicted");
    }

    fn sweep(&mut self, now: Instant, grace: Duration) -> usize {
        let expired: Vec<QueryKey> = self
            .entries
            .iter()
            .filter(|(_, e)| {
                e.subscribers == 0
                    && e.in_flight.is_none()
                    && e.idle_since.is_some_and(|t| now.duration_since(t) >= grace)
            })
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }

    fn matching(&self, tags: &[Tag]) -> HashSet<QueryKey> {
        self.tags
            .iter()
            .filter(|(provided, _)| tags.iter().any(|t| t.matches(provided)))
            .flat_map(|(_, keys)| keys.iter().cloned())
            .collect()
    }
}

// ── QueryCache ──────────────────────────────────────────────────────

/// Explicit, injectable cache of product query results.
///
/// Guarantees at most one in-flight fetch per key. Subscribed entries hit
/// by an invalidation are refetched; unsubscribed ones are evicted.
/// Entries nobody subscribes to are collected after `grace`.
#[derive(Debug)]
pub struct QueryCache {
    inner: Mutex<CacheInner>,
    grace: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl QueryCache {
    pub fn new(grace: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            grace,
        }
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner> {
        self.inner.lock().expect("query cache lock poisoned")
    }

    // ── Inspection ───────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Number of live handles on `key` (0 if absent).
    pub fn subscribers(&self, key: &QueryKey) -> usize {
        self.lock().entries.get(key).map_or(0, |e| e.subscribers)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Subscribe to `key`, creating the entry if needed.
    ///
    /// Carries a ticket when the caller must start a fetch: the entry has no
    /// data yet (or last failed) and nothing is in flight.
    pub(crate) fn acquire(&self, key: &QueryKey) -> Subscription {
        let grace = self.grace;
        let mut inner = self.lock();
        inner.sweep(Instant::now(), grace);

        if !inner.entries.contains_key(key) {
            inner.insert(key);
        }
        let entry = inner
            .entries
            .get_mut(key)
            .expect("entry exists after insert");

        entry.subscribers += 1;
        entry.idle_since = None;

        let needs_fetch = entry.in_flight.is_none() && !entry.state.borrow().has_data();
        let ticket = needs_fetch.then(|| entry.start_fetch(key));

        Subscription {
            entry_id: entry.id,
            receiver: entry.state.subscribe(),
            ticket,
        }
    }

    /// Drop one subscriber. The entry starts its grace period at zero.
    pub(crate) fn release(&self, key: &QueryKey, entry_id: u64) {
        let mut inner = self.lock();
        if let Some(entry) = inner.entries.get_mut(key).filter(|e| e.id == entry_id) {
            entry.subscribers = entry.subscribers.saturating_sub(1);
            if entry.subscribers == 0 {
                entry.idle_since = Some(Instant::now());
            }
        }
    }

    /// Publish a fetch result to every subscriber.
    ///
    /// If the entry was invalidated while the fetch ran, the result is still
    /// published and a ticket for a fresh fetch is returned. Results for
    /// evicted entries are discarded.
    pub(crate) fn complete(
        &self,
        ticket: FetchTicket,
        result: Result<QueryValue, CoreError>,
    ) -> Option<FetchTicket> {
        let mut inner = self.lock();
        let (stale, subscribed) = match inner.entries.get(&ticket.key) {
            Some(entry) if entry.id == ticket.entry_id => {
                (ticket.epoch < entry.epoch, entry.subscribers > 0)
            }
            _ => {
                trace!(query = %ticket.key, "discarding result for evicted entry");
                return None;
            }
        };

        if stale && !subscribed {
            inner.remove(&ticket.key);
            return None;
        }

        let entry = inner.entries.get_mut(&ticket.key)?;
        let status = match result {
            Ok(value) => EntryStatus::Ready(value),
            Err(err) => EntryStatus::Failed(err),
        };
        entry.state.send_modify(|s| {
            s.status = status;
            s.updated_at = Some(Utc::now());
            s.is_fetching = stale;
        });

        if stale {
            trace!(query = %ticket.key, "result superseded by invalidation, refetching");
            entry.in_flight = Some(entry.epoch);
            Some(FetchTicket {
                key: ticket.key,
                entry_id: entry.id,
                epoch: entry.epoch,
            })
        } else {
            entry.in_flight = None;
            None
        }
    }

    /// Mark every entry providing a matching tag as stale.
    ///
    /// Returns tickets for subscribed entries that need a refetch; entries
    /// already fetching, subscribed or not, pick the invalidation up when
    /// they complete. Idle unsubscribed entries are evicted.
    pub(crate) fn invalidate(&self, tags: &[Tag]) -> Vec<FetchTicket> {
        let mut inner = self.lock();
        let mut tickets = Vec::new();

        for key in inner.matching(tags) {
            let Some(entry) = inner.entries.get_mut(&key) else {
                continue;
            };
            let subscribed = entry.subscribers > 0;
            if !subscribed && entry.in_flight.is_none() {
                inner.remove(&key);
                continue;
            }
            // An in-flight entry stays so late subscribers join its fetch;
            // `complete` evicts or refetches once the stale result lands.
            entry.epoch += 1;
            if subscribed && entry.in_flight.is_none() {
                tickets.push(entry.start_fetch(&key));
            }
        }

        tickets
    }

    /// Start a fetch for a subscribed entry unless one is already running.
    pub(crate) fn refetch(&self, key: &QueryKey, entry_id: u64) -> Option<FetchTicket> {
        let mut inner = self.lock();
        let entry = inner.entries.get_mut(key).filter(|e| e.id == entry_id)?;
        if entry.in_flight.is_some() {
            return None;
        }
        Some(entry.start_fetch(key))
    }

    /// Evict entries that have been unsubscribed for longer than the grace
    /// period. Returns the number evicted.
    pub fn sweep(&self) -> usize {
        let grace = self.grace;
        self.lock().sweep(Instant::now(), grace)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::ProductId;

    fn products() -> QueryValue {
        QueryValue::Products(Arc::new(Vec::new()))
    }

    fn get(id: &str) -> QueryKey {
        QueryKey::GetProduct(ProductId::from(id))
    }

    #[test]
    fn first_subscriber_gets_the_only_ticket() {
        let cache = QueryCache::default();

        let first = cache.acquire(&get("42"));
        let second = cache.acquire(&get("42"));

        assert!(first.ticket.is_some());
        assert!(second.ticket.is_none());
        assert_eq!(cache.subscribers(&get("42")), 2);
        assert!(second.receiver.borrow().is_fetching);
    }

    #[test]
    fn completion_is_published_to_all_subscribers() {
        let cache = QueryCache::default();
        let mut first = cache.acquire(&QueryKey::ListProducts);
        let second = cache.acquire(&QueryKey::ListProducts);

        let next = cache.complete(first.ticket.take().unwrap(), Ok(products()));

        assert!(next.is_none());
        for sub in [&first, &second] {
            let state = sub.receiver.borrow();
            assert!(state.has_data());
            assert!(!state.is_fetching);
            assert!(state.updated_at.is_some());
        }
    }

    #[test]
    fn cached_data_satisfies_new_subscribers() {
        let cache = QueryCache::default();
        let first = cache.acquire(&QueryKey::ListProducts);
        let _ = cache.complete(first.ticket.unwrap(), Ok(products()));

        let later = cache.acquire(&QueryKey::ListProducts);
        assert!(later.ticket.is_none());
    }

    #[test]
    fn failed_entry_is_retried_by_next_subscriber() {
        let cache = QueryCache::default();
        let first = cache.acquire(&get("1"));
        let _ = cache.complete(first.ticket.unwrap(), Err(CoreError::Network { reason: "down".into() }));

        let retry = cache.acquire(&get("1"));
        assert!(retry.ticket.is_some());
    }

    #[test]
    fn invalidation_refetches_subscribed_and_evicts_unsubscribed() {
        let cache = QueryCache::default();

        let list = cache.acquire(&QueryKey::ListProducts);
        let _ = cache.complete(list.ticket.unwrap(), Ok(products()));

        let detail = cache.acquire(&get("42"));
        let _ = cache.complete(detail.ticket.unwrap(), Ok(products()));
        cache.release(&get("42"), detail.entry_id);

        let tickets = cache.invalidate(&[Tag::AllProducts]);

        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].key(), &QueryKey::ListProducts);
        assert!(!cache.contains(&get("42")));
        assert!(list.receiver.borrow().is_fetching);
        assert!(list.receiver.borrow().has_data());
    }

    #[test]
    fn id_tag_leaves_the_list_alone() {
        let cache = QueryCache::default();
        let list = cache.acquire(&QueryKey::ListProducts);
        let _ = cache.complete(list.ticket.unwrap(), Ok(products()));
        let detail = cache.acquire(&get("42"));
        let _ = cache.complete(detail.ticket.unwrap(), Ok(products()));

        let tickets = cache.invalidate(&[Tag::Product(ProductId::from("42"))]);

        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].key(), &get("42"));
        assert!(!list.receiver.borrow().is_fetching);
    }

    #[test]
    fn unsubscribed_entry_in_flight_survives_invalidation() {
        let cache = QueryCache::default();
        let first = cache.acquire(&QueryKey::ListProducts);
        let ticket = first.ticket.unwrap();
        cache.release(&QueryKey::ListProducts, first.entry_id);

        assert!(cache.invalidate(&[Tag::AllProducts]).is_empty());
        assert!(cache.contains(&QueryKey::ListProducts));

        // A late subscriber joins the running fetch.
        let late = cache.acquire(&QueryKey::ListProducts);
        assert!(late.ticket.is_none());
        assert_eq!(late.entry_id, first.entry_id);

        let again = cache.complete(ticket, Ok(products())).unwrap();
        assert!(late.receiver.borrow().is_fetching);
        assert!(cache.complete(again, Ok(products())).is_none());
        assert!(!late.receiver.borrow().is_fetching);
    }

    #[test]
    fn stale_result_for_abandoned_entry_is_dropped() {
        let cache = QueryCache::default();
        let first = cache.acquire(&QueryKey::ListProducts);
        let ticket = first.ticket.unwrap();
        cache.release(&QueryKey::ListProducts, first.entry_id);

        assert!(cache.invalidate(&[Tag::AllProducts]).is_empty());
        assert!(cache.complete(ticket, Ok(products())).is_none());
        assert!(!cache.contains(&QueryKey::ListProducts));
    }

    #[test]
    fn invalidation_during_fetch_triggers_one_more_fetch() {
        let cache = QueryCache::default();
        let list = cache.acquire(&QueryKey::ListProducts);
        let ticket = list.ticket.unwrap();

        // Already fetching: no second ticket now.
        assert!(cache.invalidate(&[Tag::AllProducts]).is_empty());

        let again = cache.complete(ticket, Ok(products())).unwrap();
        assert!(list.receiver.borrow().has_data());
        assert!(list.receiver.borrow().is_fetching);

        assert!(cache.complete(again, Ok(products())).is_none());
        assert!(!list.receiver.borrow().is_fetching);
    }

    #[test]
    fn result_for_evicted_entry_is_discarded() {
        let cache = QueryCache::default();
        let sub = cache.acquire(&get("9"));
        cache.release(&get("9"), sub.entry_id);

        assert!(cache.invalidate(&[Tag::AllProducts]).is_empty());
        assert!(cache.complete(sub.ticket.unwrap(), Ok(products())).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn refetch_is_deduplicated() {
        let cache = QueryCache::default();
        let sub = cache.acquire(&QueryKey::ListProducts);
        assert!(cache.refetch(&QueryKey::ListProducts, sub.entry_id).is_none());

        let _ = cache.complete(sub.ticket.unwrap(), Ok(products()));
        assert!(cache.refetch(&QueryKey::ListProducts, sub.entry_id).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_entries_are_swept_after_grace() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let sub = cache.acquire(&QueryKey::ListProducts);
        let _ = cache.complete(sub.ticket.unwrap(), Ok(products()));
        cache.release(&QueryKey::ListProducts, sub.entry_id);

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.sweep(), 0);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(cache.sweep(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn resubscribing_cancels_collection() {
        let cache = QueryCache::new(Duration::from_secs(5));
        let sub = cache.acquire(&QueryKey::ListProducts);
        let _ = cache.complete(sub.ticket.unwrap(), Ok(products()));
        cache.release(&QueryKey::ListProducts, sub.entry_id);

        let again = cache.acquire(&QueryKey::ListProducts);
        tokio::time::advance(Duration::from_secs(10)).await;

        assert_eq!(cache.sweep(), 0);
        assert!(again.ticket.is_none());
    }
}
