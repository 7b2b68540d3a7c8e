//! Keyed entity store.

use crate::entry::{CacheEntry, CachedValue};
use crate::key::{CacheKey, KeyPattern};
use crate::retry::RetryPolicy;
use crate::subscription::Subscription;
use futures::future::{FutureExt, Shared};
use parking_lot::Mutex;
use serde_json::Value;
use sphere_core::{BoxFuture, SphereError, SphereResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Produces the JSON form of a remote read.
///
/// Called once per fetch; the returned future runs outside every cache lock.
pub type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, Value> + Send + Sync>;

type InFlight = Shared<BoxFuture<'static, CachedValue>>;

struct Slot {
    entry: CacheEntry,
    notifier: watch::Sender<CacheEntry>,
    fetcher: Option<Fetcher>,
    in_flight: Option<InFlight>,
    /// Bumped for every started fetch and every flush; older completions are dropped.
    generation: u64,
    /// Invalidated while a fetch was in flight.
    refetch_on_settle: bool,
    subscribers: usize,
    active: usize,
}

impl Slot {
    fn new() -> Self {
        let (notifier, _) = watch::channel(CacheEntry::idle());
        Self {
            entry: CacheEntry::idle(),
            notifier,
            fetcher: None,
            in_flight: None,
            generation: 0,
            refetch_on_settle: false,
            subscribers: 0,
            active: 0,
        }
    }

    fn set(&mut self, entry: CacheEntry) {
        self.entry = entry.clone();
        self.notifier.send_replace(entry);
    }

    fn mark_stale(&mut self) {
        let entry = CacheEntry {
            stale: true,
            ..self.entry.clone()
        };
        self.set(entry);
    }

    fn needs_fetch(&self) -> bool {
        self.in_flight.is_none() && !self.entry.is_fresh()
    }
}

struct State {
    slots: HashMap<CacheKey, Slot>,
    /// Bumped by `flush`; completions from an older epoch are discarded.
    epoch: u64,
}

pub(crate) struct Inner {
    state: Mutex<State>,
    retry: RetryPolicy,
}

/// In-memory store of remote query results.
///
/// Cheap to clone; clones share the same entries. Locks are held only for
/// bookkeeping and never across a fetch.
#[derive(Clone)]
pub struct EntityCache {
    inner: Arc<Inner>,
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl EntityCache {
    /// Creates an empty cache whose fetches follow `retry`.
    #[must_use]
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    slots: HashMap::new(),
                    epoch: 0,
                }),
                retry,
            }),
        }
    }

    /// Returns the current entry for `key`, if one exists.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.inner
            .state
            .lock()
            .slots
            .get(key)
            .map(|slot| slot.entry.clone())
    }

    /// Registers interest in `key`.
    ///
    /// When `active`, a fetch starts unless the entry is fresh or one is
    /// already in flight. Inactive subscriptions observe the entry without
    /// ever triggering a fetch. Background fetches need a tokio runtime;
    /// outside one the entry stays as it is until `fetch` is awaited.
    pub fn subscribe(&self, key: CacheKey, fetcher: Fetcher, active: bool) -> Subscription {
        let runtime = Handle::try_current().ok();
        let (receiver, started) = {
            let mut state = self.inner.state.lock();
            let epoch = state.epoch;
            let slot = state.slots.entry(key.clone()).or_insert_with(Slot::new);
            slot.subscribers += 1;

            let mut started = None;
            if active {
                slot.active += 1;
                slot.fetcher = Some(fetcher);
                if runtime.is_some() && slot.needs_fetch() {
                    started = start_fetch(&self.inner, slot, &key, epoch);
                }
            }
            (slot.notifier.subscribe(), started)
        };

        if let (Some(runtime), Some(fetch)) = (runtime, started) {
            runtime.spawn(fetch);
        }

        Subscription::new(key, receiver, self.clone(), active)
    }

    /// Reads `key` once.
    ///
    /// Returns the cached value when fresh, joins the in-flight fetch when
    /// one exists, and starts a fetch otherwise.
    pub async fn fetch(&self, key: CacheKey, fetcher: Fetcher) -> SphereResult<CachedValue> {
        let pending = {
            let mut state = self.inner.state.lock();
            let epoch = state.epoch;
            let slot = state.slots.entry(key.clone()).or_insert_with(Slot::new);

            if let (true, Some(value)) = (slot.entry.is_fresh(), &slot.entry.value) {
                debug!(key = %key, "Cache hit");
                return Ok(value.clone());
            }

            match &slot.in_flight {
                Some(in_flight) => {
                    debug!(key = %key, "Joining in-flight fetch");
                    (in_flight.clone(), false)
                }
                None => {
                    slot.fetcher = Some(fetcher);
                    let started = start_fetch(&self.inner, slot, &key, epoch)
                        .ok_or_else(|| SphereError::internal("fetch started without a fetcher"))?;
                    (started, true)
                }
            }
        };

        let (fetch, spawn) = pending;
        if spawn {
            // Detached so the result is stored even if this caller goes away.
            if let Ok(runtime) = Handle::try_current() {
                runtime.spawn(fetch.clone());
            }
        }
        fetch.await
    }

    /// Marks every entry selected by `pattern` stale.
    ///
    /// Entries with active subscribers refetch right away; entries with a
    /// fetch in flight refetch once it settles. Returns the number of
    /// entries matched.
    pub fn invalidate(&self, pattern: &KeyPattern) -> usize {
        let runtime = Handle::try_current().ok();
        let mut started = Vec::new();
        let mut matched = 0;
        {
            let mut state = self.inner.state.lock();
            let epoch = state.epoch;
            for (key, slot) in state.slots.iter_mut() {
                if !pattern.matches(key) {
                    continue;
                }
                matched += 1;
                slot.mark_stale();
                if slot.in_flight.is_some() {
                    slot.refetch_on_settle = true;
                } else if runtime.is_some() && slot.active > 0 {
                    if let Some(fetch) = start_fetch(&self.inner, slot, key, epoch) {
                        started.push((key.clone(), fetch));
                    }
                }
            }
        }

        debug!(pattern = %pattern, matched, refetching = started.len(), "Invalidated cache entries");
        spawn_all(runtime.as_ref(), started);
        matched
    }

    /// Discards every entry.
    ///
    /// Fetches already in flight keep running, but their results are never
    /// stored. Keys with active subscribers start over with a fresh fetch.
    pub fn flush(&self) {
        self.reset(true);
    }

    /// Discards every entry without refetching.
    ///
    /// Observed entries stay `Idle` until they are invalidated or
    /// subscribed to again.
    pub fn clear(&self) {
        self.reset(false);
    }

    fn reset(&self, refetch: bool) {
        let runtime = Handle::try_current().ok();
        let refetch = refetch && runtime.is_some();
        let mut started = Vec::new();
        {
            let mut state = self.inner.state.lock();
            state.epoch += 1;
            let epoch = state.epoch;
            let before = state.slots.len();
            state.slots.retain(|_, slot| slot.subscribers > 0);
            info!(
                discarded = before - state.slots.len(),
                observed = state.slots.len(),
                refetch,
                "Flushing entity cache"
            );

            for (key, slot) in state.slots.iter_mut() {
                slot.in_flight = None;
                slot.refetch_on_settle = false;
                slot.generation += 1;
                slot.set(CacheEntry::idle());
                if refetch && slot.active > 0 {
                    if let Some(fetch) = start_fetch(&self.inner, slot, key, epoch) {
                        started.push((key.clone(), fetch));
                    }
                }
            }
        }

        spawn_all(runtime.as_ref(), started);
    }

    /// Returns every entry ordered by key.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<CacheKey, CacheEntry> {
        self.inner
            .state
            .lock()
            .slots
            .iter()
            .map(|(key, slot)| (key.clone(), slot.entry.clone()))
            .collect()
    }

    /// Returns how many live subscriptions observe `key`.
    #[must_use]
    pub fn subscriber_count(&self, key: &CacheKey) -> usize {
        self.inner
            .state
            .lock()
            .slots
            .get(key)
            .map_or(0, |slot| slot.subscribers)
    }

    /// Checks if a fetch for `key` is in flight.
    #[must_use]
    pub fn is_fetching(&self, key: &CacheKey) -> bool {
        self.inner
            .state
            .lock()
            .slots
            .get(key)
            .is_some_and(|slot| slot.in_flight.is_some())
    }

    pub(crate) fn release(&self, key: &CacheKey, active: bool) {
        let mut state = self.inner.state.lock();
        if let Some(slot) = state.slots.get_mut(key) {
            slot.subscribers = slot.subscribers.saturating_sub(1);
            if active {
                slot.active = slot.active.saturating_sub(1);
            }
        }
    }
}

fn start_fetch(inner: &Arc<Inner>, slot: &mut Slot, key: &CacheKey, epoch: u64) -> Option<InFlight> {
    let fetcher = slot.fetcher.clone()?;
    slot.generation += 1;
    let generation = slot.generation;
    let retry = inner.retry.clone();
    let cache = Arc::downgrade(inner);
    let owned_key = key.clone();

    debug!(key = %key, generation, "Starting fetch");
    let fetch: BoxFuture<'static, CachedValue> = Box::pin(async move {
        let result = retry.execute(|| fetcher()).await.map(Arc::new);
        if let Some(inner) = cache.upgrade() {
            settle(&inner, &owned_key, epoch, generation, &result);
        }
        result
    });
    let fetch = fetch.shared();

    slot.in_flight = Some(fetch.clone());
    slot.refetch_on_settle = false;
    let loading = slot.entry.clone().into_loading();
    slot.set(loading);
    Some(fetch)
}

fn settle(
    inner: &Arc<Inner>,
    key: &CacheKey,
    epoch: u64,
    generation: u64,
    result: &SphereResult<CachedValue>,
) {
    let runtime = Handle::try_current().ok();
    let follow_up = {
        let mut state = inner.state.lock();
        if state.epoch != epoch {
            debug!(key = %key, "Discarding result fetched before flush");
            return;
        }
        let Some(slot) = state.slots.get_mut(key) else {
            return;
        };
        if slot.generation != generation {
            return;
        }

        slot.in_flight = None;
        let stale = slot.refetch_on_settle;
        let entry = match result {
            Ok(value) => CacheEntry::succeeded(value.clone(), stale),
            Err(SphereError::PortUnavailable) => {
                debug!(key = %key, "No remote port; entry stays idle");
                slot.refetch_on_settle = false;
                slot.set(slot.entry.clone().into_idle());
                return;
            }
            Err(err) => {
                warn!(key = %key, error = %err, "Fetch failed");
                slot.entry.clone().failed(err.clone())
            }
        };
        slot.set(entry);

        if stale && slot.active > 0 && runtime.is_some() {
            start_fetch(inner, slot, key, epoch)
        } else {
            slot.refetch_on_settle = false;
            None
        }
    };

    if let (Some(runtime), Some(fetch)) = (runtime, follow_up) {
        runtime.spawn(fetch);
    }
}

fn spawn_all(runtime: Option<&Handle>, started: Vec<(CacheKey, InFlight)>) {
    let Some(runtime) = runtime else {
        return;
    };
    for (key, fetch) in started {
        debug!(key = %key, "Spawning background fetch");
        runtime.spawn(fetch);
    }
}
