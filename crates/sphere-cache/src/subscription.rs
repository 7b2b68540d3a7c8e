//! Live views onto cache entries.

use crate::entry::CacheEntry;
use crate::key::{CacheKey, KeyPattern};
use crate::store::EntityCache;
use tokio::sync::watch;

/// Interest in one cache key.
///
/// Dropping the subscription unregisters it. A fetch it started keeps
/// running and its result is still stored.
pub struct Subscription {
    key: CacheKey,
    receiver: watch::Receiver<CacheEntry>,
    cache: EntityCache,
    active: bool,
}

impl Subscription {
    pub(crate) fn new(
        key: CacheKey,
        receiver: watch::Receiver<CacheEntry>,
        cache: EntityCache,
        active: bool,
    ) -> Self {
        Self {
            key,
            receiver,
            cache,
            active,
        }
    }

    /// The observed key.
    #[must_use]
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Whether this subscription may trigger fetches.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the entry as of now.
    #[must_use]
    pub fn current(&self) -> CacheEntry {
        self.receiver.borrow().clone()
    }

    /// Waits for the next transition of the entry.
    ///
    /// Returns `None` once the entry can no longer change.
    pub async fn changed(&mut self) -> Option<CacheEntry> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Waits until no fetch is in flight and returns the entry.
    pub async fn settled(&mut self) -> CacheEntry {
        if let Ok(entry) = self.receiver.wait_for(|entry| !entry.is_loading()).await {
            return entry.clone();
        }
        self.current()
    }

    /// Marks the entry stale so it is fetched again.
    pub fn refetch(&self) {
        self.cache.invalidate(&KeyPattern::from(&self.key));
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cache.release(&self.key, self.active);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("active", &self.active)
            .finish()
    }
}
