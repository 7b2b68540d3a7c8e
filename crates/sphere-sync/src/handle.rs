//! Typed views onto cached queries.

use serde::de::DeserializeOwned;
use sphere_cache::{CacheEntry, CacheKey, CacheStatus, Subscription};
use sphere_core::SphereError;

/// What a consumer sees of one query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub status: CacheStatus,
    /// Decoded value on success, the binding's placeholder otherwise.
    pub data: T,
    pub error: Option<SphereError>,
    pub is_stale: bool,
    /// `false` when the binding is disabled and never fetches.
    pub is_enabled: bool,
}

impl<T> QueryState<T> {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == CacheStatus::Loading
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == CacheStatus::Success
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == CacheStatus::Error
    }
}

/// A mounted query binding.
///
/// Holds the cache subscription while enabled; dropping the handle
/// unmounts it. A disabled handle never touches the cache.
pub struct QueryHandle<T> {
    placeholder: T,
    subscription: Option<Subscription>,
}

impl<T: DeserializeOwned + Clone> QueryHandle<T> {
    pub(crate) fn disabled(placeholder: T) -> Self {
        Self {
            placeholder,
            subscription: None,
        }
    }

    pub(crate) fn active(placeholder: T, subscription: Subscription) -> Self {
        Self {
            placeholder,
            subscription: Some(subscription),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.subscription.is_some()
    }

    /// The observed key; `None` while disabled.
    #[must_use]
    pub fn key(&self) -> Option<&CacheKey> {
        self.subscription.as_ref().map(Subscription::key)
    }

    /// Current state, computed without waiting.
    #[must_use]
    pub fn state(&self) -> QueryState<T> {
        match &self.subscription {
            Some(subscription) => decode(&self.placeholder, subscription.current()),
            None => QueryState {
                status: CacheStatus::Idle,
                data: self.placeholder.clone(),
                error: None,
                is_stale: false,
                is_enabled: false,
            },
        }
    }

    /// Shorthand for `state().data`.
    #[must_use]
    pub fn data(&self) -> T {
        self.state().data
    }

    /// Waits for the next state transition.
    ///
    /// Disabled handles never change and return `None` right away.
    pub async fn changed(&mut self) -> Option<QueryState<T>> {
        let subscription = self.subscription.as_mut()?;
        let entry = subscription.changed().await?;
        Some(decode(&self.placeholder, entry))
    }

    /// Waits until no fetch is in flight.
    pub async fn settled(&mut self) -> QueryState<T> {
        if let Some(subscription) = self.subscription.as_mut() {
            let entry = subscription.settled().await;
            return decode(&self.placeholder, entry);
        }
        self.state()
    }

    /// Fetches the query again.
    pub fn refetch(&self) {
        if let Some(subscription) = &self.subscription {
            subscription.refetch();
        }
    }
}

fn decode<T: DeserializeOwned + Clone>(placeholder: &T, entry: CacheEntry) -> QueryState<T> {
    let is_stale = entry.stale;
    match entry.value_as::<T>() {
        Ok(value) => QueryState {
            status: entry.status,
            data: value.unwrap_or_else(|| placeholder.clone()),
            error: entry.error,
            is_stale,
            is_enabled: true,
        },
        Err(err) => QueryState {
            status: CacheStatus::Error,
            data: placeholder.clone(),
            error: Some(err),
            is_stale,
            is_enabled: true,
        },
    }
}
