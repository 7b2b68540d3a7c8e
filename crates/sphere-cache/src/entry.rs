//! Cache entries.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sphere_core::{SphereError, SphereResult};
use std::sync::Arc;

/// Immutable snapshot of a remote result.
///
/// Refetches replace the `Arc` wholesale; the value is never mutated in place.
pub type CachedValue = Arc<serde_json::Value>;

/// Fetch status of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    /// Created but never fetched.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last fetch succeeded.
    Success,
    /// The last fetch failed.
    Error,
}

/// State of one cached query.
///
/// `value` is populated only in `Success` and `error` only in `Error`.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub status: CacheStatus,
    pub value: Option<CachedValue>,
    pub error: Option<SphereError>,
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// Set by invalidation; cleared by the next successful fetch.
    pub stale: bool,
}

impl CacheEntry {
    /// Entry that has never been fetched.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            status: CacheStatus::Idle,
            value: None,
            error: None,
            last_fetched_at: None,
            stale: false,
        }
    }

    pub(crate) fn into_loading(self) -> Self {
        Self {
            status: CacheStatus::Loading,
            value: None,
            error: None,
            ..self
        }
    }

    pub(crate) fn into_idle(self) -> Self {
        Self {
            status: CacheStatus::Idle,
            value: None,
            error: None,
            ..self
        }
    }

    pub(crate) fn succeeded(value: CachedValue, stale: bool) -> Self {
        Self {
            status: CacheStatus::Success,
            value: Some(value),
            error: None,
            last_fetched_at: Some(Utc::now()),
            stale,
        }
    }

    pub(crate) fn failed(self, error: SphereError) -> Self {
        Self {
            status: CacheStatus::Error,
            value: None,
            error: Some(error),
            last_fetched_at: Some(Utc::now()),
            stale: self.stale,
        }
    }

    /// Checks if the entry holds an authoritative value.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.status == CacheStatus::Success && !self.stale
    }

    /// Checks if a fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == CacheStatus::Loading
    }

    /// Deserializes the cached value.
    ///
    /// Returns `None` unless the entry is in `Success`.
    pub fn value_as<T: DeserializeOwned>(&self) -> SphereResult<Option<T>> {
        match &self.value {
            Some(value) => Ok(Some(T::deserialize(value.as_ref())?)),
            None => Ok(None),
        }
    }
}

impl Default for CacheEntry {
    fn default() -> Self {
        Self::idle()
    }
}
