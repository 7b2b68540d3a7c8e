//! # Sphere Cache
//!
//! In-memory entity cache for query results fetched from the remote access
//! port. Each key holds one entry, at most one fetch in flight, and a watch
//! channel that notifies subscribers of every state transition.

mod entry;
mod key;
mod retry;
mod store;
mod subscription;

pub use entry::{CacheEntry, CacheStatus, CachedValue};
pub use key::{CacheKey, KeyPattern};
pub use retry::RetryPolicy;
pub use store::{EntityCache, Fetcher};
pub use subscription::Subscription;
