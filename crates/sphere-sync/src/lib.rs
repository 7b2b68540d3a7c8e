//! # Sphere Sync
//!
//! Rules for keeping client state consistent with the remote backend:
//! query bindings that read through the entity cache, mutation bindings that
//! invalidate what they change, and a client that flushes everything when
//! the caller identity changes.

pub mod cache_keys;
pub mod client;
pub mod feed;
pub mod forms;
pub mod handle;
pub mod mutations;
pub mod queries;

pub use client::SyncClient;
pub use handle::{QueryHandle, QueryState};
pub use mutations::{Mutation, MutationHandle, MutationStatus};
pub use queries::Query;
