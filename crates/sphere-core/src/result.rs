//! Result type aliases for the sync layer.

use crate::SphereError;

/// A specialized `Result` type for sync-layer operations.
pub type SphereResult<T> = Result<T, SphereError>;

/// A boxed future returning a `SphereResult`.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = SphereResult<T>> + Send + 'a>>;
