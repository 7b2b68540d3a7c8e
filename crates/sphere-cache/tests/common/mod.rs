//! Shared fetchers for entity cache tests.

use serde_json::{json, Value};
use sphere_cache::Fetcher;
use sphere_core::{BoxFuture, SphereError, SphereResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Fetcher that counts its calls and returns the call number.
///
/// While gated, the first call waits until `open` is invoked.
#[derive(Clone, Default)]
pub struct CountingFetcher {
    calls: Arc<AtomicUsize>,
    gate: Arc<Notify>,
    gated: bool,
    failing: bool,
    portless: bool,
}

impl CountingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Holds the first call until `open` is invoked.
    pub fn gated() -> Self {
        Self {
            gated: true,
            ..Self::default()
        }
    }

    /// Every call fails with a remote rejection.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Every call fails because no remote port is connected.
    pub fn portless() -> Self {
        Self {
            portless: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn open(&self) {
        self.gate.notify_one();
    }

    pub fn fetcher(&self) -> Fetcher {
        let this = self.clone();
        Arc::new(move || -> BoxFuture<'static, Value> {
            let this = this.clone();
            Box::pin(async move { this.call().await })
        })
    }

    async fn call(&self) -> SphereResult<Value> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.gated && n == 0 {
            self.gate.notified().await;
        }
        if self.portless {
            return Err(SphereError::PortUnavailable);
        }
        if self.failing {
            return Err(SphereError::rejected("getAllPosts", "backend down"));
        }
        Ok(json!(n))
    }
}

/// Lets spawned fetch tasks run to completion.
pub async fn drain() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
