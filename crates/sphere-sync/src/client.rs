//! Sync client: the entry point UI consumers hold.

use parking_lot::RwLock;
use serde::Deserialize;
use sphere_cache::{EntityCache, Fetcher};
use sphere_core::{BoxFuture, Principal, SphereError, SphereResult};
use sphere_port::{IdentityProvider, PortFactory, RemotePort};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::handle::QueryHandle;
use crate::mutations::{Mutation, MutationHandle};
use crate::queries::Query;

#[derive(Default)]
struct SessionState {
    port: Option<Arc<dyn RemotePort>>,
    identity: Option<Principal>,
}

/// Port and identity currently in use.
///
/// Fetchers hold this rather than the client, so cached fetchers never keep
/// the cache itself alive.
#[derive(Default)]
struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    fn port(&self) -> Option<Arc<dyn RemotePort>> {
        self.state.read().port.clone()
    }
}

struct ClientInner {
    cache: EntityCache,
    factory: Arc<dyn PortFactory>,
    session: Arc<Session>,
}

/// Reads and writes remote state through the entity cache.
///
/// Cheap to clone. The port is absent until `connect` succeeds; until then
/// every query binding is disabled and mutations fail with
/// `SphereError::PortUnavailable`.
#[derive(Clone)]
pub struct SyncClient {
    inner: Arc<ClientInner>,
}

impl SyncClient {
    /// Creates a client that builds its ports with `factory`.
    pub fn new(cache: EntityCache, factory: Arc<dyn PortFactory>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                cache,
                factory,
                session: Arc::new(Session::default()),
            }),
        }
    }

    /// The cache this client reads through.
    #[must_use]
    pub fn cache(&self) -> &EntityCache {
        &self.inner.cache
    }

    /// Checks if a port is available.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.session.state.read().port.is_some()
    }

    /// The identity the current port acts as.
    #[must_use]
    pub fn identity(&self) -> Option<Principal> {
        self.inner.session.state.read().identity.clone()
    }

    /// The current port.
    pub fn port(&self) -> SphereResult<Arc<dyn RemotePort>> {
        self.inner.session.port().ok_or(SphereError::PortUnavailable)
    }

    /// Builds a port for `identity` and makes it current.
    ///
    /// Connecting a different identity, or connecting for the first time,
    /// discards every cached entry.
    pub fn connect(&self, identity: Option<Principal>) -> SphereResult<()> {
        let port = self.inner.factory.connect(identity.as_ref())?;
        let changed = {
            let mut state = self.inner.session.state.write();
            let changed = state.port.is_none() || state.identity != identity;
            state.port = Some(port);
            state.identity = identity.clone();
            changed
        };

        if changed {
            info!(
                identity = ?identity.as_ref().map(Principal::as_str),
                "Remote port connected; flushing cache"
            );
            self.inner.cache.flush();
        }
        Ok(())
    }

    /// Drops the port and every cached entry.
    ///
    /// Mounted bindings fall back to `Idle` instead of refetching.
    pub fn disconnect(&self) {
        *self.inner.session.state.write() = SessionState::default();
        info!("Remote port disconnected; clearing cache");
        self.inner.cache.clear();
    }

    /// Connects as the provider's identity now and after every change.
    ///
    /// Must be called from within a tokio runtime.
    pub fn follow_identity(&self, provider: &dyn IdentityProvider) -> SphereResult<JoinHandle<()>> {
        let mut changes = provider.subscribe();
        let initial = changes.borrow_and_update().clone();
        self.connect(initial)?;

        let client = self.clone();
        Ok(tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let identity = changes.borrow_and_update().clone();
                if let Err(err) = client.connect(identity) {
                    warn!(error = %err, "Failed to connect remote port for new identity");
                }
            }
            debug!("Identity provider closed");
        }))
    }

    /// Mounts a query binding.
    ///
    /// A disabled binding returns its placeholder and never fetches. Handles
    /// do not re-evaluate readiness; mount again after connecting.
    pub fn watch<Q: Query>(&self, query: Q) -> QueryHandle<Q::Output> {
        let placeholder = query.placeholder();
        match query.key() {
            Some(key) if query.is_enabled(self.is_ready()) => {
                let subscription = self.inner.cache.subscribe(key, self.fetcher(query), true);
                QueryHandle::active(placeholder, subscription)
            }
            _ => {
                debug!(query = std::any::type_name::<Q>(), "Query disabled");
                QueryHandle::disabled(placeholder)
            }
        }
    }

    /// Reads a query once through the cache.
    ///
    /// A disabled binding resolves to its placeholder without fetching.
    pub async fn fetch<Q: Query>(&self, query: Q) -> SphereResult<Q::Output> {
        let key = match query.key() {
            Some(key) if query.is_enabled(self.is_ready()) => key,
            _ => return Ok(query.placeholder()),
        };
        let value = self.inner.cache.fetch(key, self.fetcher(query)).await?;
        Ok(<Q::Output as Deserialize>::deserialize(value.as_ref())?)
    }

    /// Returns the last successfully fetched value, stale or not.
    #[must_use]
    pub fn cached<Q: Query>(&self, query: &Q) -> Option<Q::Output> {
        let entry = self.inner.cache.get(&query.key()?)?;
        entry.value_as::<Q::Output>().ok().flatten()
    }

    /// Runs a mutation and invalidates what it changed.
    ///
    /// Invalidation happens before this returns. On failure nothing is
    /// invalidated.
    pub async fn mutate<M: Mutation>(&self, mutation: M) -> SphereResult<M::Output> {
        let port = self.port()?;
        let name = mutation.name();
        info!(mutation = name, "Running mutation");

        match mutation.execute(port.as_ref()).await {
            Ok(output) => {
                let patterns = mutation.invalidates(&output);
                for pattern in &patterns {
                    self.inner.cache.invalidate(pattern);
                }
                info!(mutation = name, invalidated = patterns.len(), "Mutation succeeded");
                Ok(output)
            }
            Err(err) => {
                warn!(mutation = name, error = %err, "Mutation failed");
                Err(err)
            }
        }
    }

    /// Creates a status-tracking handle for running mutations.
    #[must_use]
    pub fn mutation_handle(&self) -> MutationHandle {
        MutationHandle::new(self.clone())
    }

    fn fetcher<Q: Query>(&self, query: Q) -> Fetcher {
        let query = Arc::new(query);
        let session = Arc::clone(&self.inner.session);
        Arc::new(move || -> BoxFuture<'static, serde_json::Value> {
            let query = Arc::clone(&query);
            let session = Arc::clone(&session);
            Box::pin(async move {
                let port = session.port().ok_or(SphereError::PortUnavailable)?;
                let output = query.fetch(port.as_ref()).await?;
                Ok::<_, SphereError>(serde_json::to_value(output)?)
            })
        })
    }
}
