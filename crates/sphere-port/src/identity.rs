//! Identity collaborator.

use async_trait::async_trait;
use sphere_core::{Principal, SphereError, SphereResult};
use tokio::sync::watch;
use tracing::info;

/// Source of the current caller identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in principal, or `None` when signed out.
    fn current(&self) -> Option<Principal>;

    /// Notifies every identity change.
    fn subscribe(&self) -> watch::Receiver<Option<Principal>>;

    /// Signs in and returns the resulting principal.
    async fn login(&self) -> SphereResult<Principal>;

    /// Signs out.
    fn logout(&self);
}

/// Identity held in process memory.
///
/// `login` signs in as the credential supplied at construction; without one,
/// login is rejected.
pub struct SessionIdentity {
    credential: Option<Principal>,
    current: watch::Sender<Option<Principal>>,
}

impl SessionIdentity {
    /// Creates a signed-out session that can log in as `credential`.
    #[must_use]
    pub fn new(credential: Option<Principal>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            credential,
            current,
        }
    }

    /// Creates a session already signed in as `principal`.
    #[must_use]
    pub fn signed_in(principal: Principal) -> Self {
        let session = Self::new(Some(principal.clone()));
        session.current.send_replace(Some(principal));
        session
    }

    fn set(&self, next: Option<Principal>) {
        self.current.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            info!(
                from = ?current.as_ref().map(Principal::as_str),
                to = ?next.as_ref().map(Principal::as_str),
                "Identity changed"
            );
            *current = next;
            true
        });
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentity {
    fn current(&self) -> Option<Principal> {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Principal>> {
        self.current.subscribe()
    }

    async fn login(&self) -> SphereResult<Principal> {
        let principal = self
            .credential
            .clone()
            .ok_or_else(|| SphereError::rejected("login", "No identity configured"))?;
        self.set(Some(principal.clone()));
        Ok(principal)
    }

    fn logout(&self) {
        self.set(None);
    }
}
