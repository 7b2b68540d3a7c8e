//! # Sphere Port
//!
//! Interfaces to the collaborators the sync layer consumes but does not own:
//! the remote backend, the identity provider and the blob store.

pub mod blob;
pub mod http;
pub mod identity;
pub mod remote;

pub use blob::{start_upload, BlobStore, BlobUpload, ProgressReporter, UploadProgress};
pub use http::{HttpPortFactory, HttpRemotePort};
pub use identity::{IdentityProvider, SessionIdentity};
pub use remote::{operation, NewCourse, PortFactory, RemotePort};

#[cfg(any(test, feature = "mock"))]
pub use remote::MockRemotePort;
