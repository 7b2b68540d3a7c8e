//! External blob handle.

use serde::{Deserialize, Serialize};

/// Handle to a blob held by the external blob store.
///
/// Only the retrievable direct URL travels through this layer; bytes and
/// transport belong to the blob collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalBlob {
    /// Direct URL at which the blob can be fetched.
    pub direct_url: String,
}

impl ExternalBlob {
    /// Wraps an already known URL.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            direct_url: url.into(),
        }
    }

    /// Returns the direct URL.
    #[must_use]
    pub fn direct_url(&self) -> &str {
        &self.direct_url
    }
}
