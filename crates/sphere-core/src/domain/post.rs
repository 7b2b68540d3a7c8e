//! Post payload.

use super::Time;
use crate::Principal;
use serde::{Deserialize, Serialize};

/// A feed post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Post body.
    pub content: String,
    /// Author principal.
    pub author: Principal,
    /// Creation time in nanoseconds.
    pub timestamp: Time,
}

/// Maximum length of a post body in characters.
pub const POST_MAX_LENGTH: usize = 1000;
