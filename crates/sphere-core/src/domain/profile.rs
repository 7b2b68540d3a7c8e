//! User profile payload.

use super::ExternalBlob;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a profile name.
pub const PROFILE_NAME_MAX_LENGTH: usize = 50;

/// Maximum length of a profile bio.
pub const PROFILE_BIO_MAX_LENGTH: usize = 500;

/// Trading experience of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    /// Returns all levels in display order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Beginner, Self::Intermediate, Self::Advanced]
    }

    /// Returns the capitalised badge label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Beginner => write!(f, "beginner"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Advanced => write!(f, "advanced"),
        }
    }
}

/// A user's public profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub bio: String,
    pub experience: ExperienceLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<ExternalBlob>,
}

impl UserProfile {
    /// Returns the uppercase initial used as avatar fallback.
    #[must_use]
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next().map(|c| c.to_ascii_uppercase())
    }
}
