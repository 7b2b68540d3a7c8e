//! Typed ID wrappers for remote entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use uuid::Uuid;

/// Textual identity of a signed-in user as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(pub String);

impl Principal {
    /// Creates a principal from its textual form.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Principal {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A strongly-typed wrapper for course IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub String);

impl CourseId {
    /// Creates a course ID from an existing key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Generates a client-side course ID: `course-<unix-millis>-<9 chars>`.
    #[must_use]
    pub fn generate(now: DateTime<Utc>) -> Self {
        let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
        Self(format!("course-{}-{}", now.timestamp_millis(), suffix))
    }

    /// Returns the course key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CourseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A strongly-typed wrapper for enrollment IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrollmentId(pub String);

impl EnrollmentId {
    /// Wraps an existing enrollment key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Builds the enrollment ID for `user` joining `course` at `now`:
    /// `<principal>-<courseId>-<unix-millis>`.
    #[must_use]
    pub fn for_enrollment(user: &Principal, course: &CourseId, now: DateTime<Utc>) -> Self {
        Self(format!("{}-{}-{}", user, course, now.timestamp_millis()))
    }

    /// Returns the enrollment key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EnrollmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generated_course_ids_differ() {
        let now = Utc::now();
        assert_ne!(CourseId::generate(now), CourseId::generate(now));
    }

    #[test]
    fn test_course_id_shape() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let id = CourseId::generate(now);
        let parts: Vec<&str> = id.as_str().split('-').collect();
        assert_eq!(parts[0], "course");
        assert_eq!(parts[1], "1700000000000");
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_enrollment_id() {
        let now = Utc.timestamp_millis_opt(42).unwrap();
        let id = EnrollmentId::for_enrollment(&Principal::new("aaaaa-aa"), &CourseId::new("c1"), now);
        assert_eq!(id.as_str(), "aaaaa-aa-c1-42");
    }

    #[test]
    fn test_principal_serializes_as_string() {
        let json = serde_json::to_string(&Principal::new("2vxsx-fae")).unwrap();
        assert_eq!(json, "\"2vxsx-fae\"");
    }
}
