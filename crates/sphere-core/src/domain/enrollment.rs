//! Enrollment payload.

use super::Time;
use crate::{CourseId, EnrollmentId, Principal};
use serde::{Deserialize, Serialize};

/// A user's enrollment in a course, as resolved by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: EnrollmentId,
    /// Enrolled user, resolved server-side from the caller.
    pub user: Principal,
    pub course_id: CourseId,
    pub completed: bool,
    pub enrolled_at: Time,
}
