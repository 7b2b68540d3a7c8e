//! Remote access port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sphere_core::{
    Course, CourseId, Enrollment, EnrollmentId, Post, Principal, SphereResult, UserProfile,
};
use std::sync::Arc;

/// Operation names used in errors and logs.
pub mod operation {
    pub const ADD_POST: &str = "addPost";
    pub const GET_ALL_POSTS: &str = "getAllPosts";
    pub const GET_USER_POSTS: &str = "getUserPosts";
    pub const GET_CALLER_USER_PROFILE: &str = "getCallerUserProfile";
    pub const GET_USER_PROFILE: &str = "getUserProfile";
    pub const SAVE_CALLER_USER_PROFILE: &str = "saveCallerUserProfile";
    pub const GET_ALL_COURSES: &str = "getAllCourses";
    pub const GET_COURSE_BY_ID: &str = "getCourseById";
    pub const GET_COURSES_BY_CREATOR: &str = "getCoursesByCreator";
    pub const CREATE_COURSE: &str = "createCourse";
    pub const ENROLL_IN_COURSE: &str = "enrollInCourse";
    pub const GET_USER_ENROLLMENTS: &str = "getUserEnrollments";
    pub const IS_USER_ENROLLED: &str = "isUserEnrolled";
}

/// Arguments of `create_course`.
///
/// The creator is not part of the request; the backend assigns the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    /// Price in e8s.
    pub price: u64,
    pub thumbnail_url: String,
}

/// The remote backend as seen by the sync layer.
///
/// Every method either resolves with the backend's answer or fails with
/// `SphereError::RemoteRejection` (or `Transport` when no answer arrived).
/// Absence of a single entity is `Ok(None)`, never an error.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait RemotePort: Send + Sync {
    async fn add_post(&self, content: String) -> SphereResult<()>;

    async fn get_all_posts(&self) -> SphereResult<Vec<Post>>;

    async fn get_user_posts(&self, author: Principal) -> SphereResult<Vec<Post>>;

    async fn get_caller_user_profile(&self) -> SphereResult<Option<UserProfile>>;

    async fn get_user_profile(&self, user: Principal) -> SphereResult<Option<UserProfile>>;

    async fn save_caller_user_profile(&self, profile: UserProfile) -> SphereResult<()>;

    async fn get_all_courses(&self) -> SphereResult<Vec<Course>>;

    async fn get_course_by_id(&self, id: CourseId) -> SphereResult<Option<Course>>;

    async fn get_courses_by_creator(&self, creator: Principal) -> SphereResult<Vec<Course>>;

    async fn create_course(&self, course: NewCourse) -> SphereResult<Course>;

    async fn enroll_in_course(
        &self,
        enrollment_id: EnrollmentId,
        course_id: CourseId,
    ) -> SphereResult<Enrollment>;

    async fn get_user_enrollments(&self, user: Principal) -> SphereResult<Vec<Enrollment>>;

    async fn is_user_enrolled(&self, user: Principal, course_id: CourseId) -> SphereResult<bool>;
}

/// Builds a port bound to one identity.
///
/// Called again whenever the identity changes; `None` connects anonymously.
pub trait PortFactory: Send + Sync {
    fn connect(&self, identity: Option<&Principal>) -> SphereResult<Arc<dyn RemotePort>>;
}
