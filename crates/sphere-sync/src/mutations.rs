//! Mutation bindings, one per remote write.
//!
//! Each binding names the remote call and the cache keys its success makes
//! stale. Keys derived from the result use what the backend returned, not
//! what the caller sent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sphere_cache::KeyPattern;
use sphere_core::{
    Course, CourseId, Enrollment, EnrollmentId, Principal, SphereError, SphereResult, UserProfile,
};
use sphere_port::{operation, NewCourse, RemotePort};
use tokio::sync::watch;

use crate::cache_keys;
use crate::client::SyncClient;

/// A remote write and the cache keys it makes stale.
#[async_trait]
pub trait Mutation: Send + Sync {
    type Output: Send + 'static;

    /// Operation name for logs.
    fn name(&self) -> &'static str;

    /// Performs the remote call.
    async fn execute(&self, port: &dyn RemotePort) -> SphereResult<Self::Output>;

    /// Keys to invalidate once `execute` succeeded.
    fn invalidates(&self, output: &Self::Output) -> Vec<KeyPattern>;
}

/// Publishes a post.
#[derive(Debug, Clone)]
pub struct AddPost {
    pub content: String,
}

impl AddPost {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[async_trait]
impl Mutation for AddPost {
    type Output = ();

    fn name(&self) -> &'static str {
        operation::ADD_POST
    }

    async fn execute(&self, port: &dyn RemotePort) -> SphereResult<()> {
        port.add_post(self.content.clone()).await
    }

    fn invalidates(&self, _output: &()) -> Vec<KeyPattern> {
        vec![
            KeyPattern::from(cache_keys::all_posts()),
            cache_keys::user_posts_pattern(),
        ]
    }
}

/// Saves the caller's profile.
#[derive(Debug, Clone)]
pub struct SaveCallerUserProfile {
    pub profile: UserProfile,
}

impl SaveCallerUserProfile {
    #[must_use]
    pub fn new(profile: UserProfile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl Mutation for SaveCallerUserProfile {
    type Output = ();

    fn name(&self) -> &'static str {
        operation::SAVE_CALLER_USER_PROFILE
    }

    async fn execute(&self, port: &dyn RemotePort) -> SphereResult<()> {
        port.save_caller_user_profile(self.profile.clone()).await
    }

    fn invalidates(&self, _output: &()) -> Vec<KeyPattern> {
        vec![KeyPattern::from(cache_keys::current_user_profile())]
    }
}

/// Publishes a course.
#[derive(Debug, Clone)]
pub struct CreateCourse {
    pub course: NewCourse,
}

impl CreateCourse {
    #[must_use]
    pub fn new(course: NewCourse) -> Self {
        Self { course }
    }
}

#[async_trait]
impl Mutation for CreateCourse {
    type Output = Course;

    fn name(&self) -> &'static str {
        operation::CREATE_COURSE
    }

    async fn execute(&self, port: &dyn RemotePort) -> SphereResult<Course> {
        port.create_course(self.course.clone()).await
    }

    fn invalidates(&self, course: &Course) -> Vec<KeyPattern> {
        vec![
            KeyPattern::from(cache_keys::all_courses()),
            KeyPattern::from(cache_keys::courses_by_creator(&course.creator)),
        ]
    }
}

/// Enrolls the caller in a course.
#[derive(Debug, Clone)]
pub struct EnrollInCourse {
    pub enrollment_id: EnrollmentId,
    pub course_id: CourseId,
}

impl EnrollInCourse {
    #[must_use]
    pub fn new(enrollment_id: EnrollmentId, course_id: CourseId) -> Self {
        Self {
            enrollment_id,
            course_id,
        }
    }

    /// Builds the enrollment of `user` with a time-derived enrollment ID.
    #[must_use]
    pub fn for_user(user: &Principal, course_id: CourseId, now: DateTime<Utc>) -> Self {
        Self::new(EnrollmentId::for_enrollment(user, &course_id, now), course_id)
    }
}

#[async_trait]
impl Mutation for EnrollInCourse {
    type Output = Enrollment;

    fn name(&self) -> &'static str {
        operation::ENROLL_IN_COURSE
    }

    async fn execute(&self, port: &dyn RemotePort) -> SphereResult<Enrollment> {
        port.enroll_in_course(self.enrollment_id.clone(), self.course_id.clone())
            .await
    }

    fn invalidates(&self, enrollment: &Enrollment) -> Vec<KeyPattern> {
        vec![
            KeyPattern::from(cache_keys::user_enrollments(&enrollment.user)),
            KeyPattern::from(cache_keys::course(&enrollment.course_id)),
            KeyPattern::from(cache_keys::is_enrolled(&enrollment.user, &enrollment.course_id)),
        ]
    }
}

/// Progress of the last mutation run through a handle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error(SphereError),
}

/// Runs mutations one at a time and publishes their status.
///
/// A second `run` while one is pending is refused, which is how triggers
/// such as an enroll button disable re-submission.
pub struct MutationHandle {
    client: SyncClient,
    status: watch::Sender<MutationStatus>,
}

impl MutationHandle {
    #[must_use]
    pub fn new(client: SyncClient) -> Self {
        let (status, _) = watch::channel(MutationStatus::Idle);
        Self { client, status }
    }

    #[must_use]
    pub fn status(&self) -> MutationStatus {
        self.status.borrow().clone()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        *self.status.borrow() == MutationStatus::Pending
    }

    /// Notifies every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<MutationStatus> {
        self.status.subscribe()
    }

    /// Runs `mutation` unless another one is pending.
    pub async fn run<M: Mutation>(&self, mutation: M) -> SphereResult<M::Output> {
        let started = self.status.send_if_modified(|status| {
            if *status == MutationStatus::Pending {
                return false;
            }
            *status = MutationStatus::Pending;
            true
        });
        if !started {
            return Err(SphereError::SubmissionPending);
        }

        let result = self.client.mutate(mutation).await;
        self.status.send_replace(match &result {
            Ok(_) => MutationStatus::Success,
            Err(err) => MutationStatus::Error(err.clone()),
        });
        result
    }

    /// Returns to `Idle`.
    pub fn reset(&self) {
        self.status.send_replace(MutationStatus::Idle);
    }
}
