//! Query bindings, one per remote read.
//!
//! A binding names its cache key, how to fetch it through the port and when
//! it may run at all. Required parameters are `Option`s; a binding with a
//! missing parameter has no key and stays disabled.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sphere_cache::CacheKey;
use sphere_core::{Course, CourseId, Enrollment, Post, Principal, SphereResult, UserProfile};
use sphere_port::RemotePort;

use crate::cache_keys;

/// A cached remote read.
#[async_trait]
pub trait Query: Send + Sync + 'static {
    /// Decoded result type.
    type Output: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;

    /// Cache key, or `None` while a required parameter is missing.
    fn key(&self) -> Option<CacheKey>;

    /// Value reported while disabled or before the first successful fetch.
    fn placeholder(&self) -> Self::Output;

    /// Reads the value through the port.
    async fn fetch(&self, port: &dyn RemotePort) -> SphereResult<Self::Output>;

    /// Whether the binding may fetch, given port readiness.
    fn is_enabled(&self, port_ready: bool) -> bool {
        port_ready && self.key().is_some()
    }
}

/// The signed-in caller's profile; `None` when none was saved yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallerProfileQuery;

#[async_trait]
impl Query for CallerProfileQuery {
    type Output = Option<UserProfile>;

    fn key(&self) -> Option<CacheKey> {
        Some(cache_keys::current_user_profile())
    }

    fn placeholder(&self) -> Self::Output {
        None
    }

    async fn fetch(&self, port: &dyn RemotePort) -> SphereResult<Self::Output> {
        port.get_caller_user_profile().await
    }
}

/// Another user's profile.
#[derive(Debug, Clone, Default)]
pub struct UserProfileQuery {
    pub user: Option<Principal>,
}

impl UserProfileQuery {
    #[must_use]
    pub fn new(user: Option<Principal>) -> Self {
        Self { user }
    }
}

#[async_trait]
impl Query for UserProfileQuery {
    type Output = Option<UserProfile>;

    fn key(&self) -> Option<CacheKey> {
        self.user.as_ref().map(cache_keys::user_profile)
    }

    fn placeholder(&self) -> Self::Output {
        None
    }

    async fn fetch(&self, port: &dyn RemotePort) -> SphereResult<Self::Output> {
        match &self.user {
            Some(user) => port.get_user_profile(user.clone()).await,
            None => Ok(self.placeholder()),
        }
    }
}

/// The global feed, in backend order.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllPostsQuery;

#[async_trait]
impl Query for AllPostsQuery {
    type Output = Vec<Post>;

    fn key(&self) -> Option<CacheKey> {
        Some(cache_keys::all_posts())
    }

    fn placeholder(&self) -> Self::Output {
        Vec::new()
    }

    async fn fetch(&self, port: &dyn RemotePort) -> SphereResult<Self::Output> {
        port.get_all_posts().await
    }
}

/// Posts of one author.
#[derive(Debug, Clone, Default)]
pub struct UserPostsQuery {
    pub author: Option<Principal>,
}

impl UserPostsQuery {
    #[must_use]
    pub fn new(author: Option<Principal>) -> Self {
        Self { author }
    }
}

#[async_trait]
impl Query for UserPostsQuery {
    type Output = Vec<Post>;

    fn key(&self) -> Option<CacheKey> {
        self.author.as_ref().map(cache_keys::user_posts)
    }

    fn placeholder(&self) -> Self::Output {
        Vec::new()
    }

    async fn fetch(&self, port: &dyn RemotePort) -> SphereResult<Self::Output> {
        match &self.author {
            Some(author) => port.get_user_posts(author.clone()).await,
            None => Ok(self.placeholder()),
        }
    }
}

/// Every course on the marketplace.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllCoursesQuery;

#[async_trait]
impl Query for AllCoursesQuery {
    type Output = Vec<Course>;

    fn key(&self) -> Option<CacheKey> {
        Some(cache_keys::all_courses())
    }

    fn placeholder(&self) -> Self::Output {
        Vec::new()
    }

    async fn fetch(&self, port: &dyn RemotePort) -> SphereResult<Self::Output> {
        port.get_all_courses().await
    }
}

/// A single course.
#[derive(Debug, Clone, Default)]
pub struct CourseQuery {
    pub id: Option<CourseId>,
}

impl CourseQuery {
    #[must_use]
    pub fn new(id: Option<CourseId>) -> Self {
        Self { id }
    }
}

#[async_trait]
impl Query for CourseQuery {
    type Output = Option<Course>;

    fn key(&self) -> Option<CacheKey> {
        self.id.as_ref().map(cache_keys::course)
    }

    fn placeholder(&self) -> Self::Output {
        None
    }

    async fn fetch(&self, port: &dyn RemotePort) -> SphereResult<Self::Output> {
        match &self.id {
            Some(id) => port.get_course_by_id(id.clone()).await,
            None => Ok(self.placeholder()),
        }
    }
}

/// Courses published by one creator.
#[derive(Debug, Clone, Default)]
pub struct CreatorCoursesQuery {
    pub creator: Option<Principal>,
}

impl CreatorCoursesQuery {
    #[must_use]
    pub fn new(creator: Option<Principal>) -> Self {
        Self { creator }
    }
}

#[async_trait]
impl Query for CreatorCoursesQuery {
    type Output = Vec<Course>;

    fn key(&self) -> Option<CacheKey> {
        self.creator.as_ref().map(cache_keys::courses_by_creator)
    }

    fn placeholder(&self) -> Self::Output {
        Vec::new()
    }

    async fn fetch(&self, port: &dyn RemotePort) -> SphereResult<Self::Output> {
        match &self.creator {
            Some(creator) => port.get_courses_by_creator(creator.clone()).await,
            None => Ok(self.placeholder()),
        }
    }
}

/// Enrollments of one user.
#[derive(Debug, Clone, Default)]
pub struct UserEnrollmentsQuery {
    pub user: Option<Principal>,
}

impl UserEnrollmentsQuery {
    #[must_use]
    pub fn new(user: Option<Principal>) -> Self {
        Self { user }
    }
}

#[async_trait]
impl Query for UserEnrollmentsQuery {
    type Output = Vec<Enrollment>;

    fn key(&self) -> Option<CacheKey> {
        self.user.as_ref().map(cache_keys::user_enrollments)
    }

    fn placeholder(&self) -> Self::Output {
        Vec::new()
    }

    async fn fetch(&self, port: &dyn RemotePort) -> SphereResult<Self::Output> {
        match &self.user {
            Some(user) => port.get_user_enrollments(user.clone()).await,
            None => Ok(self.placeholder()),
        }
    }
}

/// Whether a user is enrolled in a course.
#[derive(Debug, Clone, Default)]
pub struct IsEnrolledQuery {
    pub user: Option<Principal>,
    pub course_id: Option<CourseId>,
}

impl IsEnrolledQuery {
    #[must_use]
    pub fn new(user: Option<Principal>, course_id: Option<CourseId>) -> Self {
        Self { user, course_id }
    }
}

#[async_trait]
impl Query for IsEnrolledQuery {
    type Output = bool;

    fn key(&self) -> Option<CacheKey> {
        match (&self.user, &self.course_id) {
            (Some(user), Some(course_id)) => Some(cache_keys::is_enrolled(user, course_id)),
            _ => None,
        }
    }

    fn placeholder(&self) -> Self::Output {
        false
    }

    async fn fetch(&self, port: &dyn RemotePort) -> SphereResult<Self::Output> {
        match (&self.user, &self.course_id) {
            (Some(user), Some(course_id)) => {
                port.is_user_enrolled(user.clone(), course_id.clone()).await
            }
            _ => Ok(self.placeholder()),
        }
    }
}
