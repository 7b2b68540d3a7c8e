//! Cache key generators for consistent key naming.

use sphere_cache::{CacheKey, KeyPattern};
use sphere_core::{CourseId, Principal};

/// Key of the signed-in caller's profile.
#[must_use]
pub fn current_user_profile() -> CacheKey {
    CacheKey::new("currentUserProfile")
}

/// Key of another user's profile.
#[must_use]
pub fn user_profile(user: &Principal) -> CacheKey {
    CacheKey::new("userProfile").with(user)
}

/// Key of the global feed.
#[must_use]
pub fn all_posts() -> CacheKey {
    CacheKey::new("allPosts")
}

/// Key of one author's posts.
#[must_use]
pub fn user_posts(author: &Principal) -> CacheKey {
    CacheKey::new("userPosts").with(author)
}

/// Key of the course marketplace.
#[must_use]
pub fn all_courses() -> CacheKey {
    CacheKey::new("allCourses")
}

/// Key of a single course.
#[must_use]
pub fn course(id: &CourseId) -> CacheKey {
    CacheKey::new("course").with(id)
}

/// Key of the courses a creator published.
#[must_use]
pub fn courses_by_creator(creator: &Principal) -> CacheKey {
    CacheKey::new("coursesByCreator").with(creator)
}

/// Key of a user's enrollments.
#[must_use]
pub fn user_enrollments(user: &Principal) -> CacheKey {
    CacheKey::new("userEnrollments").with(user)
}

/// Key of the enrollment check for one user and course.
#[must_use]
pub fn is_enrolled(user: &Principal, course_id: &CourseId) -> CacheKey {
    CacheKey::new("isEnrolled").with(user).with(course_id)
}

/// Pattern selecting the posts of every author.
#[must_use]
pub fn user_posts_pattern() -> KeyPattern {
    KeyPattern::operation("userPosts")
}
