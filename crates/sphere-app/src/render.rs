//! Plain-text rendering of remote payloads.

use sphere_core::{time_to_datetime, Course, Post};

/// One feed line: `2023-11-14 22:13 alice: content`.
#[must_use]
pub fn post_line(post: &Post) -> String {
    format!(
        "{} {}: {}",
        time_to_datetime(post.timestamp).format("%Y-%m-%d %H:%M"),
        post.author,
        post.content
    )
}

/// One catalog line: `Options 101 (1.5 ICP, 3 enrolled)`.
#[must_use]
pub fn course_line(course: &Course) -> String {
    format!(
        "{} ({}, {} enrolled)",
        course.title,
        course.price_label(),
        course.enrollment_count
    )
}
