//! Feed ordering.

use sphere_core::Post;

/// Orders posts newest first.
///
/// Posts with equal timestamps keep their backend order.
#[must_use]
pub fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    posts
}
