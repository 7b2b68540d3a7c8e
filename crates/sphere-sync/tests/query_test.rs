//! Query bindings read through the cache.

mod common;

use common::{client, drain, post, signed_in, Backend};
use sphere_cache::CacheStatus;
use sphere_core::{Principal, SphereError, SphereResult};
use sphere_port::{operation, MockRemotePort, PortFactory, RemotePort};
use sphere_sync::cache_keys;
use sphere_sync::feed::newest_first;
use sphere_sync::queries::{
    AllCoursesQuery, AllPostsQuery, CourseQuery, IsEnrolledQuery, UserPostsQuery,
    UserProfileQuery,
};
use sphere_sync::SyncClient;
use std::sync::Arc;

struct MockFactory(Arc<MockRemotePort>);

impl PortFactory for MockFactory {
    fn connect(&self, _identity: Option<&Principal>) -> SphereResult<Arc<dyn RemotePort>> {
        let port: Arc<dyn RemotePort> = self.0.clone();
        Ok(port)
    }
}

fn mocked(port: MockRemotePort) -> SyncClient {
    let client = SyncClient::new(Default::default(), Arc::new(MockFactory(Arc::new(port))));
    client.connect(Some(Principal::new("alice"))).unwrap();
    client
}

#[tokio::test]
async fn test_concurrent_watchers_share_one_fetch() {
    let backend = Backend::with_posts(vec![post("alice", "Long TSLA", 1)]);
    backend.gate_feed();
    let client = signed_in(&backend, "alice");

    let mut first = client.watch(AllPostsQuery);
    let mut second = client.watch(AllPostsQuery);
    assert!(first.state().is_loading());

    drain().await;
    assert_eq!(backend.calls(operation::GET_ALL_POSTS), 1);

    backend.open();
    let a = first.settled().await;
    let b = second.settled().await;

    assert_eq!(backend.calls(operation::GET_ALL_POSTS), 1);
    assert!(a.is_success());
    assert_eq!(a.data, b.data);
    assert_eq!(a.data[0].content, "Long TSLA");
}

#[tokio::test]
async fn test_fresh_result_is_served_from_cache() {
    let backend = Backend::with_posts(vec![post("alice", "hello", 1)]);
    let client = signed_in(&backend, "alice");

    let first = client.fetch(AllPostsQuery).await.unwrap();
    let second = client.fetch(AllPostsQuery).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(backend.calls(operation::GET_ALL_POSTS), 1);
    assert_eq!(client.cached(&AllPostsQuery), Some(first));
}

#[tokio::test]
async fn test_feed_keeps_backend_order_until_sorted() {
    let backend = Backend::with_posts(vec![
        post("alice", "old", 1),
        post("bob", "new", 3),
        post("alice", "middle", 2),
    ]);
    let client = signed_in(&backend, "alice");

    let posts = client.fetch(AllPostsQuery).await.unwrap();
    let contents: Vec<_> = posts.iter().map(|p| p.content.as_str()).collect();
    assert_eq!(contents, vec!["old", "new", "middle"]);

    let sorted = newest_first(posts);
    let contents: Vec<_> = sorted.iter().map(|p| p.content.as_str()).collect();
    assert_eq!(contents, vec!["new", "middle", "old"]);
}

#[tokio::test]
async fn test_bindings_are_disabled_without_port() {
    let backend = Backend::with_posts(vec![post("alice", "hello", 1)]);
    let client = client(&backend);

    let handle = client.watch(AllPostsQuery);
    let state = handle.state();
    assert!(!state.is_enabled);
    assert_eq!(state.status, CacheStatus::Idle);
    assert!(state.data.is_empty());

    let posts = client.fetch(AllPostsQuery).await.unwrap();
    assert!(posts.is_empty());

    drain().await;
    assert_eq!(backend.total_calls(), 0);
    assert!(client.cache().snapshot().is_empty());
}

#[tokio::test]
async fn test_missing_parameter_never_reaches_port() {
    let mut port = MockRemotePort::new();
    port.expect_get_user_posts().times(0);
    port.expect_get_course_by_id().times(0);
    port.expect_is_user_enrolled().times(0);
    port.expect_get_user_profile().times(0);
    let client = mocked(port);

    let mut handle = client.watch(UserPostsQuery::new(None));
    assert!(!handle.is_enabled());
    assert!(handle.key().is_none());
    assert!(handle.changed().await.is_none());

    assert_eq!(client.fetch(CourseQuery::new(None)).await.unwrap(), None);
    assert!(!client
        .fetch(IsEnrolledQuery::new(Some(Principal::new("alice")), None))
        .await
        .unwrap());
    assert_eq!(client.fetch(UserProfileQuery::new(None)).await.unwrap(), None);

    drain().await;
    assert!(client.cache().snapshot().is_empty());
}

#[tokio::test]
async fn test_failed_read_reports_error_and_placeholder() {
    let mut port = MockRemotePort::new();
    port.expect_get_all_courses()
        .times(1)
        .returning(|| Err(SphereError::rejected(operation::GET_ALL_COURSES, "Canister stopped")));
    let client = mocked(port);

    let mut handle = client.watch(AllCoursesQuery);
    let state = handle.settled().await;

    assert!(state.is_error());
    assert!(state.data.is_empty());
    assert_eq!(
        state.error.map(|e| e.display_message()),
        Some("Canister stopped".to_string())
    );
    assert_eq!(client.cached(&AllCoursesQuery), None);
}

#[tokio::test]
async fn test_refetch_reads_again() {
    let backend = Backend::with_posts(vec![post("bob", "first", 1)]);
    let client = signed_in(&backend, "alice");

    let mut handle = client.watch(UserPostsQuery::new(Some(Principal::new("bob"))));
    assert_eq!(handle.settled().await.data.len(), 1);
    assert_eq!(
        handle.key(),
        Some(&cache_keys::user_posts(&Principal::new("bob")))
    );

    handle.refetch();
    let state = handle.settled().await;

    assert!(state.is_success());
    assert_eq!(backend.calls(operation::GET_USER_POSTS), 2);
}
