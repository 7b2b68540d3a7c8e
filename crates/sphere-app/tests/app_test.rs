//! End-to-end wiring against a mocked gateway.

use serde_json::json;
use sphere_app::AppBuilder;
use sphere_config::AppConfig;
use sphere_core::Principal;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, identity: Option<&str>) -> AppConfig {
    let mut config = AppConfig::default();
    config.remote.base_url = server.uri();
    config.remote.identity = identity.map(str::to_string);
    config
}

#[tokio::test]
async fn test_feed_is_newest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"content": "first", "author": "alice", "timestamp": 1_000_000},
            {"content": "third", "author": "bob", "timestamp": 3_000_000},
            {"content": "second", "author": "alice", "timestamp": 2_000_000}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let app = AppBuilder::new()
        .with_config(config(&server, None))
        .build()
        .unwrap();
    let feed = app.feed().await.unwrap();
    let again = app.feed().await.unwrap();

    let contents: Vec<_> = feed.iter().map(|p| p.content.as_str()).collect();
    assert_eq!(contents, vec!["third", "second", "first"]);
    assert_eq!(feed, again);
    app.shutdown();
}

#[tokio::test]
async fn test_sign_in_then_publish() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/posts"))
        .and(header("x-sphere-principal", "alice"))
        .and(body_json(json!({"content": "Holding"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let app = AppBuilder::new()
        .with_config(config(&server, Some("alice")))
        .build()
        .unwrap();

    let principal = app.sign_in().await.unwrap();
    assert_eq!(principal, Some(Principal::new("alice")));
    assert_eq!(app.client().identity(), Some(Principal::new("alice")));

    app.publish("  Holding ").await.unwrap();
    app.shutdown();
}

#[tokio::test]
async fn test_rejected_publish_surfaces_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/posts"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"message": "Unauthorized"})),
        )
        .mount(&server)
        .await;

    let app = AppBuilder::new()
        .with_config(config(&server, None))
        .build()
        .unwrap();

    let err = app.publish("hello").await.unwrap_err();
    assert_eq!(err.display_message(), "Unauthorized");
    app.shutdown();
}
