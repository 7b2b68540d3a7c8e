//! HTTP/JSON implementation of the remote access port.
//!
//! Talks to the backend gateway under `/api/v1`. The caller identity travels
//! in the `x-sphere-principal` header; anonymous ports omit it.

use crate::remote::{operation, NewCourse, PortFactory, RemotePort};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sphere_config::RemoteConfig;
use sphere_core::{
    Course, CourseId, Enrollment, EnrollmentId, Post, Principal, SphereError, SphereResult,
    UserProfile,
};
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Header carrying the caller principal.
pub const IDENTITY_HEADER: &str = "x-sphere-principal";

/// HTTP-based remote access port.
pub struct HttpRemotePort {
    client: Client,
    base_url: Url,
    identity: Option<Principal>,
}

impl HttpRemotePort {
    /// Creates a port with its own HTTP client.
    pub fn new(config: &RemoteConfig, identity: Option<Principal>) -> SphereResult<Self> {
        let client = build_client(config)?;
        Self::with_client(client, &config.base_url, identity)
    }

    /// Creates a port sharing an existing HTTP client.
    pub fn with_client(
        client: Client,
        base_url: &str,
        identity: Option<Principal>,
    ) -> SphereResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            SphereError::Configuration(format!("Invalid remote base URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SphereError::Configuration(format!(
                "Remote base URL '{}' cannot carry a path",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            identity,
        })
    }

    /// The principal this port acts as.
    #[must_use]
    pub fn identity(&self) -> Option<&Principal> {
        self.identity.as_ref()
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1"]).extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = self.client.request(method, self.url(segments));
        match &self.identity {
            Some(principal) => builder.header(IDENTITY_HEADER, principal.as_str()),
            None => builder,
        }
    }
}

fn build_client(config: &RemoteConfig) -> SphereResult<Client> {
    Client::builder()
        .timeout(config.request_timeout())
        .pool_idle_timeout(config.pool_idle_timeout())
        .build()
        .map_err(|e| SphereError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

#[derive(Debug, Serialize)]
struct HttpAddPostRequest<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HttpEnrollRequest<'a> {
    enrollment_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct HttpEnrolledResponse {
    enrolled: bool,
}

#[derive(Debug, Deserialize)]
struct HttpErrorBody {
    message: String,
}

async fn send(op: &'static str, builder: RequestBuilder) -> SphereResult<Response> {
    builder.send().await.map_err(|e| SphereError::transport(op, e))
}

#[async_trait]
impl RemotePort for HttpRemotePort {
    async fn add_post(&self, content: String) -> SphereResult<()> {
        debug!("HTTP {}: {} chars", operation::ADD_POST, content.chars().count());
        let request = self
            .request(Method::POST, &["posts"])
            .json(&HttpAddPostRequest { content: &content });
        handle_empty(operation::ADD_POST, send(operation::ADD_POST, request).await?).await
    }

    async fn get_all_posts(&self) -> SphereResult<Vec<Post>> {
        debug!("HTTP {}", operation::GET_ALL_POSTS);
        let request = self.request(Method::GET, &["posts"]);
        handle_response(operation::GET_ALL_POSTS, send(operation::GET_ALL_POSTS, request).await?)
            .await
    }

    async fn get_user_posts(&self, author: Principal) -> SphereResult<Vec<Post>> {
        debug!("HTTP {}: {}", operation::GET_USER_POSTS, author);
        let request = self.request(Method::GET, &["users", author.as_str(), "posts"]);
        handle_response(operation::GET_USER_POSTS, send(operation::GET_USER_POSTS, request).await?)
            .await
    }

    async fn get_caller_user_profile(&self) -> SphereResult<Option<UserProfile>> {
        debug!("HTTP {}", operation::GET_CALLER_USER_PROFILE);
        let request = self.request(Method::GET, &["me", "profile"]);
        let response = send(operation::GET_CALLER_USER_PROFILE, request).await?;
        handle_optional(operation::GET_CALLER_USER_PROFILE, response).await
    }

    async fn get_user_profile(&self, user: Principal) -> SphereResult<Option<UserProfile>> {
        debug!("HTTP {}: {}", operation::GET_USER_PROFILE, user);
        let request = self.request(Method::GET, &["users", user.as_str(), "profile"]);
        let response = send(operation::GET_USER_PROFILE, request).await?;
        handle_optional(operation::GET_USER_PROFILE, response).await
    }

    async fn save_caller_user_profile(&self, profile: UserProfile) -> SphereResult<()> {
        debug!("HTTP {}: {}", operation::SAVE_CALLER_USER_PROFILE, profile.name);
        let request = self.request(Method::PUT, &["me", "profile"]).json(&profile);
        let response = send(operation::SAVE_CALLER_USER_PROFILE, request).await?;
        handle_empty(operation::SAVE_CALLER_USER_PROFILE, response).await
    }

    async fn get_all_courses(&self) -> SphereResult<Vec<Course>> {
        debug!("HTTP {}", operation::GET_ALL_COURSES);
        let request = self.request(Method::GET, &["courses"]);
        let response = send(operation::GET_ALL_COURSES, request).await?;
        handle_response(operation::GET_ALL_COURSES, response).await
    }

    async fn get_course_by_id(&self, id: CourseId) -> SphereResult<Option<Course>> {
        debug!("HTTP {}: {}", operation::GET_COURSE_BY_ID, id);
        let request = self.request(Method::GET, &["courses", id.as_str()]);
        let response = send(operation::GET_COURSE_BY_ID, request).await?;
        handle_optional(operation::GET_COURSE_BY_ID, response).await
    }

    async fn get_courses_by_creator(&self, creator: Principal) -> SphereResult<Vec<Course>> {
        debug!("HTTP {}: {}", operation::GET_COURSES_BY_CREATOR, creator);
        let request = self.request(Method::GET, &["users", creator.as_str(), "courses"]);
        let response = send(operation::GET_COURSES_BY_CREATOR, request).await?;
        handle_response(operation::GET_COURSES_BY_CREATOR, response).await
    }

    async fn create_course(&self, course: NewCourse) -> SphereResult<Course> {
        debug!("HTTP {}: {}", operation::CREATE_COURSE, course.id);
        let request = self.request(Method::POST, &["courses"]).json(&course);
        let response = send(operation::CREATE_COURSE, request).await?;
        handle_response(operation::CREATE_COURSE, response).await
    }

    async fn enroll_in_course(
        &self,
        enrollment_id: EnrollmentId,
        course_id: CourseId,
    ) -> SphereResult<Enrollment> {
        debug!("HTTP {}: {}", operation::ENROLL_IN_COURSE, course_id);
        let request = self
            .request(Method::POST, &["courses", course_id.as_str(), "enrollments"])
            .json(&HttpEnrollRequest {
                enrollment_id: enrollment_id.as_str(),
            });
        let response = send(operation::ENROLL_IN_COURSE, request).await?;
        handle_response(operation::ENROLL_IN_COURSE, response).await
    }

    async fn get_user_enrollments(&self, user: Principal) -> SphereResult<Vec<Enrollment>> {
        debug!("HTTP {}: {}", operation::GET_USER_ENROLLMENTS, user);
        let request = self.request(Method::GET, &["users", user.as_str(), "enrollments"]);
        let response = send(operation::GET_USER_ENROLLMENTS, request).await?;
        handle_response(operation::GET_USER_ENROLLMENTS, response).await
    }

    async fn is_user_enrolled(&self, user: Principal, course_id: CourseId) -> SphereResult<bool> {
        debug!("HTTP {}: {} in {}", operation::IS_USER_ENROLLED, user, course_id);
        let request = self.request(
            Method::GET,
            &["users", user.as_str(), "enrollments", course_id.as_str()],
        );
        let response = send(operation::IS_USER_ENROLLED, request).await?;
        let body: HttpEnrolledResponse = handle_response(operation::IS_USER_ENROLLED, response).await?;
        Ok(body.enrolled)
    }
}

async fn handle_response<T: DeserializeOwned>(
    op: &'static str,
    response: Response,
) -> SphereResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(map_http_error(op, status, &body));
    }

    response
        .json()
        .await
        .map_err(|e| SphereError::transport(op, format!("JSON parse error: {}", e)))
}

async fn handle_optional<T: DeserializeOwned>(
    op: &'static str,
    response: Response,
) -> SphereResult<Option<T>> {
    if response.status() == StatusCode::NOT_FOUND {
        debug!("HTTP {}: not found", op);
        return Ok(None);
    }
    handle_response(op, response).await.map(Some)
}

async fn handle_empty(op: &'static str, response: Response) -> SphereResult<()> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(map_http_error(op, status, &body));
    }
    Ok(())
}

fn map_http_error(op: &'static str, status: StatusCode, body: &str) -> SphereError {
    let reason = match serde_json::from_str::<HttpErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .map_or_else(|| format!("HTTP {}", status.as_u16()), ToString::to_string),
    };
    SphereError::rejected(op, reason)
}

/// Builds HTTP ports that share one connection pool.
pub struct HttpPortFactory {
    client: Client,
    base_url: String,
}

impl HttpPortFactory {
    /// Creates a factory from the remote configuration.
    pub fn new(config: &RemoteConfig) -> SphereResult<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: config.base_url.clone(),
        })
    }
}

impl PortFactory for HttpPortFactory {
    fn connect(&self, identity: Option<&Principal>) -> SphereResult<Arc<dyn RemotePort>> {
        let port = HttpRemotePort::with_client(self.client.clone(), &self.base_url, identity.cloned())?;
        Ok(Arc::new(port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(base_url: &str) -> HttpRemotePort {
        HttpRemotePort::with_client(Client::new(), base_url, None).unwrap()
    }

    #[test]
    fn test_url_construction() {
        let client = port("http://localhost:8080");
        assert_eq!(client.url(&["posts"]).as_str(), "http://localhost:8080/api/v1/posts");

        let client_trailing = port("http://localhost:8080/");
        assert_eq!(
            client_trailing.url(&["courses", "c1"]).as_str(),
            "http://localhost:8080/api/v1/courses/c1"
        );

        let prefixed = port("https://gateway.example.com/sphere");
        assert_eq!(
            prefixed.url(&["me", "profile"]).as_str(),
            "https://gateway.example.com/sphere/api/v1/me/profile"
        );
    }

    #[test]
    fn test_path_segments_are_escaped() {
        let client = port("http://localhost:8080");
        assert_eq!(
            client.url(&["users", "a/b c", "posts"]).as_str(),
            "http://localhost:8080/api/v1/users/a%2Fb%20c/posts"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpRemotePort::with_client(Client::new(), "not a url", None);
        assert!(matches!(result, Err(SphereError::Configuration(_))));

        let result = HttpRemotePort::with_client(Client::new(), "mailto:ops@example.com", None);
        assert!(matches!(result, Err(SphereError::Configuration(_))));
    }

    #[test]
    fn test_map_http_error_prefers_message_field() {
        let err = map_http_error(
            operation::CREATE_COURSE,
            StatusCode::FORBIDDEN,
            r#"{"message":"Unauthorized: Only users can create courses"}"#,
        );
        assert_eq!(
            err,
            SphereError::rejected(
                operation::CREATE_COURSE,
                "Unauthorized: Only users can create courses"
            )
        );
    }

    #[test]
    fn test_map_http_error_falls_back_to_body_and_status() {
        let err = map_http_error(operation::ADD_POST, StatusCode::BAD_REQUEST, "too long\n");
        assert_eq!(err.display_message(), "too long");

        let err = map_http_error(operation::ADD_POST, StatusCode::SERVICE_UNAVAILABLE, "");
        assert_eq!(err.display_message(), "Service Unavailable");
    }

    #[test]
    fn test_factory_binds_identity() {
        let factory = HttpPortFactory::new(&RemoteConfig::default()).unwrap();
        assert!(factory.connect(Some(&Principal::new("alice"))).is_ok());
        assert!(factory.connect(None).is_ok());
    }
}
