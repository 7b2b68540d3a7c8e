//! In-memory backend and collaborators for sync tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use sphere_cache::{EntityCache, RetryPolicy};
use sphere_core::{
    Course, CourseId, Enrollment, EnrollmentId, ExternalBlob, Post, Principal, SphereError,
    SphereResult, UserProfile,
};
use sphere_port::{
    operation, BlobStore, NewCourse, PortFactory, ProgressReporter, RemotePort,
};
use sphere_sync::SyncClient;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Default)]
struct BackendState {
    posts: Vec<Post>,
    profiles: HashMap<Principal, UserProfile>,
    courses: Vec<Course>,
    enrollments: Vec<Enrollment>,
    calls: HashMap<&'static str, usize>,
    rejecting: Option<String>,
    connects: Vec<Option<Principal>>,
    clock: i64,
}

#[derive(Default)]
struct BackendInner {
    state: Mutex<BackendState>,
    gated: AtomicBool,
    gate: Notify,
}

/// Shared in-memory backend; also the port factory handing out callers.
#[derive(Clone, Default)]
pub struct Backend {
    inner: Arc<BackendInner>,
}

impl Backend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(posts: Vec<Post>) -> Self {
        let backend = Self::new();
        backend.inner.state.lock().posts = posts;
        backend
    }

    pub fn insert_profile(&self, user: &Principal, profile: UserProfile) {
        self.inner.state.lock().profiles.insert(user.clone(), profile);
    }

    pub fn insert_course(&self, course: Course) {
        self.inner.state.lock().courses.push(course);
    }

    /// Number of calls made to `operation`.
    pub fn calls(&self, operation: &str) -> usize {
        self.inner
            .state
            .lock()
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.inner.state.lock().calls.values().sum()
    }

    /// Identities the factory was asked to connect, in order.
    pub fn connects(&self) -> Vec<Option<Principal>> {
        self.inner.state.lock().connects.clone()
    }

    /// Makes every write fail with `reason`.
    pub fn reject_writes(&self, reason: &str) {
        self.inner.state.lock().rejecting = Some(reason.to_string());
    }

    /// Holds `getAllPosts` calls until `open` is invoked.
    pub fn gate_feed(&self) {
        self.inner.gated.store(true, Ordering::SeqCst);
    }

    pub fn open(&self) {
        self.inner.gated.store(false, Ordering::SeqCst);
        self.inner.gate.notify_waiters();
    }

    pub fn port_for(&self, caller: Option<Principal>) -> Arc<dyn RemotePort> {
        Arc::new(FakePort {
            backend: self.clone(),
            caller,
        })
    }

    fn record(&self, operation: &'static str) -> i64 {
        let mut state = self.inner.state.lock();
        *state.calls.entry(operation).or_default() += 1;
        state.clock += 1_000_000;
        state.clock
    }
}

impl PortFactory for Backend {
    fn connect(&self, identity: Option<&Principal>) -> SphereResult<Arc<dyn RemotePort>> {
        self.inner.state.lock().connects.push(identity.cloned());
        Ok(self.port_for(identity.cloned()))
    }
}

/// A port acting as one caller against the shared backend.
pub struct FakePort {
    backend: Backend,
    caller: Option<Principal>,
}

impl FakePort {
    fn writer(&self, operation: &'static str) -> SphereResult<Principal> {
        if let Some(reason) = &self.backend.inner.state.lock().rejecting {
            return Err(SphereError::rejected(operation, reason.clone()));
        }
        self.caller
            .clone()
            .ok_or_else(|| SphereError::rejected(operation, "Unauthorized"))
    }
}

#[async_trait]
impl RemotePort for FakePort {
    async fn add_post(&self, content: String) -> SphereResult<()> {
        let now = self.backend.record(operation::ADD_POST);
        let author = self.writer(operation::ADD_POST)?;
        self.backend.inner.state.lock().posts.push(Post {
            content,
            author,
            timestamp: now,
        });
        Ok(())
    }

    async fn get_all_posts(&self) -> SphereResult<Vec<Post>> {
        self.backend.record(operation::GET_ALL_POSTS);
        if self.backend.inner.gated.load(Ordering::SeqCst) {
            self.backend.inner.gate.notified().await;
        }
        Ok(self.backend.inner.state.lock().posts.clone())
    }

    async fn get_user_posts(&self, author: Principal) -> SphereResult<Vec<Post>> {
        self.backend.record(operation::GET_USER_POSTS);
        let state = self.backend.inner.state.lock();
        Ok(state
            .posts
            .iter()
            .filter(|post| post.author == author)
            .cloned()
            .collect())
    }

    async fn get_caller_user_profile(&self) -> SphereResult<Option<UserProfile>> {
        self.backend.record(operation::GET_CALLER_USER_PROFILE);
        let state = self.backend.inner.state.lock();
        Ok(self
            .caller
            .as_ref()
            .and_then(|caller| state.profiles.get(caller).cloned()))
    }

    async fn get_user_profile(&self, user: Principal) -> SphereResult<Option<UserProfile>> {
        self.backend.record(operation::GET_USER_PROFILE);
        Ok(self.backend.inner.state.lock().profiles.get(&user).cloned())
    }

    async fn save_caller_user_profile(&self, profile: UserProfile) -> SphereResult<()> {
        self.backend.record(operation::SAVE_CALLER_USER_PROFILE);
        let caller = self.writer(operation::SAVE_CALLER_USER_PROFILE)?;
        self.backend
            .inner
            .state
            .lock()
            .profiles
            .insert(caller, profile);
        Ok(())
    }

    async fn get_all_courses(&self) -> SphereResult<Vec<Course>> {
        self.backend.record(operation::GET_ALL_COURSES);
        Ok(self.backend.inner.state.lock().courses.clone())
    }

    async fn get_course_by_id(&self, id: CourseId) -> SphereResult<Option<Course>> {
        self.backend.record(operation::GET_COURSE_BY_ID);
        let state = self.backend.inner.state.lock();
        Ok(state.courses.iter().find(|course| course.id == id).cloned())
    }

    async fn get_courses_by_creator(&self, creator: Principal) -> SphereResult<Vec<Course>> {
        self.backend.record(operation::GET_COURSES_BY_CREATOR);
        let state = self.backend.inner.state.lock();
        Ok(state
            .courses
            .iter()
            .filter(|course| course.creator == creator)
            .cloned()
            .collect())
    }

    async fn create_course(&self, course: NewCourse) -> SphereResult<Course> {
        let now = self.backend.record(operation::CREATE_COURSE);
        let creator = self.writer(operation::CREATE_COURSE)?;
        let created = Course {
            id: course.id,
            title: course.title,
            description: course.description,
            creator,
            thumbnail_url: course.thumbnail_url,
            price: course.price,
            enrollment_count: 0,
            created_at: now,
        };
        self.backend.inner.state.lock().courses.push(created.clone());
        Ok(created)
    }

    async fn enroll_in_course(
        &self,
        enrollment_id: EnrollmentId,
        course_id: CourseId,
    ) -> SphereResult<Enrollment> {
        let now = self.backend.record(operation::ENROLL_IN_COURSE);
        let user = self.writer(operation::ENROLL_IN_COURSE)?;
        let mut state = self.backend.inner.state.lock();
        if state
            .enrollments
            .iter()
            .any(|e| e.user == user && e.course_id == course_id)
        {
            return Err(SphereError::rejected(
                operation::ENROLL_IN_COURSE,
                "Already enrolled in this course",
            ));
        }
        let Some(course) = state.courses.iter_mut().find(|c| c.id == course_id) else {
            return Err(SphereError::rejected(
                operation::ENROLL_IN_COURSE,
                "Course not found",
            ));
        };
        course.enrollment_count += 1;

        let enrollment = Enrollment {
            id: enrollment_id,
            user,
            course_id,
            completed: false,
            enrolled_at: now,
        };
        state.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn get_user_enrollments(&self, user: Principal) -> SphereResult<Vec<Enrollment>> {
        self.backend.record(operation::GET_USER_ENROLLMENTS);
        let state = self.backend.inner.state.lock();
        Ok(state
            .enrollments
            .iter()
            .filter(|e| e.user == user)
            .cloned()
            .collect())
    }

    async fn is_user_enrolled(&self, user: Principal, course_id: CourseId) -> SphereResult<bool> {
        self.backend.record(operation::IS_USER_ENROLLED);
        let state = self.backend.inner.state.lock();
        Ok(state
            .enrollments
            .iter()
            .any(|e| e.user == user && e.course_id == course_id))
    }
}

/// Blob store that walks through fixed progress steps.
#[derive(Clone, Default)]
pub struct SteppedBlobStore {
    steps: Vec<u8>,
    fail: bool,
    uploads: Arc<AtomicUsize>,
}

impl SteppedBlobStore {
    pub fn new(steps: Vec<u8>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            steps: vec![10],
            fail: true,
            ..Self::default()
        }
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for SteppedBlobStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        mut progress: ProgressReporter,
    ) -> SphereResult<ExternalBlob> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        for step in &self.steps {
            progress.report(*step);
            tokio::task::yield_now().await;
        }
        if self.fail {
            return Err(SphereError::Upload("Blob store unavailable".to_string()));
        }
        Ok(ExternalBlob::from_url(format!(
            "https://blobs.test/{}/{}",
            n,
            bytes.len()
        )))
    }
}

/// Client over `backend` with a fresh cache and no port yet.
pub fn client(backend: &Backend) -> SyncClient {
    SyncClient::new(
        EntityCache::new(RetryPolicy::no_retry()),
        Arc::new(backend.clone()),
    )
}

/// Client connected as `caller`.
pub fn signed_in(backend: &Backend, caller: &str) -> SyncClient {
    let client = client(backend);
    client
        .connect(Some(Principal::new(caller)))
        .expect("fake factory never fails");
    client
}

pub fn post(author: &str, content: &str, timestamp: i64) -> Post {
    Post {
        content: content.to_string(),
        author: Principal::new(author),
        timestamp,
    }
}

pub fn course(id: &str, creator: &str) -> Course {
    Course {
        id: CourseId::new(id),
        title: format!("Course {}", id),
        description: "Charts and candles".to_string(),
        creator: Principal::new(creator),
        thumbnail_url: format!("https://blobs.test/{}", id),
        price: 100_000_000,
        enrollment_count: 0,
        created_at: 1,
    }
}

/// Lets spawned fetch tasks run to completion.
pub async fn drain() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
