use std::sync::{Arc, OnceLock};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::api;
use crate::core::{
    config::Settings, ids::SequentialIds, security, state::AppState, time::primitive_now_utc,
};
use crate::db::models::{Course, Enrollment, User};
use crate::db::types::UserRole;
use crate::store::{MemoryStore, Store};

const TEST_SECRET_KEY: &str = "test-secret";

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) app: Router,
    pub(crate) store: Arc<MemoryStore>,
    _guard: OwnedMutexGuard<()>,
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    std::env::set_var("COURSEFLOW_ENV", "test");
    std::env::set_var("COURSEFLOW_STRICT_CONFIG", "0");
    std::env::set_var("SECRET_KEY", TEST_SECRET_KEY);
    std::env::set_var("PROMETHEUS_ENABLED", "0");
    std::env::remove_var("COURSEFLOW_STORE");
    std::env::remove_var("NOTIFICATION_PAGE_LIMIT");
    std::env::remove_var("NOTIFICATION_MAX_PAGE_LIMIT");
    std::env::remove_var("MAX_FEEDBACK_CHARS");
    std::env::remove_var("FIRST_ADMIN_ID");
    std::env::remove_var("API_V1_STR");
}

pub(crate) async fn setup_test_context() -> TestContext {
    let guard = env_lock().await;
    set_test_env();
    context_with_guard(guard)
}

/// Builds the app over a fresh `MemoryStore` from the current environment.
pub(crate) fn context_with_guard(guard: OwnedMutexGuard<()>) -> TestContext {
    let settings = Settings::load().expect("settings");
    let store = Arc::new(MemoryStore::default());
    let state = AppState::new(settings, store.clone(), Arc::new(SequentialIds::new("id")));
    let app = api::router::router(state.clone());

    TestContext { state, app, store, _guard: guard }
}

pub(crate) async fn insert_user(store: &MemoryStore, id: &str, name: &str, role: UserRole) -> User {
    store
        .insert_user(User {
            id: id.to_string(),
            display_name: name.to_string(),
            role,
            is_active: true,
            created_at: primitive_now_utc(),
        })
        .await
        .expect("insert user")
}

pub(crate) async fn insert_course(store: &MemoryStore, id: &str, instructor_id: &str) -> Course {
    store
        .insert_course(Course {
            id: id.to_string(),
            title: format!("Course {id}"),
            instructor_id: instructor_id.to_string(),
            created_at: primitive_now_utc(),
        })
        .await
        .expect("insert course")
}

pub(crate) async fn enroll(store: &MemoryStore, id: &str, course_id: &str, student_id: &str) {
    store
        .insert_enrollment(Enrollment {
            id: id.to_string(),
            course_id: course_id.to_string(),
            student_id: student_id.to_string(),
            enrolled_at: primitive_now_utc(),
        })
        .await
        .expect("enroll");
}

/// Instructor `t1`, students `u1` and `u2`, course `c1` owned by `t1`.
pub(crate) async fn seed_course(ctx: &TestContext) {
    insert_user(&ctx.store, "t1", "Teacher One", UserRole::Instructor).await;
    insert_user(&ctx.store, "u1", "Student One", UserRole::Student).await;
    insert_user(&ctx.store, "u2", "Student Two", UserRole::Student).await;
    insert_course(&ctx.store, "c1", "t1").await;
}

pub(crate) fn bearer_token(user_id: &str, settings: &Settings) -> String {
    security::create_access_token(user_id, settings, None).expect("token")
}

pub(crate) fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    if let Some(body) = body {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("request body")
    }
}

pub(crate) fn multipart_request(
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
) -> Request<Body> {
    let boundary = "courseflow-test-boundary";
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"));
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).expect("request body")
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}
