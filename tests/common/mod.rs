//! Shared fixture for the HTTP tests
//!
//! Every test builds its own seeded in-memory store, so tests never see each
//! other's writes.
//!
//! | user | course 1 | course 2 |
//! |---|---|---|
//! | 1 (root) | admin | admin |
//! | 2 | tutor, leads group 1 | student |
//! | 3 | tutor, leads group 2 | - |
//! | 112 | student, group 1 | - |
//! | 113 | student, group 2 | - |
//! | 114 | student, no group | - |
//! | 200 (email not confirmed) | - | - |
//! | 300 | - | - |

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt; // for oneshot

use lecturehall_api::api::build_router;
use lecturehall_api::auth::jwt::create_token;
use lecturehall_api::config::AppConfig;
use lecturehall_api::domain::course::{Course, CourseRole};
use lecturehall_api::domain::group::Group;
use lecturehall_api::domain::material::{Material, MaterialKind};
use lecturehall_api::domain::repositories::{EnrollmentRepository, GroupRepository};
use lecturehall_api::domain::user::{Email, User};
use lecturehall_api::infrastructure::mail::VoidMailer;
use lecturehall_api::infrastructure::repositories::InMemoryStore;
use lecturehall_api::state::{AppState, Stores};

pub const TEST_SECRET: &str = "test-secret-key-for-integration-tests";
pub const PASSWORD: &str = "test";
pub const PENDING_TOKEN: &str = "pending-token";

pub const ROOT: i64 = 1;
pub const TUTOR: i64 = 2;
pub const OTHER_TUTOR: i64 = 3;
pub const STUDENT: i64 = 112;
pub const OTHER_STUDENT: i64 = 113;
pub const LONELY_STUDENT: i64 = 114;
pub const UNCONFIRMED: i64 = 200;
pub const OUTSIDER: i64 = 300;

pub const PUBLISHED_MATERIAL: i64 = 1;
pub const UNPUBLISHED_MATERIAL: i64 = 2;

fn user(id: i64, email: &str, encrypted_password: &str, root: bool) -> User {
    User {
        id,
        first_name: format!("First{}", id),
        last_name: format!("Last{}", id),
        email: Email::new(email).unwrap(),
        student_number: format!("{:07}", id),
        semester: 3,
        subject: "informatics".to_string(),
        language: "en".to_string(),
        root,
        encrypted_password: encrypted_password.to_string(),
        confirm_email_token: None,
    }
}

fn course(id: i64, name: &str) -> Course {
    let begins_at = Utc::now() - Duration::days(30);
    Course {
        id,
        name: name.to_string(),
        description: format!("{} lecture", name),
        begins_at,
        ends_at: begins_at + Duration::days(120),
        required_percentage: 50,
    }
}

fn material(id: i64, course_id: i64, publish_in: Duration) -> Material {
    let publish_at = Utc::now() + publish_in;
    Material {
        id,
        course_id,
        name: format!("Material {}", id),
        filename: format!("material{}.zip", id),
        kind: MaterialKind::Slide,
        publish_at,
        lecture_at: publish_at,
    }
}

/// A fresh store holding the fixture described in the module docs
pub async fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    // Low cost keeps the fixture fast, verification reads the cost from the hash
    let hash = bcrypt::hash(PASSWORD, 4).unwrap();

    store
        .put_user(user(ROOT, "test@uni-tuebingen.de", &hash, true))
        .unwrap();
    for (id, email) in [
        (TUTOR, "tutor2@uni-tuebingen.de"),
        (OTHER_TUTOR, "tutor3@uni-tuebingen.de"),
        (STUDENT, "student112@uni-tuebingen.de"),
        (OTHER_STUDENT, "student113@uni-tuebingen.de"),
        (LONELY_STUDENT, "student114@uni-tuebingen.de"),
        (OUTSIDER, "outsider@uni-tuebingen.de"),
    ] {
        store.put_user(user(id, email, &hash, false)).unwrap();
    }
    let mut pending = user(UNCONFIRMED, "pending@uni-tuebingen.de", &hash, false);
    pending.confirm_email_token = Some(PENDING_TOKEN.to_string());
    store.put_user(pending).unwrap();

    store.put_course(course(1, "Info2")).unwrap();
    store.put_course(course(2, "Info1")).unwrap();

    let enrollments: &dyn EnrollmentRepository = &*store;
    for (user_id, course_id, role) in [
        (ROOT, 1, CourseRole::Admin),
        (TUTOR, 1, CourseRole::Tutor),
        (OTHER_TUTOR, 1, CourseRole::Tutor),
        (STUDENT, 1, CourseRole::Student),
        (OTHER_STUDENT, 1, CourseRole::Student),
        (LONELY_STUDENT, 1, CourseRole::Student),
        (ROOT, 2, CourseRole::Admin),
        (TUTOR, 2, CourseRole::Student),
    ] {
        enrollments.enroll(user_id, course_id, role).await.unwrap();
    }

    for (id, tutor_id, course_id) in [(1, TUTOR, 1), (2, OTHER_TUTOR, 1), (3, ROOT, 2)] {
        store
            .put_group(Group {
                id,
                tutor_id,
                course_id,
                description: format!("Group {}", id),
            })
            .unwrap();
    }
    let groups: &dyn GroupRepository = &*store;
    groups.assign_member(1, STUDENT).await.unwrap();
    groups.assign_member(2, OTHER_STUDENT).await.unwrap();

    store
        .put_material(material(PUBLISHED_MATERIAL, 1, -Duration::days(1)))
        .unwrap();
    store
        .put_material(material(UNPUBLISHED_MATERIAL, 1, Duration::days(1)))
        .unwrap();
    store
        .put_material(material(3, 2, -Duration::days(2)))
        .unwrap();

    store
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.jwt.secret = TEST_SECRET.to_string();
    config.upload_dir =
        std::env::temp_dir().join(format!("lecturehall-test-{}", uuid::Uuid::new_v4()));
    config
}

/// The router over a freshly seeded store, plus the store for assertions
pub async fn setup_app() -> (Router, Arc<InMemoryStore>) {
    let store = seeded_store().await;
    let state = AppState::new(
        Stores::in_memory(store.clone()),
        test_config(),
        Arc::new(VoidMailer),
    );
    (build_router(state), store)
}

pub fn token(user_id: i64, root: bool) -> String {
    create_token(user_id, root, TEST_SECRET, 1).unwrap()
}

/// Sends one request and returns the status with the decoded JSON body
///
/// Empty bodies decode to `Value::Null`, non-JSON bodies to a string.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    claims: Option<(i64, bool)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((user_id, root)) = claims {
        builder = builder.header("authorization", format!("Bearer {}", token(user_id, root)));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, value)
}

/// Sends raw bytes, the way file uploads arrive
pub async fn upload(
    app: &Router,
    uri: &str,
    claims: Option<(i64, bool)>,
    content: &[u8],
) -> StatusCode {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/octet-stream");
    if let Some((user_id, root)) = claims {
        builder = builder.header("authorization", format!("Bearer {}", token(user_id, root)));
    }

    let request = builder.body(Body::from(content.to_vec())).unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

/// Fetches a file, returning the raw body and its content disposition
pub async fn download(
    app: &Router,
    uri: &str,
    claims: Option<(i64, bool)>,
) -> (StatusCode, Vec<u8>, Option<String>) {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some((user_id, root)) = claims {
        builder = builder.header("authorization", format!("Bearer {}", token(user_id, root)));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, bytes.to_vec(), disposition)
}

pub async fn get(app: &Router, uri: &str, claims: Option<(i64, bool)>) -> (StatusCode, Value) {
    send(app, Method::GET, uri, claims, None).await
}

pub async fn delete(app: &Router, uri: &str, claims: Option<(i64, bool)>) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, claims, None).await
}

pub async fn post(
    app: &Router,
    uri: &str,
    claims: Option<(i64, bool)>,
    body: Value,
) -> (StatusCode, Value) {
    send(app, Method::POST, uri, claims, Some(body)).await
}

pub async fn put(
    app: &Router,
    uri: &str,
    claims: Option<(i64, bool)>,
    body: Value,
) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, claims, Some(body)).await
}
