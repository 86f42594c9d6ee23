use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::materials::remove_file;
use crate::api::errors::ApiError;
use crate::api::extract::JsonBody;
use crate::api::middleware::JwtAuth;
use crate::domain::access::{self, ADMIN_ONLY, ANY_ROLE};
use crate::domain::course::{Course, CourseDraft};
use crate::domain::errors::require_text;
use crate::infrastructure::mail::{dispatch, OutgoingMail};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CourseEmailRequest {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CourseEmailResponse {
    pub recipients: usize,
}

/// Loads a course or fails with 404
pub(crate) async fn load_course(state: &AppState, course_id: i64) -> Result<Course, ApiError> {
    state
        .stores
        .courses
        .find_by_id(course_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Course not found: {}", course_id)))
}

/// List all courses
///
/// GET /api/v1/courses
#[tracing::instrument(skip_all, fields(user_id = principal.user_id))]
pub async fn list_courses(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.stores.courses.find_all().await?))
}

/// Create a new course, global administrators only
///
/// POST /api/v1/courses
#[tracing::instrument(skip_all, fields(user_id = principal.user_id))]
pub async fn create_course(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    JsonBody(draft): JsonBody<CourseDraft>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    access::require_root(&principal)?;
    draft.validate()?;

    let course = state.stores.courses.create(draft).await?;

    tracing::info!(course_id = course.id, "course created");
    Ok((StatusCode::CREATED, Json(course)))
}

/// Get a course
///
/// GET /api/v1/courses/:id
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, course_id = course_id))]
pub async fn get_course(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(course_id): Path<i64>,
) -> Result<Json<Course>, ApiError> {
    access::authorize(state.stores.enrollments.as_ref(), &principal, course_id, ANY_ROLE).await?;

    Ok(Json(load_course(&state, course_id).await?))
}

/// Update a course
///
/// PUT /api/v1/courses/:id
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, course_id = course_id))]
pub async fn update_course(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(course_id): Path<i64>,
    JsonBody(draft): JsonBody<CourseDraft>,
) -> Result<Json<Course>, ApiError> {
    access::authorize(state.stores.enrollments.as_ref(), &principal, course_id, ADMIN_ONLY)
        .await?;
    draft.validate()?;

    let mut course = load_course(&state, course_id).await?;
    course.apply(draft);
    state.stores.courses.update(&course).await?;

    tracing::info!("course updated");
    Ok(Json(course))
}

/// Delete a course together with its enrollments, groups and materials
///
/// DELETE /api/v1/courses/:id
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, course_id = course_id))]
pub async fn delete_course(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(course_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    access::authorize(state.stores.enrollments.as_ref(), &principal, course_id, ADMIN_ONLY)
        .await?;

    let materials = state.stores.materials.find_by_course(course_id).await?;
    state.stores.courses.delete(course_id).await?;
    for material in &materials {
        remove_file(&state, material.id).await;
    }

    tracing::info!("course deleted");
    Ok(StatusCode::OK)
}

/// Mail every participant of a course
///
/// POST /api/v1/courses/:id/emails
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, course_id = course_id))]
pub async fn send_course_email(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(course_id): Path<i64>,
    JsonBody(req): JsonBody<CourseEmailRequest>,
) -> Result<Json<CourseEmailResponse>, ApiError> {
    access::authorize(state.stores.enrollments.as_ref(), &principal, course_id, ADMIN_ONLY)
        .await?;
    require_text("subject", &req.subject)?;
    require_text("body", &req.body)?;

    let course = load_course(&state, course_id).await?;
    let recipients = state.stores.enrollments.list(course_id, &[]).await?;

    let mails: Vec<OutgoingMail> = recipients
        .iter()
        .map(|e| OutgoingMail::course_notice(&e.email, &course.name, &req.subject, &req.body))
        .collect();
    let count = mails.len();
    dispatch(state.mailer.clone(), mails);

    tracing::info!(recipients = count, "course email queued");
    Ok(Json(CourseEmailResponse { recipients: count }))
}
