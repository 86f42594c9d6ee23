use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::courses::load_course;
use crate::api::errors::ApiError;
use crate::api::extract::JsonBody;
use crate::api::middleware::JwtAuth;
use crate::domain::access::{
    self, filter_enrollments, visible_enrollment_roles, ADMIN_ONLY, ANY_ROLE, STUDENT_OR_ADMIN,
};
use crate::domain::course::{CourseRole, Enrollment};
use crate::domain::errors::RepositoryError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EnrollmentQuery {
    /// Comma separated role filter such as `0,1`
    pub roles: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: CourseRole,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EnrollResponse {
    pub course_id: i64,
    pub role: CourseRole,
}

/// List the participants of a course
///
/// GET /api/v1/courses/:id/enrollments?roles=0,1
///
/// Students only ever see tutors and admins. Fields are redacted for
/// everyone below admin.
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, course_id = course_id))]
pub async fn list_enrollments(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(course_id): Path<i64>,
    Query(query): Query<EnrollmentQuery>,
) -> Result<Json<Vec<Enrollment>>, ApiError> {
    let viewer =
        access::authorize(state.stores.enrollments.as_ref(), &principal, course_id, ANY_ROLE)
            .await?;

    let requested = CourseRole::parse_list(query.roles.as_deref().unwrap_or_default())
        .map_err(ApiError::bad_request)?;
    let roles = visible_enrollment_roles(viewer, &requested);

    let enrollments = state.stores.enrollments.list(course_id, &roles).await?;

    Ok(Json(filter_enrollments(enrollments, viewer)))
}

/// Enroll the caller as a student
///
/// POST /api/v1/courses/:id/enrollments
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, course_id = course_id))]
pub async fn enroll(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(course_id): Path<i64>,
) -> Result<(StatusCode, Json<EnrollResponse>), ApiError> {
    load_course(&state, course_id).await?;

    state
        .stores
        .enrollments
        .enroll(principal.user_id, course_id, CourseRole::Student)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => ApiError::bad_request("Already enrolled in this course"),
            other => other.into(),
        })?;

    tracing::info!("user enrolled");
    Ok((
        StatusCode::CREATED,
        Json(EnrollResponse {
            course_id,
            role: CourseRole::Student,
        }),
    ))
}

/// Leave a course
///
/// DELETE /api/v1/courses/:id/enrollments
///
/// Tutors have to be removed by an admin.
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, course_id = course_id))]
pub async fn disenroll(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(course_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    access::authorize(
        state.stores.enrollments.as_ref(),
        &principal,
        course_id,
        STUDENT_OR_ADMIN,
    )
    .await?;

    state
        .stores
        .enrollments
        .disenroll(principal.user_id, course_id)
        .await?;

    tracing::info!("user disenrolled");
    Ok(StatusCode::OK)
}

/// Change the role of a participant
///
/// PUT /api/v1/courses/:id/enrollments/:user_id
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, course_id = course_id, target = target_id))]
pub async fn change_role(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path((course_id, target_id)): Path<(i64, i64)>,
    JsonBody(req): JsonBody<ChangeRoleRequest>,
) -> Result<StatusCode, ApiError> {
    access::authorize(state.stores.enrollments.as_ref(), &principal, course_id, ADMIN_ONLY)
        .await?;

    state
        .stores
        .enrollments
        .change_role(target_id, course_id, req.role)
        .await?;

    tracing::info!(role = %req.role, "enrollment role changed");
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a participant from a course
///
/// DELETE /api/v1/courses/:id/enrollments/:user_id
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, course_id = course_id, target = target_id))]
pub async fn remove_enrollment(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path((course_id, target_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    access::authorize(state.stores.enrollments.as_ref(), &principal, course_id, ADMIN_ONLY)
        .await?;

    state
        .stores
        .enrollments
        .disenroll(target_id, course_id)
        .await?;

    tracing::info!("enrollment removed");
    Ok(StatusCode::OK)
}
