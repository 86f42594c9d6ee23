use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::courses::load_course;
use crate::api::errors::ApiError;
use crate::api::extract::JsonBody;
use crate::api::middleware::JwtAuth;
use crate::domain::access::{self, ADMIN_ONLY, ANY_ROLE};
use crate::domain::course::CourseRole;
use crate::domain::group::{Group, GroupDraft};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AssignMemberRequest {
    pub user_id: i64,
}

async fn load_group(state: &AppState, group_id: i64) -> Result<Group, ApiError> {
    state
        .stores
        .groups
        .find_by_id(group_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Group not found: {}", group_id)))
}

/// List the groups of a course
///
/// GET /api/v1/courses/:id/groups
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, course_id = course_id))]
pub async fn list_groups(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(course_id): Path<i64>,
) -> Result<Json<Vec<Group>>, ApiError> {
    access::authorize(state.stores.enrollments.as_ref(), &principal, course_id, ANY_ROLE).await?;

    Ok(Json(state.stores.groups.find_by_course(course_id).await?))
}

/// Create a group in a course
///
/// POST /api/v1/courses/:id/groups
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, course_id = course_id))]
pub async fn create_group(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(course_id): Path<i64>,
    JsonBody(draft): JsonBody<GroupDraft>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    access::authorize(state.stores.enrollments.as_ref(), &principal, course_id, ADMIN_ONLY)
        .await?;
    draft.validate()?;
    load_course(&state, course_id).await?;

    let group = state.stores.groups.create(course_id, draft).await?;

    tracing::info!(group_id = group.id, "group created");
    Ok((StatusCode::CREATED, Json(group)))
}

/// Find the group the caller belongs to in a course
///
/// GET /api/v1/courses/:id/group
///
/// Students are found through their membership, tutors through the groups
/// they lead. Admins get whichever applies to them.
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, course_id = course_id))]
pub async fn find_my_group(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(course_id): Path<i64>,
) -> Result<Json<Group>, ApiError> {
    let role =
        access::authorize(state.stores.enrollments.as_ref(), &principal, course_id, ANY_ROLE)
            .await?;

    let groups = &state.stores.groups;
    let group = match role {
        CourseRole::Student => groups.find_for_member(course_id, principal.user_id).await?,
        CourseRole::Tutor => groups.find_for_tutor(course_id, principal.user_id).await?,
        CourseRole::Admin => match groups.find_for_tutor(course_id, principal.user_id).await? {
            Some(group) => Some(group),
            None => groups.find_for_member(course_id, principal.user_id).await?,
        },
    };

    group
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No group assigned in this course"))
}

/// Get a group
///
/// GET /api/v1/groups/:id
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, group_id = group_id))]
pub async fn get_group(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(group_id): Path<i64>,
) -> Result<Json<Group>, ApiError> {
    let group = load_group(&state, group_id).await?;
    access::authorize(
        state.stores.enrollments.as_ref(),
        &principal,
        group.course_id,
        ANY_ROLE,
    )
    .await?;

    Ok(Json(group))
}

/// Update a group
///
/// PUT /api/v1/groups/:id
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, group_id = group_id))]
pub async fn update_group(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(group_id): Path<i64>,
    JsonBody(draft): JsonBody<GroupDraft>,
) -> Result<Json<Group>, ApiError> {
    let mut group = load_group(&state, group_id).await?;
    access::authorize(
        state.stores.enrollments.as_ref(),
        &principal,
        group.course_id,
        ADMIN_ONLY,
    )
    .await?;
    draft.validate()?;

    group.apply(draft);
    state.stores.groups.update(&group).await?;

    tracing::info!("group updated");
    Ok(Json(group))
}

/// Delete a group
///
/// DELETE /api/v1/groups/:id
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, group_id = group_id))]
pub async fn delete_group(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(group_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let group = load_group(&state, group_id).await?;
    access::authorize(
        state.stores.enrollments.as_ref(),
        &principal,
        group.course_id,
        ADMIN_ONLY,
    )
    .await?;

    state.stores.groups.delete(group_id).await?;

    tracing::info!("group deleted");
    Ok(StatusCode::OK)
}

/// Put a student into a group, moving them out of any sibling group
///
/// POST /api/v1/groups/:id/enrollments
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, group_id = group_id))]
pub async fn assign_member(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(group_id): Path<i64>,
    JsonBody(req): JsonBody<AssignMemberRequest>,
) -> Result<StatusCode, ApiError> {
    let group = load_group(&state, group_id).await?;
    access::authorize(
        state.stores.enrollments.as_ref(),
        &principal,
        group.course_id,
        ADMIN_ONLY,
    )
    .await?;

    let member = state
        .stores
        .enrollments
        .find(req.user_id, group.course_id)
        .await?;
    match member {
        Some(enrollment) if enrollment.role == CourseRole::Student => {}
        Some(_) => return Err(ApiError::bad_request("Only students can join a group")),
        None => {
            return Err(ApiError::bad_request(format!(
                "User {} is not enrolled in course {}",
                req.user_id, group.course_id
            )))
        }
    }

    state
        .stores
        .groups
        .assign_member(group_id, req.user_id)
        .await?;

    tracing::info!(member_id = req.user_id, "group member assigned");
    Ok(StatusCode::NO_CONTENT)
}
