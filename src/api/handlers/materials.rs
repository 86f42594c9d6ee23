use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::courses::load_course;
use crate::api::errors::ApiError;
use crate::api::extract::JsonBody;
use crate::api::middleware::JwtAuth;
use crate::domain::access::{self, can_view_material, filter_materials, ADMIN_ONLY, ANY_ROLE};
use crate::domain::material::{Material, MaterialDraft, MaterialKind};
use crate::infrastructure::files::material_file_key;
use crate::state::AppState;

/// Response for a material
#[derive(Debug, Serialize, Deserialize)]
pub struct MaterialResponse {
    pub id: i64,
    pub course_id: i64,
    pub name: String,
    pub filename: String,
    pub file_url: String,
    pub kind: MaterialKind,
    pub publish_at: DateTime<Utc>,
    pub lecture_at: DateTime<Utc>,
}

impl From<&Material> for MaterialResponse {
    fn from(material: &Material) -> Self {
        Self {
            id: material.id,
            course_id: material.course_id,
            name: material.name.clone(),
            filename: material.filename.clone(),
            file_url: format!("/api/v1/materials/{}/file", material.id),
            kind: material.kind,
            publish_at: material.publish_at,
            lecture_at: material.lecture_at,
        }
    }
}

async fn load_material(state: &AppState, material_id: i64) -> Result<Material, ApiError> {
    state
        .stores
        .materials
        .find_by_id(material_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Material not found: {}", material_id)))
}

/// List the materials of a course
///
/// GET /api/v1/courses/:id/materials
///
/// Students only get materials whose publish time has passed.
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, course_id = course_id))]
pub async fn list_materials(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(course_id): Path<i64>,
) -> Result<Json<Vec<MaterialResponse>>, ApiError> {
    let viewer =
        access::authorize(state.stores.enrollments.as_ref(), &principal, course_id, ANY_ROLE)
            .await?;

    let materials = state.stores.materials.find_by_course(course_id).await?;
    let visible = filter_materials(materials, viewer, Utc::now());

    Ok(Json(visible.iter().map(MaterialResponse::from).collect()))
}

/// Create a material in a course
///
/// POST /api/v1/courses/:id/materials
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, course_id = course_id))]
pub async fn create_material(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(course_id): Path<i64>,
    JsonBody(draft): JsonBody<MaterialDraft>,
) -> Result<(StatusCode, Json<MaterialResponse>), ApiError> {
    access::authorize(state.stores.enrollments.as_ref(), &principal, course_id, ADMIN_ONLY)
        .await?;
    draft.validate()?;
    load_course(&state, course_id).await?;

    let material = state.stores.materials.create(course_id, draft).await?;

    tracing::info!(material_id = material.id, "material created");
    Ok((StatusCode::CREATED, Json(MaterialResponse::from(&material))))
}

/// Get a material
///
/// GET /api/v1/materials/:id
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, material_id = material_id))]
pub async fn get_material(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(material_id): Path<i64>,
) -> Result<Json<MaterialResponse>, ApiError> {
    let material = load_material(&state, material_id).await?;
    let viewer = access::authorize(
        state.stores.enrollments.as_ref(),
        &principal,
        material.course_id,
        ANY_ROLE,
    )
    .await?;

    if !can_view_material(&material, viewer, Utc::now()) {
        return Err(ApiError::forbidden("Material is not published yet"));
    }

    Ok(Json(MaterialResponse::from(&material)))
}

/// Update a material
///
/// PUT /api/v1/materials/:id
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, material_id = material_id))]
pub async fn update_material(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(material_id): Path<i64>,
    JsonBody(draft): JsonBody<MaterialDraft>,
) -> Result<Json<MaterialResponse>, ApiError> {
    let mut material = load_material(&state, material_id).await?;
    access::authorize(
        state.stores.enrollments.as_ref(),
        &principal,
        material.course_id,
        ADMIN_ONLY,
    )
    .await?;
    draft.validate()?;

    material.apply(draft);
    state.stores.materials.update(&material).await?;

    tracing::info!("material updated");
    Ok(Json(MaterialResponse::from(&material)))
}

/// Delete a material
///
/// DELETE /api/v1/materials/:id
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, material_id = material_id))]
pub async fn delete_material(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(material_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let material = load_material(&state, material_id).await?;
    access::authorize(
        state.stores.enrollments.as_ref(),
        &principal,
        material.course_id,
        ADMIN_ONLY,
    )
    .await?;

    state.stores.materials.delete(material_id).await?;
    remove_file(&state, material_id).await;

    tracing::info!("material deleted");
    Ok(StatusCode::OK)
}

/// Drops the uploaded file of a deleted material
///
/// The row is already gone at this point, so a failure only leaves an orphan
/// file behind and is logged instead of failing the request.
pub(crate) async fn remove_file(state: &AppState, material_id: i64) {
    if let Err(e) = state.files.delete(&material_file_key(material_id)).await {
        tracing::warn!(material_id, error = %e, "failed to remove material file");
    }
}

/// Upload the file of a material, replacing an earlier upload
///
/// POST /api/v1/materials/:id/file
///
/// The request body is the raw file content.
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, material_id = material_id))]
pub async fn upload_file(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(material_id): Path<i64>,
    content: Bytes,
) -> Result<StatusCode, ApiError> {
    let material = load_material(&state, material_id).await?;
    access::authorize(
        state.stores.enrollments.as_ref(),
        &principal,
        material.course_id,
        ADMIN_ONLY,
    )
    .await?;

    if content.is_empty() {
        return Err(ApiError::bad_request("File must not be empty"));
    }

    state
        .files
        .save(&material_file_key(material.id), &content)
        .await?;

    tracing::info!(bytes = content.len(), "material file uploaded");
    Ok(StatusCode::NO_CONTENT)
}

/// Download the file of a material
///
/// GET /api/v1/materials/:id/file
///
/// Same visibility as [`get_material`]: students wait for the publish time.
#[tracing::instrument(skip_all, fields(user_id = principal.user_id, material_id = material_id))]
pub async fn download_file(
    State(state): State<AppState>,
    JwtAuth(principal): JwtAuth,
    Path(material_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let material = load_material(&state, material_id).await?;
    let viewer = access::authorize(
        state.stores.enrollments.as_ref(),
        &principal,
        material.course_id,
        ANY_ROLE,
    )
    .await?;

    if !can_view_material(&material, viewer, Utc::now()) {
        return Err(ApiError::forbidden("Material is not published yet"));
    }

    let content = state.files.load(&material_file_key(material.id)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, attachment(&material.filename)),
        ],
        content,
    ))
}

fn attachment(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}
