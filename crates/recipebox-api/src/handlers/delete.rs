use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use recipebox_core::{DeleteResponse, StorageArea};

use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::MediaUploadService;
use crate::state::AppState;

#[utoipa::path(
    delete,
    path = "/api/v1/uploads/{filename}",
    tag = "uploads",
    params(
        ("filename" = String, Path, description = "Stored filename returned by the upload")
    ),
    responses(
        (status = 200, description = "File and its derivatives deleted", body = DeleteResponse),
        (status = 400, description = "Not a stored upload name", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requester is neither the owner nor an admin", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "delete_upload"))]
pub async fn delete_upload(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(filename): Path<String>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    let response = MediaUploadService::new(&state, StorageArea::Uploads)
        .delete(&user, &filename)
        .await?;
    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/api/v1/uploads/profile-picture/{filename}",
    tag = "uploads",
    params(
        ("filename" = String, Path, description = "Stored profile picture filename")
    ),
    responses(
        (status = 200, description = "Profile picture and thumbnail deleted", body = DeleteResponse),
        (status = 400, description = "Not a stored upload name", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requester is neither the owner nor an admin", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, operation = "delete_profile_picture")
)]
pub async fn delete_profile_picture(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(filename): Path<String>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    let response = MediaUploadService::new(&state, StorageArea::ProfilePictures)
        .delete(&user, &filename)
        .await?;
    Ok(Json(response))
}
