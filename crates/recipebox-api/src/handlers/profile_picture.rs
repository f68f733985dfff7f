use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use recipebox_core::{StorageArea, UploadResponse};

use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::MediaUploadService;
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

/// Upload a profile picture
///
/// Images only. Stored in the profile picture area with a bounded PNG thumbnail.
#[utoipa::path(
    post,
    path = "/api/v1/uploads/profile-picture",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Profile picture uploaded", body = UploadResponse),
        (status = 400, description = "Invalid input or not an image", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "Thumbnail generation or storage failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(user_id = %user.user_id, operation = "upload_profile_picture")
)]
pub async fn upload_profile_picture(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let file = extract_multipart_file(multipart).await?;
    let response = MediaUploadService::new(&state, StorageArea::ProfilePictures)
        .upload(&user, file)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}
