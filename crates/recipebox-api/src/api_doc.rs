//! OpenAPI documentation, served at `/api-docs/openapi.json` with RapiDoc at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use recipebox_core::models;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Recipebox Media API",
        version = "0.1.0",
        description = "Uploads for recipe photos, step videos and profile pictures. Every upload gets derivatives before the response: a bounded PNG thumbnail for images, screenshots and an animated GIF preview for videos. All JSON endpoints are versioned under /api/v1/."
    ),
    paths(
        handlers::upload::upload_file,
        handlers::profile_picture::upload_profile_picture,
        handlers::delete::delete_upload,
        handlers::delete::delete_profile_picture,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::UploadResponse,
            models::DeleteResponse,
            models::DerivativeSet,
            models::MediaCategory,
            models::StorageArea,
            handlers::health::HealthCheckResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "uploads", description = "Upload and delete media with their derivatives"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
