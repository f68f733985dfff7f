//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::auth::middleware::auth_middleware;
use crate::constants::{API_PREFIX, FILES_PREFIX, HTTP_CONCURRENCY_LIMIT, MULTIPART_OVERHEAD_BYTES};
use crate::handlers;
use crate::middleware::rate_limit_middleware;
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use recipebox_core::{naming, Config};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let app = public_routes()
        .merge(protected_routes(state.clone()))
        .with_state(state.clone())
        .merge(static_routes(&state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/docs"))
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!(
        api_prefix = API_PREFIX,
        rate_limit = config.upload_rate_limit(),
        rate_limit_window_secs = config.upload_rate_limit_window().as_secs(),
        "Routes configured"
    );

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        &format!("{}/health", API_PREFIX),
        get(handlers::health::health_check),
    )
}

/// Upload and delete routes: authenticated, then rate limited per user.
fn protected_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let body_limit = state
        .config
        .max_upload_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route(
            &format!("{}/uploads", API_PREFIX),
            post(handlers::upload::upload_file),
        )
        .route(
            &format!("{}/uploads/profile-picture", API_PREFIX),
            post(handlers::profile_picture::upload_profile_picture),
        )
        .route(
            &format!("{}/uploads/{{filename}}", API_PREFIX),
            delete(handlers::delete::delete_upload),
        )
        .route(
            &format!("{}/uploads/profile-picture/{{filename}}", API_PREFIX),
            delete(handlers::delete::delete_profile_picture),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(axum::middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ))
}

/// Public read access to both storage roots
fn static_routes(state: &AppState) -> Router {
    Router::new()
        .nest_service(
            &format!("{}/uploads", FILES_PREFIX),
            ServeDir::new(state.storage.uploads.base_path()),
        )
        .nest_service(
            &format!("{}/profile-pictures", FILES_PREFIX),
            ServeDir::new(state.storage.profile_pictures.base_path()),
        )
        .layer(axum::middleware::from_fn(hide_transient_files))
}

/// 404 for in-progress `.part` writes and GIF palettes.
///
/// Stored names never contain `%`, so any percent-encoded name is refused rather than
/// decoded here.
async fn hide_transient_files(request: Request, next: Next) -> Response {
    let name = request.uri().path().rsplit('/').next().unwrap_or_default();
    if name.contains('%') || naming::is_transient(name) {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}
