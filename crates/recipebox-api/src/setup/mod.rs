//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::auth::JwtService;
use crate::constants::{RATE_LIMITER_SHARDS, RATE_LIMIT_CLEANUP_INTERVAL_SECS};
use crate::middleware::{spawn_cleanup_task, HttpRateLimiter};
use crate::state::{AppState, StorageState};
use anyhow::{Context, Result};
use recipebox_core::{Config, StorageArea};
use recipebox_processing::{
    DerivativePipeline, DerivativeSettings, FfmpegToolchain, MediaValidator, UploadValidator,
    VideoToolchain,
};
use recipebox_storage::LocalStorage;
use std::sync::Arc;
use std::time::Duration;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.environment());
    crate::error::hide_error_details(config.is_production());

    let toolchain = FfmpegToolchain::new(
        config.ffmpeg_path().to_string(),
        config.ffprobe_path().to_string(),
        config.ffmpeg_stage_timeout(),
    )
    .context("Invalid ffmpeg toolchain configuration")?;

    let state = build_state(config.clone(), Arc::new(toolchain)).await?;
    spawn_cleanup_task(
        state.rate_limiter.clone(),
        Duration::from_secs(RATE_LIMIT_CLEANUP_INTERVAL_SECS),
    );

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

/// Build application state over the configured storage roots.
///
/// The video toolchain is injected so tests can run without ffmpeg installed.
pub async fn build_state(
    config: Config,
    toolchain: Arc<dyn VideoToolchain>,
) -> Result<Arc<AppState>> {
    let storage = StorageState {
        uploads: LocalStorage::new(config.upload_dir(), StorageArea::Uploads)
            .await
            .context("Failed to initialize upload storage")?,
        profile_pictures: LocalStorage::new(
            config.profile_picture_dir(),
            StorageArea::ProfilePictures,
        )
        .await
        .context("Failed to initialize profile picture storage")?,
    };

    let validator = UploadValidator::new(
        MediaValidator::new(
            config.max_file_size_bytes(),
            config.allowed_extensions().to_vec(),
            config.allowed_content_types().to_vec(),
        ),
        MediaValidator::new(
            config.max_video_size_bytes(),
            config.video_allowed_extensions().to_vec(),
            config.video_allowed_content_types().to_vec(),
        ),
    );

    let pipeline = DerivativePipeline::new(
        DerivativeSettings::default(),
        toolchain,
        config.pipeline_timeout(),
    );

    let rate_limiter = Arc::new(HttpRateLimiter::new(
        config.upload_rate_limit(),
        config.upload_rate_limit_window(),
        RATE_LIMITER_SHARDS,
    ));

    tracing::info!(
        upload_dir = %config.upload_dir().display(),
        profile_picture_dir = %config.profile_picture_dir().display(),
        pipeline_timeout_secs = config.pipeline_timeout().as_secs(),
        "Storage and derivative pipeline ready"
    );

    Ok(Arc::new(AppState {
        jwt: Arc::new(JwtService::new(config.jwt_secret())),
        config,
        storage,
        validator,
        pipeline,
        rate_limiter,
    }))
}
