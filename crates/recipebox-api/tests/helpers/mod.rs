//! Test helpers: build AppState over temp directories and a scripted video toolchain.
//!
//! Run from workspace root: `cargo test -p recipebox-api`.

pub mod auth;
pub mod fixtures;
pub mod toolchain;

use axum_test::TestServer;
use recipebox_api::constants;
use recipebox_api::setup::{build_state, routes};
use recipebox_core::{BaseConfig, Config, MediaConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use toolchain::FakeToolchain;

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus the directories it writes to.
pub struct TestApp {
    pub server: TestServer,
    pub uploads: PathBuf,
    pub profile_pictures: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn test_config(root: &Path) -> MediaConfig {
    MediaConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            jwt_secret: auth::TEST_JWT_SECRET.to_string(),
            upload_rate_limit: 100,
            upload_rate_limit_window_secs: 900,
            environment: "test".to_string(),
        },
        upload_dir: root.join("uploads"),
        profile_picture_dir: root.join("profile-pictures"),
        public_base_url: "http://localhost".to_string(),
        max_file_size_bytes: 256 * 1024,
        allowed_extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
        allowed_content_types: vec!["image/jpeg".into(), "image/png".into()],
        max_video_size_bytes: 1024 * 1024,
        video_allowed_extensions: vec!["mp4".into(), "mov".into()],
        video_allowed_content_types: vec!["video/mp4".into(), "video/quicktime".into()],
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        ffmpeg_stage_timeout_secs: 5,
        pipeline_timeout_secs: 5,
    }
}

/// Setup test app with default settings and a well-behaved toolchain.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(FakeToolchain::default(), |_| {}).await
}

/// Setup test app with a scripted toolchain and config overrides.
pub async fn setup_test_app_with(
    toolchain: FakeToolchain,
    configure: impl FnOnce(&mut MediaConfig),
) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut media = test_config(temp_dir.path());
    configure(&mut media);
    let config = Config::new(media);

    let state = build_state(config.clone(), Arc::new(toolchain))
        .await
        .expect("Failed to build state");
    let router = routes::setup_routes(&config, state).expect("Failed to setup routes");

    TestApp {
        server: TestServer::new(router).expect("Failed to start test server"),
        uploads: config.upload_dir().clone(),
        profile_pictures: config.profile_picture_dir().clone(),
        _temp_dir: temp_dir,
    }
}

/// Sorted file names in `dir`.
pub fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    names.sort();
    names
}
