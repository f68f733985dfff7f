//! Configuration module
//!
//! Settings are read once at startup from the environment (and `.env` when present)
//! and then passed by value into storage, the derivative pipeline and the router.
//! Nothing reads the environment after `Config::from_env` returns.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

// Common constants
const SERVER_PORT: u16 = 4002;
const UPLOAD_RATE_LIMIT: u32 = 20;
const UPLOAD_RATE_LIMIT_WINDOW_SECS: u64 = 900;
const MIN_JWT_SECRET_LEN: usize = 32;

/// Settings shared with the other recipebox services
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    /// HS256 secret; every service validates tokens with the same value
    pub jwt_secret: String,
    pub upload_rate_limit: u32,
    pub upload_rate_limit_window_secs: u64,
    pub environment: String,
}

/// Media service configuration
#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub base: BaseConfig,
    pub upload_dir: PathBuf,
    pub profile_picture_dir: PathBuf,
    pub public_base_url: String,
    // Image limits
    pub max_file_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
    // Video limits
    pub max_video_size_bytes: usize,
    pub video_allowed_extensions: Vec<String>,
    pub video_allowed_content_types: Vec<String>,
    // Toolchain
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub ffmpeg_stage_timeout_secs: u64,
    pub pipeline_timeout_secs: u64,
}

fn env_list(key: &str, default: &str) -> Vec<String> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl MediaConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const MAX_FILE_SIZE_MB: usize = 10;
        const MAX_VIDEO_SIZE_MB: usize = 100;
        const FFMPEG_STAGE_TIMEOUT_SECS: u64 = 60;
        const PIPELINE_TIMEOUT_SECS: u64 = 180;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            upload_rate_limit: env::var("UPLOAD_RATE_LIMIT")
                .unwrap_or_else(|_| UPLOAD_RATE_LIMIT.to_string())
                .parse()
                .unwrap_or(UPLOAD_RATE_LIMIT),
            upload_rate_limit_window_secs: env::var("UPLOAD_RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|_| UPLOAD_RATE_LIMIT_WINDOW_SECS.to_string())
                .parse()
                .unwrap_or(UPLOAD_RATE_LIMIT_WINDOW_SECS),
            environment,
        };

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .unwrap_or_else(|_| MAX_VIDEO_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        let port = base.server_port;
        let config = MediaConfig {
            base,
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".to_string())
                .into(),
            profile_picture_dir: env::var("PROFILE_PICTURE_DIR")
                .unwrap_or_else(|_| "profile-pictures".to_string())
                .into(),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_extensions: env_list("ALLOWED_EXTENSIONS", "jpg,jpeg,png,gif,webp"),
            allowed_content_types: env_list(
                "ALLOWED_CONTENT_TYPES",
                "image/jpeg,image/png,image/gif,image/webp",
            ),
            max_video_size_bytes: max_video_size_mb * 1024 * 1024,
            video_allowed_extensions: env_list("VIDEO_ALLOWED_EXTENSIONS", "mp4,mov,webm,mkv,avi"),
            video_allowed_content_types: env_list(
                "VIDEO_ALLOWED_CONTENT_TYPES",
                "video/mp4,video/quicktime,video/webm,video/x-matroska,video/x-msvideo",
            ),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            ffmpeg_stage_timeout_secs: env::var("FFMPEG_STAGE_TIMEOUT_SECS")
                .unwrap_or_else(|_| FFMPEG_STAGE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(FFMPEG_STAGE_TIMEOUT_SECS),
            pipeline_timeout_secs: env::var("PIPELINE_TIMEOUT_SECS")
                .unwrap_or_else(|_| PIPELINE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(PIPELINE_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if self.upload_dir.starts_with(&self.profile_picture_dir)
            || self.profile_picture_dir.starts_with(&self.upload_dir)
        {
            return Err(anyhow::anyhow!(
                "UPLOAD_DIR and PROFILE_PICTURE_DIR must be separate, non-nested directories"
            ));
        }

        if self.base.upload_rate_limit == 0 || self.base.upload_rate_limit_window_secs == 0 {
            return Err(anyhow::anyhow!(
                "UPLOAD_RATE_LIMIT and UPLOAD_RATE_LIMIT_WINDOW_SECS must be greater than zero"
            ));
        }

        if self.max_file_size_bytes == 0 || self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_MB and MAX_VIDEO_SIZE_MB must be greater than zero"
            ));
        }

        let environment = self.base.environment.to_lowercase();
        let production = environment == "production" || environment == "prod";
        if production && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS=* is not allowed in production"
            ));
        }

        if self.ffmpeg_stage_timeout_secs == 0 || self.pipeline_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "FFMPEG_STAGE_TIMEOUT_SECS and PIPELINE_TIMEOUT_SECS must be greater than zero"
            ));
        }

        Ok(())
    }
}

/// Application configuration handed to `initialize_app`
#[derive(Clone, Debug)]
pub struct Config(pub Box<MediaConfig>);

impl Config {
    fn as_media(&self) -> &MediaConfig {
        &self.0
    }

    pub fn new(config: MediaConfig) -> Self {
        Config(Box::new(config))
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = MediaConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_media().validate()
    }

    pub fn is_production(&self) -> bool {
        let env = self.as_media().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_media().base.server_port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_media().base.jwt_secret
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_media().base.cors_origins
    }

    pub fn upload_rate_limit(&self) -> u32 {
        self.as_media().base.upload_rate_limit
    }

    pub fn upload_rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.as_media().base.upload_rate_limit_window_secs)
    }

    pub fn environment(&self) -> &str {
        &self.as_media().base.environment
    }

    pub fn upload_dir(&self) -> &PathBuf {
        &self.as_media().upload_dir
    }

    pub fn profile_picture_dir(&self) -> &PathBuf {
        &self.as_media().profile_picture_dir
    }

    pub fn public_base_url(&self) -> &str {
        &self.as_media().public_base_url
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_media().max_file_size_bytes
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.as_media().allowed_extensions
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.as_media().allowed_content_types
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.as_media().max_video_size_bytes
    }

    pub fn video_allowed_extensions(&self) -> &[String] {
        &self.as_media().video_allowed_extensions
    }

    pub fn video_allowed_content_types(&self) -> &[String] {
        &self.as_media().video_allowed_content_types
    }

    /// Largest accepted upload across categories
    pub fn max_upload_bytes(&self) -> usize {
        self.max_file_size_bytes().max(self.max_video_size_bytes())
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_media().ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.as_media().ffprobe_path
    }

    pub fn ffmpeg_stage_timeout(&self) -> Duration {
        Duration::from_secs(self.as_media().ffmpeg_stage_timeout_secs)
    }

    pub fn pipeline_timeout(&self) -> Duration {
        Duration::from_secs(self.as_media().pipeline_timeout_secs)
    }
}
