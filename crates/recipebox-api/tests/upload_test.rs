//! Upload endpoint integration tests.
//!
//! Run from workspace root: `cargo test -p recipebox-api --test upload_test`.

mod helpers;

use helpers::auth::bearer;
use helpers::fixtures::{file_form, mp4_form, png_bytes, png_form};
use helpers::toolchain::FakeToolchain;
use helpers::{api_path, listing, setup_test_app, setup_test_app_with};
use serde_json::Value;

fn str_field<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| panic!("Expected '{}' in {}", key, body))
}

#[tokio::test]
async fn test_image_upload_creates_bounded_thumbnail() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(png_form(640, 480))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    let filename = str_field(&body, "filename");
    assert!(filename.ends_with("_chef-7.png"), "got {}", filename);
    assert_eq!(str_field(&body, "media_type"), "image/png");

    let derivatives = body.get("derivatives").expect("derivatives");
    assert_eq!(str_field(derivatives, "kind"), "image");
    let thumbnail = str_field(derivatives, "thumbnail");
    assert_eq!(thumbnail, filename.replace(".png", "-thumb.png"));

    let thumb = image::open(app.uploads.join(thumbnail)).expect("thumbnail decodes");
    assert_eq!((thumb.width(), thumb.height()), (320, 240));
    assert_eq!(listing(&app.uploads).len(), 2);
}

#[tokio::test]
async fn test_small_image_is_not_upscaled() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(png_form(100, 60))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    let thumbnail = str_field(body.get("derivatives").expect("derivatives"), "thumbnail");
    let thumb = image::open(app.uploads.join(thumbnail)).expect("thumbnail decodes");
    assert_eq!((thumb.width(), thumb.height()), (100, 60));
}

#[tokio::test]
async fn test_upload_requires_token() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(png_form(10, 10))
        .await;

    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(str_field(&body, "code"), "UNAUTHENTICATED");
    assert!(listing(&app.uploads).is_empty());
}

#[tokio::test]
async fn test_upload_rejects_bad_token() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", "Bearer not-a-jwt")
        .multipart(png_form(10, 10))
        .await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = setup_test_app().await;

    let form = axum_test::multipart::MultipartForm::new().add_text("title", "pancakes");
    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(str_field(&body, "code"), "INVALID_INPUT");
}

#[tokio::test]
async fn test_upload_without_extension() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(file_form(png_bytes(10, 10), "dinner", "image/png"))
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(listing(&app.uploads).is_empty());
}

#[tokio::test]
async fn test_upload_rejects_non_media() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(file_form(b"just text".to_vec(), "notes.txt", "text/plain"))
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(listing(&app.uploads).is_empty());
}

#[tokio::test]
async fn test_upload_rejects_mismatched_extension() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(file_form(png_bytes(10, 10), "dinner.gif", "image/png"))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_image_over_category_cap() {
    let app = setup_test_app().await;

    // Under the body limit, over the 256 KiB image cap
    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(file_form(vec![0u8; 300 * 1024], "huge.png", "image/png"))
        .await;

    assert_eq!(response.status_code(), 413);
    let body: Value = response.json();
    assert_eq!(str_field(&body, "code"), "PAYLOAD_TOO_LARGE");
    assert!(listing(&app.uploads).is_empty());
}

#[tokio::test]
async fn test_body_over_transport_limit() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(file_form(vec![0u8; 2 * 1024 * 1024], "huge.mp4", "video/mp4"))
        .await;

    assert_eq!(response.status_code(), 413);
    assert!(listing(&app.uploads).is_empty());
}

#[tokio::test]
async fn test_video_upload_produces_screenshots_and_gif() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(mp4_form())
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    let filename = str_field(&body, "filename").to_string();
    let base = filename.trim_end_matches(".mp4");

    let derivatives = body.get("derivatives").expect("derivatives");
    assert_eq!(str_field(derivatives, "kind"), "video");
    let screenshots: Vec<&str> = derivatives
        .get("screenshots")
        .and_then(|v| v.as_array())
        .expect("screenshots")
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(
        screenshots,
        vec![
            format!("{}-thumb-1.png", base),
            format!("{}-thumb-2.png", base),
            format!("{}-thumb-3.png", base),
        ]
    );
    assert_eq!(
        str_field(derivatives, "gif"),
        format!("{}-animation.gif", base)
    );

    // Original, 3 screenshots, gif; the palette is gone
    let files = listing(&app.uploads);
    assert_eq!(files.len(), 5, "{:?}", files);
    assert!(!files.iter().any(|f| f.contains("palette")));
}

#[tokio::test]
async fn test_video_palette_failure_is_degraded() {
    let app = setup_test_app_with(
        FakeToolchain {
            fail_palette: true,
            ..Default::default()
        },
        |_| {},
    )
    .await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(mp4_form())
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    let derivatives = body.get("derivatives").expect("derivatives");
    assert!(derivatives.get("gif").map(|v| v.is_null()).unwrap_or(true));
    assert_eq!(listing(&app.uploads).len(), 4);
}

#[tokio::test]
async fn test_video_probe_failure_removes_upload() {
    let app = setup_test_app_with(
        FakeToolchain {
            fail_probe: true,
            ..Default::default()
        },
        |_| {},
    )
    .await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(mp4_form())
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(str_field(&body, "code"), "PROBE_FAILED");
    assert!(listing(&app.uploads).is_empty());
}

#[tokio::test]
async fn test_video_screenshot_failure_removes_everything() {
    let app = setup_test_app_with(
        FakeToolchain {
            fail_screenshots: true,
            ..Default::default()
        },
        |_| {},
    )
    .await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(mp4_form())
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(str_field(&body, "code"), "SCREENSHOT_FAILED");
    assert!(listing(&app.uploads).is_empty());
}

#[tokio::test]
async fn test_corrupt_image_removes_upload() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(file_form(b"\x89PNG garbage".to_vec(), "broken.png", "image/png"))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(str_field(&body, "code"), "IMAGE_PROCESSING_ERROR");
    assert!(listing(&app.uploads).is_empty());
}

#[tokio::test]
async fn test_profile_picture_upload() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads/profile-picture"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(png_form(800, 800))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    let filename = str_field(&body, "filename");
    assert!(app.profile_pictures.join(filename).exists());
    assert_eq!(listing(&app.profile_pictures).len(), 2);
    assert!(listing(&app.uploads).is_empty());
}

#[tokio::test]
async fn test_profile_picture_rejects_video() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads/profile-picture"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(mp4_form())
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(listing(&app.profile_pictures).is_empty());
}

#[tokio::test]
async fn test_upload_rate_limit_per_user() {
    let app = setup_test_app_with(FakeToolchain::default(), |config| {
        config.base.upload_rate_limit = 2;
    })
    .await;

    for _ in 0..2 {
        let response = app
            .client()
            .post(&api_path("/uploads"))
            .add_header("Authorization", bearer("chef-7"))
            .multipart(png_form(10, 10))
            .await;
        assert_eq!(response.status_code(), 201);
    }

    let limited = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(png_form(10, 10))
        .await;
    assert_eq!(limited.status_code(), 429);
    assert!(limited.headers().get("retry-after").is_some());

    // Another user has their own budget
    let other = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("baker-3"))
        .multipart(png_form(10, 10))
        .await;
    assert_eq!(other.status_code(), 201);
}

#[tokio::test]
async fn test_stored_files_are_served() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("chef-7"))
        .multipart(png_form(40, 40))
        .await;
    let body: Value = response.json();
    let thumbnail = str_field(body.get("derivatives").expect("derivatives"), "thumbnail");

    let served = app
        .client()
        .get(&format!("/files/uploads/{}", thumbnail))
        .await;
    assert_eq!(served.status_code(), 200);
    assert!(!served.as_bytes().is_empty());
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/health")).await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(str_field(&body, "status"), "healthy");
    assert_eq!(str_field(&body, "uploads"), "healthy");
}

#[tokio::test]
async fn test_transient_files_are_not_served() {
    let app = setup_test_app().await;
    std::fs::write(app.uploads.join("abc_chef-7-palette.png"), b"palette").unwrap();
    std::fs::write(app.uploads.join("abc_chef-7-thumb-1.png.part"), b"half").unwrap();
    std::fs::write(app.uploads.join("abc_chef-7-thumb-2.png"), b"done").unwrap();

    for name in [
        "abc_chef-7-palette.png",
        "abc_chef-7-thumb-1.png.part",
        "abc_chef-7-thumb-1.png%2Epart",
    ] {
        let response = app
            .client()
            .get(&format!("/files/uploads/{}", name))
            .await;
        assert_eq!(response.status_code(), 404, "{}", name);
    }

    let finished = app
        .client()
        .get("/files/uploads/abc_chef-7-thumb-2.png")
        .await;
    assert_eq!(finished.status_code(), 200);
}
