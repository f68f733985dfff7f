//! Delete endpoint integration tests.
//!
//! Run from workspace root: `cargo test -p recipebox-api --test delete_test`.

mod helpers;

use axum_test::multipart::MultipartForm;
use helpers::auth::{admin_bearer, bearer};
use helpers::fixtures::{mp4_form, png_form};
use helpers::{api_path, listing, setup_test_app, TestApp};
use serde_json::Value;

async fn upload(app: &TestApp, path: &str, user_id: &str, form: MultipartForm) -> String {
    let response = app
        .client()
        .post(&api_path(path))
        .add_header("Authorization", bearer(user_id))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    body.get("filename")
        .and_then(|v| v.as_str())
        .expect("Expected 'filename' in upload response")
        .to_string()
}

#[tokio::test]
async fn test_owner_deletes_image_and_thumbnail() {
    let app = setup_test_app().await;
    let filename = upload(&app, "/uploads", "chef-7", png_form(64, 64)).await;
    assert_eq!(listing(&app.uploads).len(), 2);

    let response = app
        .client()
        .delete(&api_path(&format!("/uploads/{}", filename)))
        .add_header("Authorization", bearer("chef-7"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body.get("filename").and_then(|v| v.as_str()), Some(filename.as_str()));
    assert_eq!(body.get("removed").and_then(|v| v.as_u64()), Some(2));
    assert!(listing(&app.uploads).is_empty());
}

#[tokio::test]
async fn test_owner_deletes_video_and_all_derivatives() {
    let app = setup_test_app().await;
    let filename = upload(&app, "/uploads", "chef-7", mp4_form()).await;

    let response = app
        .client()
        .delete(&api_path(&format!("/uploads/{}", filename)))
        .add_header("Authorization", bearer("chef-7"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body.get("removed").and_then(|v| v.as_u64()), Some(5));
    assert!(listing(&app.uploads).is_empty());
}

#[tokio::test]
async fn test_other_user_cannot_delete() {
    let app = setup_test_app().await;
    let filename = upload(&app, "/uploads", "chef-7", png_form(64, 64)).await;

    let response = app
        .client()
        .delete(&api_path(&format!("/uploads/{}", filename)))
        .add_header("Authorization", bearer("baker-3"))
        .await;

    assert_eq!(response.status_code(), 403);
    let body: Value = response.json();
    assert_eq!(body.get("code").and_then(|v| v.as_str()), Some("UNAUTHORIZED"));
    assert_eq!(listing(&app.uploads).len(), 2);
}

#[tokio::test]
async fn test_admin_can_delete_any_upload() {
    let app = setup_test_app().await;
    let filename = upload(&app, "/uploads", "chef-7", png_form(64, 64)).await;

    let response = app
        .client()
        .delete(&api_path(&format!("/uploads/{}", filename)))
        .add_header("Authorization", admin_bearer("moderator-1"))
        .await;

    assert_eq!(response.status_code(), 200);
    assert!(listing(&app.uploads).is_empty());
}

#[tokio::test]
async fn test_delete_missing_file() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .delete(&api_path(
            "/uploads/0123456789abcdef0123456789abcdef_chef-7.png",
        ))
        .add_header("Authorization", bearer("chef-7"))
        .await;

    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body.get("code").and_then(|v| v.as_str()), Some("NOT_FOUND"));
}

#[tokio::test]
async fn test_admin_delete_missing_file() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .delete(&api_path(
            "/uploads/0123456789abcdef0123456789abcdef_chef-7.png",
        ))
        .add_header("Authorization", admin_bearer("moderator-1"))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_delete_derivative_name_rejected() {
    let app = setup_test_app().await;
    let filename = upload(&app, "/uploads", "chef-7", png_form(64, 64)).await;
    let thumbnail = filename.replace(".png", "-thumb.png");

    let response = app
        .client()
        .delete(&api_path(&format!("/uploads/{}", thumbnail)))
        .add_header("Authorization", bearer("chef-7"))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(listing(&app.uploads).len(), 2);
}

#[tokio::test]
async fn test_delete_name_without_extension_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .delete(&api_path("/uploads/0123456789abcdef_chef-7"))
        .add_header("Authorization", bearer("chef-7"))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_delete_requires_token() {
    let app = setup_test_app().await;
    let filename = upload(&app, "/uploads", "chef-7", png_form(64, 64)).await;

    let response = app
        .client()
        .delete(&api_path(&format!("/uploads/{}", filename)))
        .await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(listing(&app.uploads).len(), 2);
}

#[tokio::test]
async fn test_delete_leaves_other_uploads() {
    let app = setup_test_app().await;
    let first = upload(&app, "/uploads", "chef-7", png_form(64, 64)).await;
    let second = upload(&app, "/uploads", "chef-7", png_form(32, 32)).await;

    let response = app
        .client()
        .delete(&api_path(&format!("/uploads/{}", first)))
        .add_header("Authorization", bearer("chef-7"))
        .await;

    assert_eq!(response.status_code(), 200);
    let remaining = listing(&app.uploads);
    assert_eq!(remaining.len(), 2);
    assert!(remaining.contains(&second));
}

#[tokio::test]
async fn test_profile_picture_delete() {
    let app = setup_test_app().await;
    let filename = upload(&app, "/uploads/profile-picture", "chef-7", png_form(400, 400)).await;

    // Not in the general upload area
    let wrong_area = app
        .client()
        .delete(&api_path(&format!("/uploads/{}", filename)))
        .add_header("Authorization", bearer("chef-7"))
        .await;
    assert_eq!(wrong_area.status_code(), 404);

    let response = app
        .client()
        .delete(&api_path(&format!("/uploads/profile-picture/{}", filename)))
        .add_header("Authorization", bearer("chef-7"))
        .await;

    assert_eq!(response.status_code(), 200);
    assert!(listing(&app.profile_pictures).is_empty());
}

#[tokio::test]
async fn test_owner_id_with_derivative_suffix_cannot_upload() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("Authorization", bearer("sous-thumb"))
        .multipart(png_form(64, 64))
        .await;

    // Refused up front instead of storing a file nobody could delete
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body.get("code").and_then(|v| v.as_str()), Some("INVALID_INPUT"));
    assert!(listing(&app.uploads).is_empty());
}

#[tokio::test]
async fn test_suffixed_owner_cannot_delete_anothers_thumbnail() {
    let app = setup_test_app().await;
    let filename = upload(&app, "/uploads", "sous", png_form(64, 64)).await;
    let thumbnail = filename.replace(".png", "-thumb.png");
    assert!(thumbnail.ends_with("_sous-thumb.png"));

    let response = app
        .client()
        .delete(&api_path(&format!("/uploads/{}", thumbnail)))
        .add_header("Authorization", bearer("sous-thumb"))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(listing(&app.uploads).len(), 2);

    let owner = app
        .client()
        .delete(&api_path(&format!("/uploads/{}", filename)))
        .add_header("Authorization", bearer("sous"))
        .await;
    assert_eq!(owner.status_code(), 200);
    assert!(listing(&app.uploads).is_empty());
}
