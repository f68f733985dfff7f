use axum_test::multipart::{MultipartForm, Part};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([180, 120, 60, 255]),
    ));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}

/// Single-file form under the `file` field.
pub fn file_form(bytes: Vec<u8>, file_name: &str, mime_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(bytes).file_name(file_name).mime_type(mime_type),
    )
}

pub fn png_form(width: u32, height: u32) -> MultipartForm {
    file_form(png_bytes(width, height), "dinner.png", "image/png")
}

pub fn mp4_form() -> MultipartForm {
    file_form(b"\x00\x00\x00\x18ftypmp42 fake video".to_vec(), "steps.mp4", "video/mp4")
}
