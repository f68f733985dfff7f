pub mod delete;
pub mod health;
pub mod profile_picture;
pub mod upload;
