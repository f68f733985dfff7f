//! Image derivatives

pub mod thumbnail;

pub use thumbnail::{fit_within, ImageThumbnailer};
