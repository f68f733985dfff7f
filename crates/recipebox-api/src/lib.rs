//! Recipebox Media API Library
//!
//! HTTP surface of the media service: authenticated upload and delete routes,
//! static serving of both storage roots, and application setup.

// Module declarations
mod api_doc;
pub mod constants;
mod handlers;
mod middleware;
mod services;
pub mod setup;
mod telemetry;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
