//! Recipebox Storage Library
//!
//! Local filesystem storage for uploaded media. Each `StorageArea` gets its own
//! `LocalStorage` rooted at an injected directory; files are addressed by their
//! bare stored filename and never by a path.

pub mod error;
pub mod local;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use local::{CascadeReport, LocalStorage};
