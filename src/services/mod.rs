//! Service layer for business logic
//!
//! This module contains service abstractions that separate filesystem logic
//! from HTTP handlers, making the code more modular and testable.

pub mod files;

pub use files::{file_format, FileStore, StoredFile};
