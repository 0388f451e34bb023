// Application state
// Immutable after construction; cloned into each request

use crate::config::Config;
use crate::services::files::FileStore;
use std::sync::Arc;

/// Shared application state
///
/// There is no mutable in-process state: the storage directory is the only
/// shared resource, so concurrent requests only meet at the filesystem.
#[derive(Debug, Clone)]
pub struct AppState {
    /// File store over the configured storage directory
    pub files: Arc<FileStore>,
    /// Multipart field expected to carry uploads
    pub field_name: Arc<str>,
}

impl AppState {
    /// Create state from explicit parts
    pub fn new(files: FileStore, field_name: impl Into<Arc<str>>) -> Self {
        Self {
            files: Arc::new(files),
            field_name: field_name.into(),
        }
    }

    /// Create state from application configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            FileStore::new(config.storage.dir.clone()),
            config.storage.field_name.as_str(),
        )
    }
}
