//! File store service
//!
//! Filesystem operations against the single flat storage directory. The
//! directory is the only source of truth; nothing is cached between calls.

use crate::error::AppError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;

/// A file held in the storage directory
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Entry name inside the storage directory
    pub filename: String,
    /// Segment after the last `.` of the name
    pub format: String,
    /// Size in bytes
    pub size: u64,
    /// Last modification date, `YYYY-MM-DD` in local time
    pub moddate: String,
}

/// Format of a file name: the segment after the last `.`
///
/// A name without any `.` is its own format.
pub fn file_format(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

fn format_date(modified: SystemTime) -> String {
    DateTime::<Local>::from(modified)
        .format("%Y-%m-%d")
        .to_string()
}

/// `moddate` for an entry, or the error that kept its timestamp unreadable
fn modification_date(
    modified: std::io::Result<SystemTime>,
    path: &Path,
) -> Result<String, AppError> {
    modified
        .map(format_date)
        .map_err(|e| AppError::DirectoryUnavailable(format!("{}: {}", path.display(), e)))
}

/// File store rooted at one directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store over `dir`; the directory is not touched until used
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the storage directory if it does not exist yet
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        if fs::metadata(&self.dir).await.is_err() {
            fs::create_dir_all(&self.dir).await?;
            tracing::info!(dir = %self.dir.display(), "Created storage directory");
        }
        Ok(())
    }

    /// Path of `name` inside the storage directory
    ///
    /// This is a plain join: the name is neither normalized nor checked
    /// for `..` components.
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// List every entry of the storage directory, sorted by name
    pub async fn list(&self) -> Result<Vec<StoredFile>, AppError> {
        let mut entries = fs::read_dir(&self.dir).await.map_err(|e| {
            AppError::DirectoryUnavailable(format!("{}: {}", self.dir.display(), e))
        })?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            AppError::DirectoryUnavailable(format!("{}: {}", self.dir.display(), e))
        })? {
            let metadata = entry.metadata().await.map_err(|e| {
                AppError::DirectoryUnavailable(format!("{}: {}", entry.path().display(), e))
            })?;

            let filename = entry.file_name().to_string_lossy().to_string();
            let moddate = modification_date(metadata.modified(), &entry.path())?;

            files.push(StoredFile {
                format: file_format(&filename).to_string(),
                filename,
                size: metadata.len(),
                moddate,
            });
        }

        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(files)
    }

    /// Read the full contents of `name`
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, AppError> {
        let path = self.resolve(name);
        fs::read(&path)
            .await
            .map_err(|e| AppError::FileNotFound(format!("{}: {}", name, e)))
    }

    /// Write `data` as `name`, silently replacing any existing file
    pub async fn write(&self, name: &str, data: &[u8]) -> Result<(), AppError> {
        let path = self.resolve(name);
        fs::write(&path, data)
            .await
            .map_err(|e| AppError::WriteFailure(format!("{}: {}", name, e)))
    }

    /// Remove `name` after checking it can be opened
    pub async fn remove(&self, name: &str) -> Result<(), AppError> {
        let path = self.resolve(name);

        // Existence check only; the handle is dropped at the end of the block.
        {
            let _file = fs::File::open(&path)
                .await
                .map_err(|e| AppError::FileNotFound(format!("{}: {}", name, e)))?;
        }

        fs::remove_file(&path)
            .await
            .map_err(|e| AppError::RemovalFailure(format!("{}: {}", name, e)))
    }
}
