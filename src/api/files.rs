//! File store API handlers
//!
//! The four `/files` endpoints. Each one is a single call into
//! [`FileStore`](crate::services::files::FileStore) plus response shaping.

use crate::error::AppError;
use crate::services::files::StoredFile;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Json, Response},
};
use tracing::info;

/// GET /files - List every stored file
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<StoredFile>>, AppError> {
    let files = state.files.list().await?;
    Ok(Json(files))
}

/// GET /files/:fileName - Download a stored file as an attachment
pub async fn download_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, AppError> {
    let data = state.files.read(&file_name).await?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, attachment_disposition(&file_name)),
        ],
        data,
    )
        .into_response())
}

/// `Content-Disposition` for `file_name`, without the filename when the
/// name cannot be carried in a header value
fn attachment_disposition(file_name: &str) -> HeaderValue {
    let value = format!(
        "attachment; filename=\"{}\"",
        file_name.replace('"', "\\\"")
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// POST /files - Store the file carried by the configured multipart field
///
/// Fields with other names are skipped. The client filename is used as-is
/// and an existing file with the same name is overwritten.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<String, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::FieldMissing(e.to_string()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::FieldMissing(e.to_string()))?
    {
        if field.name() != Some(&*state.field_name) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string).ok_or_else(|| {
            AppError::FieldMissing(format!(
                "field \"{}\" does not carry a file",
                state.field_name
            ))
        })?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::FieldMissing(e.to_string()))?;

        state.files.write(&file_name, &data).await?;
        info!(file = %file_name, bytes = data.len(), "Stored uploaded file");

        return Ok(format!("{} uploaded successfully!", file_name));
    }

    Err(AppError::FieldMissing(format!(
        "no multipart field named \"{}\"",
        state.field_name
    )))
}

/// DELETE /files/:fileName - Remove a stored file
pub async fn delete_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<String, AppError> {
    state.files.remove(&file_name).await?;
    info!(file = %file_name, "Deleted file");

    Ok(format!("{} deleted successfully!", file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::files::FileStore;
    use tempfile::tempdir;

    fn create_test_state(dir: &std::path::Path) -> AppState {
        AppState::new(FileStore::new(dir), "file")
    }

    #[tokio::test]
    async fn test_list_files_handler() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        std::fs::write(temp_dir.path().join("one.txt"), "1").unwrap();
        std::fs::write(temp_dir.path().join("two.json"), "{}").unwrap();

        let Json(files) = list_files(State(create_test_state(temp_dir.path())))
            .await
            .expect("Should list files");
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].format, "json");
    }

    #[tokio::test]
    async fn test_list_files_handler_missing_dir() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let state = create_test_state(&temp_dir.path().join("absent"));

        match list_files(State(state)).await {
            Err(AppError::DirectoryUnavailable(_)) => {}
            other => panic!("Expected DirectoryUnavailable error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_download_sets_attachment_headers() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        std::fs::write(temp_dir.path().join("report.pdf"), b"%PDF").unwrap();

        let response = download_file(
            State(create_test_state(temp_dir.path())),
            Path("report.pdf".to_string()),
        )
        .await
        .expect("Should download file");

        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert_eq!(disposition, "attachment; filename=\"report.pdf\"");
    }

    #[test]
    fn test_attachment_disposition_escapes_quotes() {
        assert_eq!(
            attachment_disposition("say \"hi\".txt"),
            "attachment; filename=\"say \\\"hi\\\".txt\""
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_name_with_control_character() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        std::fs::write(temp_dir.path().join("a\nb"), b"multi").unwrap();

        let response = download_file(
            State(create_test_state(temp_dir.path())),
            Path("a\nb".to_string()),
        )
        .await
        .expect("Should download file");

        assert_eq!(response.status(), axum::http::StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment"
        );
    }

    #[tokio::test]
    async fn test_download_missing_file() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let result = download_file(
            State(create_test_state(temp_dir.path())),
            Path("missing.txt".to_string()),
        )
        .await;

        match result {
            Err(AppError::FileNotFound(_)) => {}
            other => panic!("Expected FileNotFound error, got: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_delete_file_handler() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        std::fs::write(temp_dir.path().join("old.log"), "x").unwrap();

        let message = delete_file(
            State(create_test_state(temp_dir.path())),
            Path("old.log".to_string()),
        )
        .await
        .expect("Should delete file");

        assert_eq!(message, "old.log deleted successfully!");
        assert!(!temp_dir.path().join("old.log").exists());
    }

    #[tokio::test]
    async fn test_delete_missing_file() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let result = delete_file(
            State(create_test_state(temp_dir.path())),
            Path("missing.txt".to_string()),
        )
        .await;

        match result {
            Err(AppError::FileNotFound(_)) => {}
            other => panic!("Expected FileNotFound error, got: {:?}", other),
        }
    }
}
