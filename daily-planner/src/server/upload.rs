//! `POST /upload`

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::export::UPLOAD_FIELD;
use crate::state::AppState;
use crate::storage::{StorageError, UploadedFile};

/// Successful upload response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Public URL of the stored image
    pub url: String,
}

/// Read the single file part of an upload
///
/// Text parts are ignored. File parts under other names are rejected.
async fn read_file(mut multipart: Multipart) -> Result<UploadedFile, ServerError> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let Some(filename) = field.file_name().map(str::to_string) else {
            debug!(field = %name, "Ignoring text field");
            continue;
        };

        if name != UPLOAD_FIELD {
            return Err(ServerError::UnexpectedField(name));
        }
        if file.is_some() {
            return Err(ServerError::MultipleFiles);
        }

        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;
        file = Some(UploadedFile::new(Some(filename), content_type, data));
    }
    file.ok_or(ServerError::NoFile)
}

/// Store one uploaded image and return its URL
///
/// # Errors
///
/// - 400 `No file uploaded` without a `planner` file part (including
///   bodies that are not multipart at all)
/// - 400 for file parts under other names or a second `planner` part
/// - 500 `Cloud upload failed` when the cloud host fails
/// - 500 `Server error` for any other storage failure
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ServerError> {
    let multipart = multipart.map_err(|_| ServerError::NoFile)?;
    let file = read_file(multipart).await?;

    let size = file.size();
    let hosted = state.host().store(file).await.map_err(|e| match e {
        StorageError::Http(_) | StorageError::Remote { .. } => ServerError::CloudUpload(e),
        other => ServerError::Internal(other),
    })?;

    info!(
        backend = state.host().name(),
        key = %hosted.key,
        size,
        "Image uploaded"
    );
    Ok(Json(UploadResponse { url: hosted.url }))
}
