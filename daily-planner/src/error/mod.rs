//! Upload server errors
//!
//! Every error is answered with a JSON body `{"error": "<message>"}`. Client
//! errors carry a descriptive message; server failures carry a generic one
//! and are logged with their cause.

use axum::{
    http::{header::CONTENT_RANGE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::storage::StorageError;

/// Errors raised by the upload server handlers
#[derive(Debug, Error)]
pub enum ServerError {
    /// Request carried no file under the expected field
    #[error("No file uploaded")]
    NoFile,

    /// More than one file part under the expected field
    #[error("Only one file may be uploaded")]
    MultipleFiles,

    /// A file part under an unknown field name
    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    /// Multipart body could not be read
    #[error("{message}")]
    Multipart {
        /// Status reported by the multipart parser (400 or 413)
        status: StatusCode,
        /// Parser message
        message: String,
    },

    /// Requested file name is not a plain file name
    #[error("Invalid file name")]
    InvalidPath(String),

    /// Requested file does not exist
    #[error("File not found")]
    NotFound(String),

    /// Requested byte range lies outside the file
    #[error("Range not satisfiable")]
    RangeNotSatisfiable(usize),

    /// The cloud host rejected or failed the upload
    #[error("Cloud upload failed")]
    CloudUpload(#[source] StorageError),

    /// Any other failure
    #[error("Server error")]
    Internal(#[source] StorageError),
}

impl ServerError {
    /// HTTP status for this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NoFile | Self::MultipleFiles | Self::UnexpectedField(_) | Self::InvalidPath(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Multipart { status, .. } => *status,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RangeNotSatisfiable(_) => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::CloudUpload(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ServerError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        Self::Multipart {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::CloudUpload(source) | Self::Internal(source) => {
                error!(error = %source, "Upload failed");
            }
            other => warn!(status = status.as_u16(), error = %other, "Request rejected"),
        }
        let body = Json(json!({ "error": self.to_string() }));
        if let Self::RangeNotSatisfiable(size) = self {
            return (status, [(CONTENT_RANGE, format!("bytes */{size}"))], body).into_response();
        }
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn body(error: ServerError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_no_file_body() {
        let (status, json) = body(ServerError::NoFile).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({"error": "No file uploaded"}));
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let (status, json) = body(ServerError::Internal(StorageError::Other("disk full".into()))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({"error": "Server error"}));

        let (_, json) = body(ServerError::CloudUpload(StorageError::Remote {
            status: 401,
            message: "Invalid Signature".into(),
        }))
        .await;
        assert_eq!(json, json!({"error": "Cloud upload failed"}));
    }

    #[tokio::test]
    async fn test_range_not_satisfiable_reports_size() {
        let response = ServerError::RangeNotSatisfiable(1234).into_response();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes */1234");
    }

    #[tokio::test]
    async fn test_unexpected_field() {
        let (status, json) = body(ServerError::UnexpectedField("avatar".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({"error": "Unexpected field: avatar"}));
    }
}
