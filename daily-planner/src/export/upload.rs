//! Upload of exported images to the hosting endpoint

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;

use crate::config::ClientSettings;
use crate::render::ExportArtifact;

/// Multipart field carrying the planner image
pub const UPLOAD_FIELD: &str = "planner";

/// Errors raised while uploading an image
#[derive(Debug, Error)]
pub enum UploadError {
    /// Request could not be completed
    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with an error status
    #[error("upload endpoint returned status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message reported by the endpoint
        message: String,
    },

    /// Success response without a usable URL
    #[error("malformed upload response: {0}")]
    Malformed(String),
}

/// Sends exported images to a host and returns their public URL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload an image
    ///
    /// # Errors
    ///
    /// Returns `UploadError` if the image could not be hosted
    async fn upload(&self, artifact: &ExportArtifact) -> Result<String, UploadError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: Option<String>,
    error: Option<String>,
}

/// Uploads through `POST` multipart to the planner upload endpoint
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpUploader {
    /// Create an uploader for an endpoint
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Create an uploader from client configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, UploadError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(builder.build()?, &settings.upload_endpoint))
    }

    /// Endpoint images are posted to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(&self, artifact: &ExportArtifact) -> Result<String, UploadError> {
        let part = Part::bytes(artifact.png.to_vec())
            .file_name(artifact.file_name())
            .mime_str(artifact.content_type())?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body: Option<UploadResponse> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let message = body.and_then(|b| b.error).unwrap_or(text);
            return Err(UploadError::Status {
                status: status.as_u16(),
                message,
            });
        }

        body.and_then(|b| b.url)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| UploadError::Malformed(text))
    }
}
