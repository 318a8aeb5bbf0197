//! Cloudinary image hosting
//!
//! Uploads are signed with the account secret: the request parameters are
//! sorted, joined as `key=value&...`, suffixed with the secret and hashed
//! with SHA-256.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use super::types::{HostedImage, StorageError, StorageResult, UploadedFile};
use super::ImageHost;
use crate::config::CloudinarySettings;

/// Format every upload is converted to
pub const UPLOAD_FORMAT: &str = "png";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    #[serde(default)]
    bytes: Option<u64>,
    #[serde(default)]
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Signature of a set of upload parameters
#[must_use]
pub fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let joined = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    hex::encode(Sha256::digest(format!("{joined}{api_secret}").as_bytes()))
}

/// Cloudinary image host
#[derive(Debug, Clone)]
pub struct CloudinaryHost {
    client: reqwest::Client,
    settings: CloudinarySettings,
}

impl CloudinaryHost {
    /// Create a host for an account
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Other` if the cloud name, key or secret is
    /// missing
    pub fn new(client: reqwest::Client, settings: CloudinarySettings) -> StorageResult<Self> {
        let missing: Vec<&str> = [
            ("cloud_name", &settings.cloud_name),
            ("api_key", &settings.api_key),
            ("api_secret", &settings.api_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(StorageError::Other(format!(
                "missing Cloudinary settings: {}",
                missing.join(", ")
            )));
        }

        Ok(Self { client, settings })
    }

    /// Create a host with its own HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if settings are missing or the client cannot be built
    pub fn from_settings(settings: &CloudinarySettings, timeout: Option<Duration>) -> StorageResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self::new(builder.build()?, settings.clone())
    }

    /// Upload API URL
    #[must_use]
    pub fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.cloud_name
        )
    }

    /// Signed parameters for an upload at `timestamp`
    fn signed_params(&self, timestamp: i64) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("folder", self.settings.folder.clone());
        params.insert("format", UPLOAD_FORMAT.to_string());
        params.insert("timestamp", timestamp.to_string());
        let signature = sign(&params, &self.settings.api_secret);
        params.insert("api_key", self.settings.api_key.clone());
        params.insert("signature", signature);
        params.insert("signature_algorithm", "sha256".to_string());
        params
    }
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn store(&self, file: UploadedFile) -> StorageResult<HostedImage> {
        let size = file.size();
        let content_type = file.detected_content_type();
        let mut part = Part::bytes(file.data.to_vec()).mime_str(&content_type)?;
        if let Some(filename) = file.filename {
            part = part.file_name(filename);
        }

        let form = self
            .signed_params(Utc::now().timestamp())
            .into_iter()
            .fold(Form::new().part("file", part), |form, (key, value)| form.text(key, value));

        let response = self.client.post(self.upload_url()).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(StorageError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response.json().await?;
        debug!(public_id = %body.public_id, "Stored upload on Cloudinary");

        Ok(HostedImage {
            url: body.secure_url,
            key: body.public_id,
            content_type: body
                .format
                .and_then(|f| mime_guess::from_ext(&f).first())
                .map_or(content_type, |m| m.to_string()),
            size: body.bytes.unwrap_or(size),
        })
    }

    fn name(&self) -> &'static str {
        "cloudinary"
    }
}
