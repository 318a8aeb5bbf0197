//! Core types for image storage

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while storing images
#[derive(Debug, Error)]
pub enum StorageError {
    /// File not found in storage
    #[error("File not found: {0}")]
    NotFound(String),

    /// I/O error during storage operation
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid file name or path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Request to the remote host failed
    #[error("Remote host request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote host rejected the upload
    #[error("Remote host returned status {status}: {message}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Error message reported by the host
        message: String,
    },

    /// Generic storage error
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A file received by the upload endpoint but not yet stored
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original file name from the upload, if the client sent one
    pub filename: Option<String>,

    /// MIME content type declared by the client
    pub content_type: Option<String>,

    /// File data
    pub data: Bytes,
}

impl UploadedFile {
    /// Creates a new uploaded file
    #[must_use]
    pub fn new(filename: Option<String>, content_type: Option<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename,
            content_type,
            data: data.into(),
        }
    }

    /// Returns the size of the file in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Extension of the original file name, without the dot
    ///
    /// Returns `None` if there is no file name or it has no extension.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let name = self.filename.as_deref()?;
        let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }

    /// Extension for the stored copy
    ///
    /// Prefers the original file name, then sniffs the content. Only ASCII
    /// alphanumeric extensions are kept.
    #[must_use]
    pub fn storage_extension(&self) -> Option<String> {
        self.extension()
            .map(str::to_ascii_lowercase)
            .or_else(|| infer::get(&self.data).map(|kind| kind.extension().to_string()))
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
    }

    /// Content type detected from magic bytes, falling back to the
    /// declared one
    #[must_use]
    pub fn detected_content_type(&self) -> String {
        infer::get(&self.data).map_or_else(
            || {
                self.content_type
                    .clone()
                    .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string())
            },
            |kind| kind.mime_type().to_string(),
        )
    }
}

/// Metadata about a hosted image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedImage {
    /// Public URL of the image
    pub url: String,

    /// Backend key (file name on disk, public id on the cloud host)
    pub key: String,

    /// MIME content type
    pub content_type: String,

    /// Size in bytes
    pub size: u64,
}
