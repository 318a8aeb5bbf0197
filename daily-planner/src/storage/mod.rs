//! Image storage for the upload endpoint
//!
//! Uploaded images go to one [`ImageHost`]: the local disk (served back by
//! the upload server itself) or Cloudinary.

mod cloudinary;
mod disk;
mod types;

pub use cloudinary::{sign, CloudinaryHost};
pub use disk::{resolve_in, DiskImageHost, UPLOADS_ROUTE};
pub use types::{HostedImage, StorageError, StorageResult, UploadedFile};

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{PlannerConfig, UploadBackend};

/// Abstraction for image hosting backends
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Store an uploaded image and return where it can be fetched
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot persist the file
    async fn store(&self, file: UploadedFile) -> StorageResult<HostedImage>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// The configured host and, for the disk backend, the directory to serve
pub struct ConfiguredHost {
    /// Image host
    pub host: Arc<dyn ImageHost>,
    /// Directory served under `/uploads`
    pub served_dir: Option<std::path::PathBuf>,
}

/// Build the image host selected in configuration
///
/// # Errors
///
/// Returns an error if the selected backend is misconfigured
pub fn host_from_config(config: &PlannerConfig) -> StorageResult<ConfiguredHost> {
    match config.upload.backend {
        UploadBackend::Disk => {
            let host = DiskImageHost::new(&config.upload.dir, config.server.public_base_url())?;
            Ok(ConfiguredHost {
                served_dir: Some(host.dir().to_path_buf()),
                host: Arc::new(host),
            })
        }
        UploadBackend::Cloudinary => Ok(ConfiguredHost {
            host: Arc::new(CloudinaryHost::from_settings(
                &config.upload.cloudinary,
                config.client.request_timeout(),
            )?),
            served_dir: None,
        }),
    }
}
