//! Local disk storage
//!
//! Images land directly in the upload directory as `{unix_millis}{.ext}`
//! and are served back under `/uploads/{filename}`.

use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use super::types::{HostedImage, StorageError, StorageResult, UploadedFile};
use super::ImageHost;

/// Route prefix stored files are served under
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Local filesystem image host
#[derive(Debug, Clone)]
pub struct DiskImageHost {
    dir: PathBuf,
    public_base_url: String,
}

impl DiskImageHost {
    /// Creates a disk host storing into `dir`
    ///
    /// `public_base_url` is the externally reachable server URL links are
    /// built from.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` exists but is not a directory
    pub fn new(dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> StorageResult<Self> {
        let dir = dir.into();
        if dir.exists() && !dir.is_dir() {
            return Err(StorageError::InvalidPath(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        Ok(Self {
            dir,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Upload directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Public URL of a stored file
    #[must_use]
    pub fn url_for(&self, filename: &str) -> String {
        format!("{}{UPLOADS_ROUTE}/{filename}", self.public_base_url)
    }

    /// Path of a stored file
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` for names that are empty, hidden
    /// or contain path components
    pub fn resolve(&self, filename: &str) -> StorageResult<PathBuf> {
        resolve_in(&self.dir, filename)
    }
}

/// Path of `filename` inside `dir`, rejecting anything but a plain name
///
/// # Errors
///
/// Returns `StorageError::InvalidPath` for names that are empty, hidden or
/// contain path components
pub fn resolve_in(dir: &Path, filename: &str) -> StorageResult<PathBuf> {
    let mut components = Path::new(filename).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !plain || filename.starts_with('.') || filename.contains(['/', '\\']) {
        return Err(StorageError::InvalidPath(filename.to_string()));
    }
    Ok(dir.join(filename))
}

/// Write `data` through a freshly created file, deleting it on failure
///
/// A partially written upload is never left behind to be served.
async fn write_or_remove<W>(mut handle: W, path: &Path, data: &[u8]) -> StorageResult<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        handle.write_all(data).await?;
        handle.flush().await
    }
    .await;
    drop(handle);

    if let Err(e) = written {
        if let Err(remove) = fs::remove_file(path).await {
            warn!(path = %path.display(), error = %remove, "Failed to remove partial upload");
        }
        return Err(e.into());
    }
    Ok(())
}

#[async_trait]
impl ImageHost for DiskImageHost {
    async fn store(&self, file: UploadedFile) -> StorageResult<HostedImage> {
        fs::create_dir_all(&self.dir).await?;

        let ext = file
            .storage_extension()
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let mut stamp = Utc::now().timestamp_millis();
        let (filename, handle) = loop {
            let filename = format!("{stamp}{ext}");
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(&filename))
                .await
            {
                Ok(handle) => break (filename, handle),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => stamp += 1,
                Err(e) => return Err(e.into()),
            }
        };

        write_or_remove(handle, &self.dir.join(&filename), &file.data).await?;
        debug!(filename = %filename, size = file.size(), "Stored upload on disk");

        Ok(HostedImage {
            url: self.url_for(&filename),
            content_type: mime_guess::from_path(&filename)
                .first()
                .map_or_else(|| file.detected_content_type(), |m| m.to_string()),
            size: file.size(),
            key: filename,
        })
    }

    fn name(&self) -> &'static str {
        "disk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::TempDir;

    fn host(dir: &TempDir) -> DiskImageHost {
        DiskImageHost::new(dir.path().join("uploads"), "http://localhost:3000/").unwrap()
    }

    fn png(name: &str) -> UploadedFile {
        UploadedFile::new(Some(name.to_string()), Some("image/png".into()), b"\x89PNG data".to_vec())
    }

    #[tokio::test]
    async fn test_store_writes_timestamped_file() {
        let temp = TempDir::new().unwrap();
        let host = host(&temp);

        let hosted = host.store(png("planner.png")).await.unwrap();

        let (stem, ext) = hosted.key.split_once('.').unwrap();
        assert!(stem.parse::<i64>().is_ok());
        assert_eq!(ext, "png");
        assert_eq!(hosted.url, format!("http://localhost:3000/uploads/{}", hosted.key));
        assert_eq!(hosted.content_type, "image/png");
        assert_eq!(hosted.size, 9);

        let written = std::fs::read(host.dir().join(&hosted.key)).unwrap();
        assert_eq!(written, b"\x89PNG data");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_stores_get_unique_names() {
        let temp = TempDir::new().unwrap();
        let host = host(&temp);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let host = host.clone();
                tokio::spawn(async move { host.store(png("planner.png")).await })
            })
            .collect();

        let mut names = HashSet::new();
        for handle in handles {
            names.insert(handle.await.unwrap().unwrap().key);
        }
        assert_eq!(names.len(), 8);
        assert_eq!(std::fs::read_dir(host.dir()).unwrap().count(), 8);
    }

    #[tokio::test]
    async fn test_name_without_extension() {
        let temp = TempDir::new().unwrap();
        let hosted = host(&temp)
            .store(UploadedFile::new(Some("notes".into()), None, b"text".to_vec()))
            .await
            .unwrap();
        assert!(!hosted.key.contains('.'));
        assert_eq!(hosted.content_type, "application/octet-stream");
    }

    #[test]
    fn test_rejects_non_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            DiskImageHost::new(file, "http://localhost"),
            Err(StorageError::InvalidPath(_))
        ));
    }

    struct FullDisk;

    impl AsyncWrite for FullDisk {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Err(std::io::Error::other("no space left on device")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_failed_write_removes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("1700000000000.png");
        std::fs::write(&path, b"").unwrap();

        let result = write_or_remove(FullDisk, &path, b"\x89PNG data").await;

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_successful_write_keeps_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("1700000000000.png");
        let handle = fs::File::create(&path).await.unwrap();

        write_or_remove(handle, &path, b"\x89PNG data").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG data");
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = Path::new("/srv/uploads");
        assert_eq!(resolve_in(dir, "1700000000000.png").unwrap(), dir.join("1700000000000.png"));
        for bad in ["", "..", "../secret", "a/b.png", "a\\b.png", ".env", "/etc/passwd"] {
            assert!(resolve_in(dir, bad).is_err(), "{bad:?} accepted");
        }
    }
}
