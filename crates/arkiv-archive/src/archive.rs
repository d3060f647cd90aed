//! Archive directory primitives
//!
//! All byte movement into and out of the archive goes through `Archive`, which
//! validates filenames against traversal and logs every mutation.

use std::path::{Path, PathBuf};
use std::pin::Pin;

use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

use arkiv_core::IngestError;

/// Archive operation errors
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Archive root not writable: {0}")]
    Unwritable(String),

    #[error("Invalid archive filename: {0}")]
    InvalidFilename(String),

    #[error("File not found in archive: {0}")]
    NotFound(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;

impl From<ArchiveError> for IngestError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::Unwritable(msg) => IngestError::ArchiveUnwritable(msg),
            other => IngestError::Transfer(other.to_string()),
        }
    }
}

/// Handle to the managed archive directory.
#[derive(Clone, Debug)]
pub struct Archive {
    root: PathBuf,
}

impl Archive {
    /// Open an existing archive directory.
    ///
    /// The root must already exist and be a directory; the pipeline never
    /// creates it.
    pub fn new(root: impl Into<PathBuf>) -> ArchiveResult<Self> {
        let root = root.into();

        let meta = std::fs::metadata(&root).map_err(|e| {
            ArchiveError::ConfigError(format!(
                "Archive root {} is not accessible: {}",
                root.display(),
                e
            ))
        })?;

        if !meta.is_dir() {
            return Err(ArchiveError::ConfigError(format!(
                "Archive root {} is not a directory",
                root.display()
            )));
        }

        Ok(Archive { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Probe whether the archive root is currently writable.
    ///
    /// Runs before every transfer, not once at startup - permissions and
    /// mounts can change between calls.
    pub fn ensure_writable(&self) -> ArchiveResult<()> {
        let meta = std::fs::metadata(&self.root).map_err(|e| {
            ArchiveError::Unwritable(format!(
                "Archive root {} is not accessible: {}",
                self.root.display(),
                e
            ))
        })?;

        if meta.permissions().readonly() {
            return Err(ArchiveError::Unwritable(format!(
                "Archive root {} is read-only",
                self.root.display()
            )));
        }

        Ok(())
    }

    /// Map an archive filename to its absolute path.
    ///
    /// Filenames are flat: no `..`, no path separators.
    pub fn path_of(&self, filename: &str) -> ArchiveResult<PathBuf> {
        if filename.is_empty()
            || filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
        {
            return Err(ArchiveError::InvalidFilename(format!(
                "Archive filename '{}' contains invalid characters",
                filename
            )));
        }

        Ok(self.root.join(filename))
    }

    /// Check if a file exists in the archive
    pub async fn exists(&self, filename: &str) -> ArchiveResult<bool> {
        let path = self.path_of(filename)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    /// Get the size in bytes of an archived file.
    pub async fn content_length(&self, filename: &str) -> ArchiveResult<u64> {
        let path = self.path_of(filename)?;
        let meta = fs::metadata(&path)
            .await
            .map_err(|_| ArchiveError::NotFound(filename.to_string()))?;
        Ok(meta.len())
    }

    /// Write a buffer into the archive under `filename`.
    pub async fn write(&self, filename: &str, data: &[u8]) -> ArchiveResult<PathBuf> {
        let path = self.path_of(filename)?;
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            ArchiveError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(data).await.map_err(|e| {
            ArchiveError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            ArchiveError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Archive write successful"
        );

        Ok(path)
    }

    /// Stream a reader into the archive under `filename`.
    /// Returns the written path and the number of bytes copied.
    pub async fn write_from_reader(
        &self,
        filename: &str,
        mut reader: Pin<Box<dyn AsyncRead + Send>>,
    ) -> ArchiveResult<(PathBuf, u64)> {
        let path = self.path_of(filename)?;
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            ArchiveError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let bytes_copied = tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
            ArchiveError::WriteFailed(format!(
                "Failed to write stream to file {}: {}",
                path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            ArchiveError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Archive stream write successful"
        );

        Ok((path, bytes_copied))
    }

    /// Copy a file from outside the archive into it.
    pub async fn copy_in(&self, source: &Path, filename: &str) -> ArchiveResult<PathBuf> {
        let path = self.path_of(filename)?;
        let start = std::time::Instant::now();

        let bytes_copied = fs::copy(source, &path).await.map_err(|e| {
            ArchiveError::WriteFailed(format!(
                "Failed to copy {} to {}: {}",
                source.display(),
                path.display(),
                e
            ))
        })?;

        tracing::info!(
            source = %source.display(),
            path = %path.display(),
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Archive copy successful"
        );

        Ok(path)
    }

    /// Move a file from outside the archive into it.
    ///
    /// Tries a rename first and falls back to copy-and-delete when the source
    /// lives on another filesystem.
    pub async fn rename_in(&self, source: &Path, filename: &str) -> ArchiveResult<PathBuf> {
        let path = self.path_of(filename)?;

        if fs::rename(source, &path).await.is_ok() {
            tracing::info!(
                source = %source.display(),
                path = %path.display(),
                "Archive rename successful"
            );
            return Ok(path);
        }

        let copied = self.copy_in(source, filename).await?;
        if let Err(e) = fs::remove_file(source).await {
            tracing::warn!(
                source = %source.display(),
                error = %e,
                "Failed to remove source after copy into archive"
            );
        }
        Ok(copied)
    }

    /// Delete a file from the archive. Deleting a missing file is not an error.
    pub async fn delete(&self, filename: &str) -> ArchiveResult<()> {
        let path = self.path_of(filename)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            ArchiveError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), "Archive delete successful");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn new_rejects_missing_root() {
        let result = Archive::new("/definitely/not/a/real/path");
        assert!(matches!(result, Err(ArchiveError::ConfigError(_))));
    }

    #[test]
    fn path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let archive = Archive::new(dir.path()).unwrap();

        assert!(matches!(
            archive.path_of("../etc/passwd"),
            Err(ArchiveError::InvalidFilename(_))
        ));
        assert!(matches!(
            archive.path_of("nested/file.txt"),
            Err(ArchiveError::InvalidFilename(_))
        ));
        assert!(matches!(
            archive.path_of(""),
            Err(ArchiveError::InvalidFilename(_))
        ));
    }

    #[tokio::test]
    async fn write_exists_delete_roundtrip() {
        let dir = tempdir().unwrap();
        let archive = Archive::new(dir.path()).unwrap();

        let path = archive.write("test.txt", b"test data").await.unwrap();
        assert!(path.ends_with("test.txt"));
        assert!(archive.exists("test.txt").await.unwrap());
        assert_eq!(archive.content_length("test.txt").await.unwrap(), 9);

        archive.delete("test.txt").await.unwrap();
        assert!(!archive.exists("test.txt").await.unwrap());
    }

    #[tokio::test]
    async fn delete_nonexistent_is_ok() {
        let dir = tempdir().unwrap();
        let archive = Archive::new(dir.path()).unwrap();

        assert!(archive.delete("nonexistent.txt").await.is_ok());
    }

    #[tokio::test]
    async fn copy_in_copies_bytes() {
        let dir = tempdir().unwrap();
        let source_dir = tempdir().unwrap();
        let archive = Archive::new(dir.path()).unwrap();

        let source = source_dir.path().join("original.txt");
        tokio::fs::write(&source, b"original content").await.unwrap();

        let path = archive.copy_in(&source, "copied.txt").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"original content");
        assert!(source.exists());
    }

    #[tokio::test]
    async fn rename_in_moves_source() {
        let dir = tempdir().unwrap();
        let source_dir = tempdir().unwrap();
        let archive = Archive::new(dir.path()).unwrap();

        let source = source_dir.path().join("spooled.bin");
        tokio::fs::write(&source, b"spooled bytes").await.unwrap();

        let path = archive.rename_in(&source, "moved.bin").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"spooled bytes");
        assert!(!source.exists());
    }

    #[tokio::test]
    async fn write_from_reader_streams_bytes() {
        let dir = tempdir().unwrap();
        let archive = Archive::new(dir.path()).unwrap();

        let cursor = std::io::Cursor::new(b"stream test data".to_vec());
        let reader = Box::pin(cursor) as Pin<Box<dyn AsyncRead + Send>>;

        let (path, written) = archive.write_from_reader("stream.txt", reader).await.unwrap();
        assert_eq!(written, 16);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"stream test data");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn readonly_root_is_unwritable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let archive = Archive::new(dir.path()).unwrap();

        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o555)).unwrap();
        let result = archive.ensure_writable();
        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(result, Err(ArchiveError::Unwritable(_))));
    }
}
