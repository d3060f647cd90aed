//! Spooled upload ingestion adapter

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::fs;

use arkiv_archive::{naming, Archive};
use arkiv_core::validation::{validate_file_extension, validate_file_size};
use arkiv_core::{ArchiveConfig, IngestError};

use crate::adapter::{FileDescriptor, FileSource, IngestAdapter};
use crate::adapters::parse_metadata;

/// Ingests uploads a frontend already spooled to temporary files, moving the
/// spool into the archive. The wire protocol (multipart parsing, body
/// limits) is the frontend's business; this adapter only sees the result.
///
/// Raw input: one `{"filename": ..., "tmp_path": ..., "metadata": {...}}`
/// object or an array of them. A zero-length spool is skipped silently
/// during transfer - browsers submit empty file fields for forms where the
/// user picked nothing.
pub struct UploadAdapter {
    archive: Arc<Archive>,
    config: Arc<ArchiveConfig>,
}

impl UploadAdapter {
    pub fn new(archive: Arc<Archive>, config: Arc<ArchiveConfig>) -> Self {
        UploadAdapter { archive, config }
    }

    fn spool<'a>(&self, descriptor: &'a FileDescriptor) -> Result<(&'a Path, &'a str), IngestError> {
        match &descriptor.source {
            FileSource::Spooled { tmp_path, filename } => Ok((tmp_path, filename)),
            _ => Err(IngestError::InvalidFile(
                "Descriptor was not produced by the upload adapter".to_string(),
            )),
        }
    }

    fn parse_upload(&self, value: &JsonValue) -> Result<FileDescriptor, IngestError> {
        let map = value.as_object().ok_or_else(|| {
            IngestError::Parse("Upload entries must be objects with 'filename' and 'tmp_path'".to_string())
        })?;

        let filename = map
            .get("filename")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                IngestError::Parse("Upload entry is missing a non-empty 'filename' field".to_string())
            })?;

        let tmp_path = map
            .get("tmp_path")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                IngestError::Parse("Upload entry is missing a non-empty 'tmp_path' field".to_string())
            })?;

        let descriptor = FileDescriptor::new(FileSource::Spooled {
            tmp_path: PathBuf::from(tmp_path),
            filename: filename.to_string(),
        });

        Ok(match map.get("metadata") {
            None | Some(JsonValue::Null) => descriptor,
            Some(raw) => descriptor.with_metadata(parse_metadata(raw)?),
        })
    }
}

#[async_trait]
impl IngestAdapter for UploadAdapter {
    fn name(&self) -> &'static str {
        "upload"
    }

    fn parse(&self, input: &JsonValue) -> Result<Vec<FileDescriptor>, IngestError> {
        match input {
            JsonValue::Array(items) => items.iter().map(|item| self.parse_upload(item)).collect(),
            other => Ok(vec![self.parse_upload(other)?]),
        }
    }

    async fn validate(&self, descriptor: &FileDescriptor) -> Result<(), IngestError> {
        let (tmp_path, filename) = self.spool(descriptor)?;

        let meta = fs::metadata(tmp_path).await.map_err(|_| {
            IngestError::InvalidFile(format!(
                "No spooled upload at {}",
                tmp_path.display()
            ))
        })?;

        if !meta.is_file() {
            return Err(IngestError::InvalidFile(format!(
                "Spool {} is not a regular file",
                tmp_path.display()
            )));
        }

        validate_file_size(meta.len(), self.config.max_file_size_bytes)?;
        validate_file_extension(filename, self.config.allowed_extensions.as_deref())?;

        Ok(())
    }

    fn original_filename(&self, descriptor: &FileDescriptor) -> String {
        match &descriptor.source {
            FileSource::Spooled { filename, .. } => Path::new(filename)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("file")
                .to_string(),
            _ => "file".to_string(),
        }
    }

    async fn transfer(
        &self,
        descriptor: &FileDescriptor,
        original_filename: &str,
    ) -> Result<Option<PathBuf>, IngestError> {
        let (tmp_path, _) = self.spool(descriptor)?;

        let size = fs::metadata(tmp_path)
            .await
            .map_err(|e| {
                IngestError::Transfer(format!(
                    "Spool {} disappeared before transfer: {}",
                    tmp_path.display(),
                    e
                ))
            })?
            .len();

        if size == 0 {
            tracing::debug!(spool = %tmp_path.display(), "Zero-length upload, skipping");
            return Ok(None);
        }

        let destination = naming::unique_destination(&self.archive, original_filename).await?;
        let path = self.archive.rename_in(tmp_path, &destination).await?;
        Ok(Some(path))
    }
}
