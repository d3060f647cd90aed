//! Local filesystem ingestion adapter

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::fs;

use arkiv_archive::{naming, Archive};
use arkiv_core::validation::{validate_file_extension, validate_file_size};
use arkiv_core::{ArchiveConfig, IngestError};

use crate::adapter::{FileDescriptor, FileSource, IngestAdapter};
use crate::adapters::parse_entries;

/// Ingests files already present on the local filesystem by copying them
/// into the archive. The source files are left untouched.
///
/// Raw input: one path string, an array of path strings, or an array of
/// `{"path": ..., "metadata": {...}}` objects. A bare string is always a
/// single path; paths may contain spaces.
pub struct LocalPathAdapter {
    archive: Arc<Archive>,
    config: Arc<ArchiveConfig>,
}

impl LocalPathAdapter {
    pub fn new(archive: Arc<Archive>, config: Arc<ArchiveConfig>) -> Self {
        LocalPathAdapter { archive, config }
    }

    fn source_path<'a>(&self, descriptor: &'a FileDescriptor) -> Result<&'a Path, IngestError> {
        match &descriptor.source {
            FileSource::LocalPath(path) => Ok(path),
            _ => Err(IngestError::InvalidFile(
                "Descriptor was not produced by the local adapter".to_string(),
            )),
        }
    }
}

#[async_trait]
impl IngestAdapter for LocalPathAdapter {
    fn name(&self) -> &'static str {
        "local"
    }

    fn parse(&self, input: &JsonValue) -> Result<Vec<FileDescriptor>, IngestError> {
        let entries = parse_entries(input, "path")?;
        Ok(entries
            .into_iter()
            .map(|(path, metadata)| {
                let descriptor = FileDescriptor::new(FileSource::LocalPath(PathBuf::from(path)));
                match metadata {
                    Some(m) => descriptor.with_metadata(m),
                    None => descriptor,
                }
            })
            .collect())
    }

    async fn validate(&self, descriptor: &FileDescriptor) -> Result<(), IngestError> {
        let path = self.source_path(descriptor)?;

        let meta = fs::metadata(path).await.map_err(|_| {
            IngestError::InvalidFile(format!(
                "Source file {} does not exist or is not readable",
                path.display()
            ))
        })?;

        if !meta.is_file() {
            return Err(IngestError::InvalidFile(format!(
                "Source {} is not a regular file",
                path.display()
            )));
        }

        if meta.len() == 0 {
            return Err(IngestError::InvalidFile(format!(
                "Source file {} is empty",
                path.display()
            )));
        }

        validate_file_size(meta.len(), self.config.max_file_size_bytes)?;
        validate_file_extension(
            &self.original_filename(descriptor),
            self.config.allowed_extensions.as_deref(),
        )?;

        Ok(())
    }

    fn original_filename(&self, descriptor: &FileDescriptor) -> String {
        match &descriptor.source {
            FileSource::LocalPath(path) => path
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
        let source = self.source_path(descriptor)?;
        let destination = naming::unique_destination(&self.archive, original_filename).await?;
        let path = self.archive.copy_in(source, &destination).await?;
        Ok(Some(path))
    }
}
