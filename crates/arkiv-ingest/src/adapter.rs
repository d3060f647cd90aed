//! Ingest adapter contract
//!
//! This module defines the trait every ingestion strategy implements. The
//! orchestrator only ever sees descriptors through this contract; what a
//! descriptor points at is the adapter's business.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use arkiv_core::{IngestError, Metadata};

/// Where one candidate file's bytes come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// A file on the local filesystem, copied into the archive.
    LocalPath(PathBuf),
    /// A remote http(s) resource, downloaded into the archive.
    Url(String),
    /// An upload a frontend already spooled to a temporary file, moved into
    /// the archive.
    Spooled {
        tmp_path: PathBuf,
        filename: String,
    },
}

/// One candidate file plus its optional descriptive metadata.
///
/// Produced by `IngestAdapter::parse` and handed back to the same adapter for
/// validation and transfer, in input order.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    pub source: FileSource,
    pub metadata: Option<Metadata>,
}

impl FileDescriptor {
    pub fn new(source: FileSource) -> Self {
        FileDescriptor {
            source,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Ingestion strategy trait
///
/// All ingestion sources (local paths, URLs, spooled uploads) implement this
/// trait. Adapters are stateless with respect to the batch beyond the shared
/// archive handle and validation limits they are constructed with; a new
/// instance is built per logical ingestion configuration.
#[async_trait]
pub trait IngestAdapter: Send + Sync {
    /// Registry name of this adapter, used in log fields.
    fn name(&self) -> &'static str;

    /// Interpret raw input into an ordered sequence of file descriptors.
    ///
    /// Raw input is a JSON value because every adapter accepts a different
    /// shape (a bare string, an array of strings, an array of objects with
    /// per-file metadata). Fails with `IngestError::Parse` when the input
    /// cannot be interpreted at all; a parse failure is always fatal to the
    /// whole call.
    fn parse(&self, input: &JsonValue) -> Result<Vec<FileDescriptor>, IngestError>;

    /// Check one descriptor without transferring anything.
    ///
    /// Fails with `IngestError::InvalidFile` carrying a human-readable
    /// reason (missing source, bad extension, over the size limit). Must not
    /// leave side effects; only transient checks are allowed.
    async fn validate(&self, descriptor: &FileDescriptor) -> Result<(), IngestError>;

    /// Derive the display filename for one descriptor.
    ///
    /// Pure and stable; never empty (falls back to `"file"` when the source
    /// yields no usable name). Seeds the collision-free archive filename.
    fn original_filename(&self, descriptor: &FileDescriptor) -> String;

    /// Move one descriptor's bytes into the archive.
    ///
    /// Resolves the destination through the archive's naming module and
    /// returns the absolute path of the written file. `Ok(None)` means the
    /// file was silently skipped (e.g. a zero-length spooled upload).
    async fn transfer(
        &self,
        descriptor: &FileDescriptor,
        original_filename: &str,
    ) -> Result<Option<PathBuf>, IngestError>;
}
