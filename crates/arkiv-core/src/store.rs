//! Record persistence interface
//!
//! The pipeline never talks to a database directly. The surrounding system
//! implements `RecordStore`; the orchestrator hands it the archive copy and
//! the descriptive metadata, and receives the persisted record back.

use std::path::Path;

use async_trait::async_trait;

use crate::error::IngestError;
use crate::models::{FileRecord, Item, Metadata};

/// Record-persistence collaborator.
///
/// An implementation is expected to (a) populate derived attributes
/// (checksum, size, content type) from the archive copy at `archive_path`,
/// (b) attach the metadata fields, (c) persist the record durably, and
/// (d) fail with `IngestError::Persistence` on any step. When it fails, the
/// orchestrator deletes the archive copy before propagating - cleanup is the
/// pipeline's responsibility, not the store's.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_record(
        &self,
        item: &Item,
        original_filename: &str,
        archive_path: &Path,
        metadata: Option<&Metadata>,
    ) -> Result<FileRecord, IngestError>;
}
