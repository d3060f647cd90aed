//! Ingest orchestrator
//!
//! Drives the parse -> validate -> transfer -> record-creation workflow for
//! one batch. The skip-vs-abort decision lives here, as an explicit branch on
//! the error kind plus the ignore-invalid-files flag, so adapters never carry
//! their own policy logic.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use arkiv_archive::Archive;
use arkiv_core::{
    ErrorMetadata, FileRecord, IngestError, IngestHook, IngestOptions, Item, RecordStore,
};

use crate::adapter::IngestAdapter;

/// One configured ingestion pipeline: an adapter bound to a target item,
/// batch options, and the persistence and notification collaborators.
///
/// Descriptors are processed strictly one at a time in input order; archive
/// naming and the fail-fast policy both depend on that order being stable.
pub struct Ingestor {
    adapter: Box<dyn IngestAdapter>,
    archive: Arc<Archive>,
    item: Item,
    options: IngestOptions,
    store: Arc<dyn RecordStore>,
    hook: Arc<dyn IngestHook>,
}

impl Ingestor {
    pub fn new(
        adapter: Box<dyn IngestAdapter>,
        archive: Arc<Archive>,
        item: Item,
        options: IngestOptions,
        store: Arc<dyn RecordStore>,
        hook: Arc<dyn IngestHook>,
    ) -> Self {
        Ingestor {
            adapter,
            archive,
            item,
            options,
            store,
            hook,
        }
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    /// Run one ingestion batch.
    ///
    /// Returns the created records in descriptor order - possibly fewer than
    /// the input if files were skipped under the ignore-invalid-files policy,
    /// or a single error describing the first fatal failure. When a later
    /// descriptor aborts the batch, records already created for earlier
    /// descriptors are retained; each completed file is independently
    /// consistent.
    #[tracing::instrument(
        skip(self, input),
        fields(adapter = self.adapter.name(), item_id = %self.item.id)
    )]
    pub async fn ingest(&self, input: &JsonValue) -> Result<Vec<FileRecord>, IngestError> {
        let descriptors = self.adapter.parse(input)?;

        tracing::info!(count = descriptors.len(), "Parsed ingest input");

        let mut records = Vec::with_capacity(descriptors.len());

        for descriptor in &descriptors {
            if let Err(err) = self.adapter.validate(descriptor).await {
                if self.should_skip(&err) {
                    tracing::warn!(error = %err, "Skipping invalid file");
                    continue;
                }
                return Err(err);
            }

            let original_filename = self.adapter.original_filename(descriptor);

            let transferred = match self.adapter.transfer(descriptor, &original_filename).await {
                Ok(path) => path,
                Err(err) => {
                    if self.should_skip(&err) {
                        tracing::warn!(
                            error = %err,
                            filename = %original_filename,
                            "Skipping file after failed transfer"
                        );
                        continue;
                    }
                    return Err(err);
                }
            };

            let Some(archive_path) = transferred else {
                tracing::debug!(filename = %original_filename, "Adapter skipped file during transfer");
                continue;
            };

            let record = match self
                .store
                .create_record(
                    &self.item,
                    &original_filename,
                    &archive_path,
                    descriptor.metadata.as_ref(),
                )
                .await
            {
                Ok(record) => record,
                Err(err) => {
                    // The archive copy must not outlive the failed record.
                    self.remove_orphaned_file(&archive_path).await;
                    return Err(err);
                }
            };

            if let Err(hook_err) = self.hook.after_file_ingested(&record, &self.item).await {
                tracing::warn!(
                    error = %hook_err,
                    record_id = %record.id,
                    "Ingest hook failed"
                );
            }

            tracing::info!(
                record_id = %record.id,
                filename = %original_filename,
                archive_filename = %record.archive_filename,
                "File ingested"
            );

            records.push(record);
        }

        Ok(records)
    }

    fn should_skip(&self, err: &IngestError) -> bool {
        self.options.ignore_invalid_files && err.is_skippable()
    }

    async fn remove_orphaned_file(&self, archive_path: &Path) {
        let Some(filename) = archive_path.file_name().and_then(|n| n.to_str()) else {
            tracing::error!(
                path = %archive_path.display(),
                "Cannot derive archive filename for cleanup"
            );
            return;
        };

        if let Err(err) = self.archive.delete(filename).await {
            tracing::error!(
                error = %err,
                path = %archive_path.display(),
                "Failed to remove archive file after persistence error"
            );
        }
    }
}
