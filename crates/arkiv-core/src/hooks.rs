//! Hooks for reacting to ingestion events
//!
//! This module provides the trait interface that lets the surrounding system
//! observe successful ingestions (e.g. to queue derivative generation or fire
//! webhooks) without the pipeline depending on it. Hook failures never affect
//! the ingestion outcome; the orchestrator logs and moves on.

use async_trait::async_trait;

use crate::models::{FileRecord, Item};

/// Trait for observers notified after each successful record creation.
#[async_trait]
pub trait IngestHook: Send + Sync {
    /// Called once per successfully persisted file record.
    async fn after_file_ingested(&self, record: &FileRecord, item: &Item) -> Result<(), String>;
}

/// No-op implementation for when no observer is wired up.
pub struct NoOpIngestHook;

#[async_trait]
impl IngestHook for NoOpIngestHook {
    async fn after_file_ingested(&self, _record: &FileRecord, _item: &Item) -> Result<(), String> {
        Ok(())
    }
}
