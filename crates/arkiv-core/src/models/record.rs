use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-file descriptive metadata: field identifier -> text value.
///
/// Carried through the pipeline from the adapter's parsed descriptor and
/// attached to the created record by the persistence collaborator.
pub type Metadata = HashMap<String, String>;

/// Durable record describing one successfully ingested file.
///
/// Constructed and defaulted by the `RecordStore` collaborator: checksum,
/// size, and content type are derived from the archive copy, not from the
/// source the bytes came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub item_id: Uuid,
    /// Display name, as derived from the ingestion source.
    pub original_filename: String,
    /// Collision-free name of the file under the archive root.
    pub archive_filename: String,
    pub content_type: String,
    pub size: i64,
    pub sha256: String,
    pub metadata: Option<Metadata>,
    pub added_at: DateTime<Utc>,
}

impl FileRecord {
    /// Absolute location of this record's bytes under the given archive root.
    pub fn archive_path(&self, archive_root: &Path) -> PathBuf {
        archive_root.join(&self.archive_filename)
    }
}
