//! Test helpers: temp archive, in-memory record store, recording hook.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use uuid::Uuid;

use arkiv_archive::Archive;
use arkiv_core::{
    ArchiveConfig, FileRecord, IngestError, IngestHook, IngestOptions, Item, Metadata, RecordStore,
};
use arkiv_ingest::{AdapterDeps, AdapterRegistry, Ingestor};

/// One isolated pipeline wired to a temp archive and in-memory collaborators.
pub struct TestEnv {
    pub deps: AdapterDeps,
    pub registry: AdapterRegistry,
    pub store: Arc<MemoryRecordStore>,
    pub hook: Arc<RecordingHook>,
    pub archive_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_config_fn(|config| config)
    }

    pub fn with_config_fn(adjust: impl FnOnce(ArchiveConfig) -> ArchiveConfig) -> Self {
        init_tracing();

        let archive_dir = tempfile::tempdir().unwrap();
        let config = adjust(ArchiveConfig::new(archive_dir.path()));

        TestEnv {
            deps: AdapterDeps {
                archive: Arc::new(Archive::new(archive_dir.path()).unwrap()),
                config: Arc::new(config),
            },
            registry: AdapterRegistry::with_defaults(),
            store: Arc::new(MemoryRecordStore::new()),
            hook: Arc::new(RecordingHook::new()),
            archive_dir,
        }
    }

    pub fn ingestor(&self, adapter: &str, options: IngestOptions) -> Ingestor {
        self.registry
            .create_ingestor(
                adapter,
                &self.deps,
                Item::new(Uuid::new_v4()).with_title("Test item"),
                options,
                self.store.clone(),
                self.hook.clone(),
            )
            .unwrap()
    }

    /// Names of all files currently present in the archive directory, sorted.
    pub fn archive_filenames(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.archive_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

static TRACING: Once = Once::new();

/// Honor RUST_LOG when debugging tests; quiet otherwise.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// In-memory `RecordStore` that derives checksum, size, and content type from
/// the archive copy, like a real persistence layer would. `fail_next` makes
/// the next call return a persistence error without creating anything.
pub struct MemoryRecordStore {
    records: Mutex<Vec<FileRecord>>,
    fail_next: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        MemoryRecordStore {
            records: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<FileRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create_record(
        &self,
        item: &Item,
        original_filename: &str,
        archive_path: &Path,
        metadata: Option<&Metadata>,
    ) -> Result<FileRecord, IngestError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(IngestError::from(anyhow::anyhow!("record store offline")));
        }

        let data = tokio::fs::read(archive_path)
            .await
            .map_err(|e| IngestError::from(anyhow::anyhow!("cannot read archive copy: {}", e)))?;

        let archive_filename = archive_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let record = FileRecord {
            id: Uuid::new_v4(),
            item_id: item.id,
            original_filename: original_filename.to_string(),
            archive_filename,
            content_type: mime_guess::from_path(archive_path)
                .first_or_octet_stream()
                .to_string(),
            size: data.len() as i64,
            sha256: hex::encode(Sha256::digest(&data)),
            metadata: metadata.cloned(),
            added_at: Utc::now(),
        };

        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }
}

/// Hook that records the ids it was called with; can be set to fail.
pub struct RecordingHook {
    seen: Mutex<Vec<Uuid>>,
    fail: AtomicBool,
}

impl RecordingHook {
    pub fn new() -> Self {
        RecordingHook {
            seen: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn fail_always(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn seen(&self) -> Vec<Uuid> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl IngestHook for RecordingHook {
    async fn after_file_ingested(&self, record: &FileRecord, _item: &Item) -> Result<(), String> {
        self.seen.lock().unwrap().push(record.id);
        if self.fail.load(Ordering::SeqCst) {
            return Err("observer unavailable".to_string());
        }
        Ok(())
    }
}

/// Write `files` as `(name, contents)` pairs into a temp source directory.
pub fn write_source_files(dir: &TempDir, files: &[(&str, &[u8])]) -> Vec<String> {
    files
        .iter()
        .map(|(name, contents)| {
            let path = dir.path().join(name);
            std::fs::write(&path, contents).unwrap();
            path.to_string_lossy().into_owned()
        })
        .collect()
}
