//! Configuration module
//!
//! This module provides the configuration structures for the ingestion
//! pipeline: the archive/validation settings shared by all adapters, and the
//! per-run ingestion options. Both are explicit structs with documented
//! defaults, validated once at construction.

use std::env;
use std::path::PathBuf;

use anyhow::Context;

const DEFAULT_URL_TIMEOUT_SECS: u64 = 60;

/// Batch-level ingestion options.
///
/// Immutable for the lifetime of one ingestion run; set once when the
/// orchestrator is built.
#[derive(Clone, Copy, Debug, Default)]
pub struct IngestOptions {
    /// When true, a per-file validation or transfer failure skips that file
    /// instead of aborting the whole batch. Defaults to false (fail-fast).
    pub ignore_invalid_files: bool,
}

impl IngestOptions {
    /// Best-effort bulk-import options: skip invalid files instead of aborting.
    pub fn ignoring_invalid_files() -> Self {
        IngestOptions {
            ignore_invalid_files: true,
        }
    }
}

/// Archive and file-validation configuration shared by all adapters.
#[derive(Clone, Debug)]
pub struct ArchiveConfig {
    /// Absolute path of the archive root. Must already exist; the pipeline
    /// never creates it.
    pub root: PathBuf,
    /// Maximum accepted file size in bytes. None = unlimited.
    pub max_file_size_bytes: Option<u64>,
    /// Lowercased extension allowlist. None = any extension accepted.
    pub allowed_extensions: Option<Vec<String>>,
    /// Per-request timeout for URL downloads, in seconds.
    pub url_timeout_secs: u64,
}

impl ArchiveConfig {
    /// Configuration with defaults: no size limit, any extension, 60s URL timeout.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ArchiveConfig {
            root: root.into(),
            max_file_size_bytes: None,
            allowed_extensions: None,
            url_timeout_secs: DEFAULT_URL_TIMEOUT_SECS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `ARCHIVE_ROOT` (required): absolute path of the archive directory
    /// - `ARCHIVE_MAX_FILE_SIZE_BYTES` (optional): maximum accepted file size
    /// - `ARCHIVE_ALLOWED_EXTENSIONS` (optional): comma-separated allowlist, e.g. `jpg,png,pdf`
    /// - `ARCHIVE_URL_TIMEOUT_SECS` (optional, default 60)
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let root = env::var("ARCHIVE_ROOT").context("ARCHIVE_ROOT is not set")?;

        let max_file_size_bytes = match env::var("ARCHIVE_MAX_FILE_SIZE_BYTES") {
            Ok(raw) => Some(
                raw.parse::<u64>()
                    .context("ARCHIVE_MAX_FILE_SIZE_BYTES must be an integer")?,
            ),
            Err(_) => None,
        };

        let allowed_extensions = env::var("ARCHIVE_ALLOWED_EXTENSIONS")
            .ok()
            .map(|raw| parse_extensions(&raw))
            .filter(|exts| !exts.is_empty());

        let url_timeout_secs = match env::var("ARCHIVE_URL_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("ARCHIVE_URL_TIMEOUT_SECS must be an integer")?,
            Err(_) => DEFAULT_URL_TIMEOUT_SECS,
        };

        Ok(ArchiveConfig {
            root: PathBuf::from(root),
            max_file_size_bytes,
            allowed_extensions,
            url_timeout_secs,
        })
    }

    /// Builder-style override for the size limit.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size_bytes = Some(bytes);
        self
    }

    /// Builder-style override for the extension allowlist.
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = Some(
            extensions
                .into_iter()
                .map(|e| e.into().to_lowercase())
                .collect(),
        );
        self
    }
}

/// Parse a comma-separated extension list, lowercasing and dropping empties.
fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_options_default_to_fail_fast() {
        assert!(!IngestOptions::default().ignore_invalid_files);
        assert!(IngestOptions::ignoring_invalid_files().ignore_invalid_files);
    }

    #[test]
    fn parse_extensions_normalizes_entries() {
        assert_eq!(
            parse_extensions("JPG, .png ,pdf,,"),
            vec!["jpg".to_string(), "png".to_string(), "pdf".to_string()]
        );
        assert!(parse_extensions(" , ").is_empty());
    }

    #[test]
    fn with_allowed_extensions_lowercases() {
        let config = ArchiveConfig::new("/var/lib/arkiv/files").with_allowed_extensions(["JPG", "Png"]);
        assert_eq!(
            config.allowed_extensions,
            Some(vec!["jpg".to_string(), "png".to_string()])
        );
    }

    #[test]
    fn from_env_reads_all_settings() {
        env::set_var("ARCHIVE_ROOT", "/var/lib/arkiv/files");
        env::set_var("ARCHIVE_MAX_FILE_SIZE_BYTES", "1048576");
        env::set_var("ARCHIVE_ALLOWED_EXTENSIONS", "jpg,png");
        env::set_var("ARCHIVE_URL_TIMEOUT_SECS", "30");

        let config = ArchiveConfig::from_env().unwrap();
        assert_eq!(config.root, PathBuf::from("/var/lib/arkiv/files"));
        assert_eq!(config.max_file_size_bytes, Some(1_048_576));
        assert_eq!(
            config.allowed_extensions,
            Some(vec!["jpg".to_string(), "png".to_string()])
        );
        assert_eq!(config.url_timeout_secs, 30);

        env::remove_var("ARCHIVE_ROOT");
        env::remove_var("ARCHIVE_MAX_FILE_SIZE_BYTES");
        env::remove_var("ARCHIVE_ALLOWED_EXTENSIONS");
        env::remove_var("ARCHIVE_URL_TIMEOUT_SECS");
    }
}
