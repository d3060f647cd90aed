//! Error types module
//!
//! This module provides the error types used throughout the ingestion
//! pipeline. All errors are unified under the `IngestError` enum; the
//! orchestrator decides skip-vs-abort per item by consulting
//! `ErrorMetadata::is_skippable` together with the ignore-invalid-files flag.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable per-file issues like failed transfers
    Warn,
    /// Error level - for system-level failures
    Error,
}

/// Metadata for error handling - defines how an error should be treated.
/// This trait allows errors to self-describe their propagation characteristics.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "PARSE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether the ignore-invalid-files policy may swallow this error.
    /// Only per-file data-quality errors qualify; batch-level and
    /// system-level errors always propagate.
    fn is_skippable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("Archive not writable: {0}")]
    ArchiveUnwritable(String),

    #[error("Unknown adapter: {0}")]
    UnknownAdapter(String),

    #[error("Persistence error: {message}")]
    Persistence {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for IngestError {
    fn from(err: anyhow::Error) -> Self {
        IngestError::Persistence {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for IngestError {
    fn from(err: io::Error) -> Self {
        IngestError::Transfer(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::Parse(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, skippable, log_level).
fn ingest_error_static_metadata(err: &IngestError) -> (&'static str, bool, LogLevel) {
    match err {
        IngestError::Parse(_) => ("PARSE_ERROR", false, LogLevel::Debug),
        IngestError::InvalidFile(_) => ("INVALID_FILE", true, LogLevel::Debug),
        IngestError::Transfer(_) => ("TRANSFER_FAILED", true, LogLevel::Warn),
        IngestError::ArchiveUnwritable(_) => ("ARCHIVE_UNWRITABLE", false, LogLevel::Error),
        IngestError::UnknownAdapter(_) => ("UNKNOWN_ADAPTER", false, LogLevel::Debug),
        IngestError::Persistence { .. } => ("PERSISTENCE_ERROR", false, LogLevel::Error),
    }
}

impl IngestError {
    /// Get the error type name for detailed error reporting
    pub fn error_type(&self) -> &str {
        match self {
            IngestError::Parse(_) => "Parse",
            IngestError::InvalidFile(_) => "InvalidFile",
            IngestError::Transfer(_) => "Transfer",
            IngestError::ArchiveUnwritable(_) => "ArchiveUnwritable",
            IngestError::UnknownAdapter(_) => "UnknownAdapter",
            IngestError::Persistence { .. } => "Persistence",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for IngestError {
    fn error_code(&self) -> &'static str {
        ingest_error_static_metadata(self).0
    }

    fn is_skippable(&self) -> bool {
        ingest_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        ingest_error_static_metadata(self).2
    }
}
