//! Arkiv Ingest Library
//!
//! This crate provides the file-ingestion pipeline: pluggable adapters that
//! parse, validate, and transfer files from a source (local path, URL,
//! spooled upload) into the managed archive, the orchestrator that drives
//! them and creates durable records, and the registry that resolves adapters
//! by name at runtime.

pub mod adapter;
pub mod adapters;
pub mod factory;
pub mod orchestrator;

// Re-export commonly used types
pub use adapter::{FileDescriptor, FileSource, IngestAdapter};
pub use adapters::{LocalPathAdapter, UploadAdapter, UrlAdapter};
pub use factory::{AdapterDeps, AdapterRegistry};
pub use orchestrator::Ingestor;
