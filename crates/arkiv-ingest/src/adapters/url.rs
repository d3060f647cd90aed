//! URL ingestion adapter

use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use percent_encoding::percent_decode_str;
use serde_json::Value as JsonValue;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

use arkiv_archive::{naming, Archive};
use arkiv_core::validation::{validate_file_extension, validate_file_size};
use arkiv_core::{ArchiveConfig, IngestError};

use crate::adapter::{FileDescriptor, FileSource, IngestAdapter};
use crate::adapters::parse_entries;

/// Ingests remote http(s) resources by streaming them into the archive.
///
/// Raw input: one URL string (whitespace-separated URLs allowed, so a pasted
/// bulk list ingests in one call), an array of URL strings, or an array of
/// `{"url": ..., "metadata": {...}}` objects.
pub struct UrlAdapter {
    archive: Arc<Archive>,
    config: Arc<ArchiveConfig>,
}

impl UrlAdapter {
    pub fn new(archive: Arc<Archive>, config: Arc<ArchiveConfig>) -> Self {
        UrlAdapter { archive, config }
    }

    fn source_url<'a>(&self, descriptor: &'a FileDescriptor) -> Result<&'a str, IngestError> {
        match &descriptor.source {
            FileSource::Url(url) => Ok(url),
            _ => Err(IngestError::InvalidFile(
                "Descriptor was not produced by the url adapter".to_string(),
            )),
        }
    }

    fn client(&self) -> Result<reqwest::Client, IngestError> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.config.url_timeout_secs))
            .build()
            .map_err(|e| IngestError::Transfer(format!("Failed to create HTTP client: {}", e)))
    }
}

#[async_trait]
impl IngestAdapter for UrlAdapter {
    fn name(&self) -> &'static str {
        "url"
    }

    fn parse(&self, input: &JsonValue) -> Result<Vec<FileDescriptor>, IngestError> {
        let entries = match input {
            JsonValue::String(raw) => {
                let urls: Vec<_> = raw
                    .split_whitespace()
                    .map(|url| (url.to_string(), None))
                    .collect();
                if urls.is_empty() {
                    return Err(IngestError::Parse("No URLs in input".to_string()));
                }
                urls
            }
            other => parse_entries(other, "url")?,
        };

        entries
            .into_iter()
            .map(|(url, metadata)| {
                let parsed = reqwest::Url::parse(&url)
                    .map_err(|_| IngestError::Parse(format!("Invalid URL format: {}", url)))?;
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(IngestError::Parse(format!(
                        "Only HTTP and HTTPS URLs are allowed: {}",
                        url
                    )));
                }
                let descriptor = FileDescriptor::new(FileSource::Url(url));
                Ok(match metadata {
                    Some(m) => descriptor.with_metadata(m),
                    None => descriptor,
                })
            })
            .collect()
    }

    async fn validate(&self, descriptor: &FileDescriptor) -> Result<(), IngestError> {
        let url = self.source_url(descriptor)?;

        validate_file_extension(
            &self.original_filename(descriptor),
            self.config.allowed_extensions.as_deref(),
        )?;

        let response = self.client()?.head(url).send().await.map_err(|e| {
            IngestError::InvalidFile(format!("URL {} is unreachable: {}", url, e))
        })?;

        if !response.status().is_success() {
            return Err(IngestError::InvalidFile(format!(
                "URL {} returned status code: {}",
                url,
                response.status()
            )));
        }

        if let Some(length) = response.content_length() {
            validate_file_size(length, self.config.max_file_size_bytes)?;
        }

        Ok(())
    }

    fn original_filename(&self, descriptor: &FileDescriptor) -> String {
        let FileSource::Url(url) = &descriptor.source else {
            return "file".to_string();
        };

        reqwest::Url::parse(url)
            .ok()
            .and_then(|parsed| {
                parsed.path_segments().and_then(|mut segments| {
                    segments
                        .next_back()
                        .filter(|segment| !segment.is_empty())
                        .and_then(|segment| {
                            percent_decode_str(segment)
                                .decode_utf8()
                                .ok()
                                .map(|decoded| decoded.into_owned())
                        })
                })
            })
            .unwrap_or_else(|| "file".to_string())
    }

    async fn transfer(
        &self,
        descriptor: &FileDescriptor,
        original_filename: &str,
    ) -> Result<Option<PathBuf>, IngestError> {
        let url = self.source_url(descriptor)?;

        let response = self.client()?.get(url).send().await.map_err(|e| {
            IngestError::Transfer(format!("Failed to download from {}: {}", url, e))
        })?;

        if !response.status().is_success() {
            return Err(IngestError::Transfer(format!(
                "URL {} returned status code: {}",
                url,
                response.status()
            )));
        }

        let destination = naming::unique_destination(&self.archive, original_filename).await?;

        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        let reader = Box::pin(StreamReader::new(stream)) as Pin<Box<dyn AsyncRead + Send>>;

        let (path, written) = self.archive.write_from_reader(&destination, reader).await?;

        if written == 0 {
            tracing::debug!(url = %url, "URL yielded an empty body, skipping");
            self.archive.delete(&destination).await?;
            return Ok(None);
        }

        if let Some(max) = self.config.max_file_size_bytes {
            if written > max {
                if let Err(e) = self.archive.delete(&destination).await {
                    tracing::error!(
                        error = %e,
                        filename = %destination,
                        "Failed to remove oversized download from archive"
                    );
                }
                return Err(IngestError::InvalidFile(format!(
                    "Downloaded size {} exceeds maximum allowed size of {} bytes",
                    written, max
                )));
            }
        }

        Ok(Some(path))
    }
}
