//! Built-in ingestion adapters
//!
//! Three strategies ship with the pipeline: `local` copies files already on
//! this machine, `url` downloads remote resources, `upload` moves spooled
//! multipart uploads. All of them share the input-parsing helpers here.

pub mod local;
pub mod upload;
pub mod url;

pub use local::LocalPathAdapter;
pub use upload::UploadAdapter;
pub use url::UrlAdapter;

use serde_json::Value as JsonValue;

use arkiv_core::{IngestError, Metadata};

/// Parse raw input into `(value, metadata)` entries.
///
/// Accepts a bare string (one entry), an array of strings, or an array of
/// objects carrying `key` plus an optional `"metadata"` object. `key` is the
/// adapter-specific field name (`"path"`, `"url"`).
pub(crate) fn parse_entries(
    input: &JsonValue,
    key: &str,
) -> Result<Vec<(String, Option<Metadata>)>, IngestError> {
    match input {
        JsonValue::Array(items) => items.iter().map(|item| parse_entry(item, key)).collect(),
        other => Ok(vec![parse_entry(other, key)?]),
    }
}

fn parse_entry(value: &JsonValue, key: &str) -> Result<(String, Option<Metadata>), IngestError> {
    match value {
        JsonValue::String(s) if !s.trim().is_empty() => Ok((s.trim().to_string(), None)),
        JsonValue::String(_) => Err(IngestError::Parse("Empty input entry".to_string())),
        JsonValue::Object(map) => {
            let target = map
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    IngestError::Parse(format!("Entry is missing a non-empty '{}' field", key))
                })?;
            let metadata = match map.get("metadata") {
                None | Some(JsonValue::Null) => None,
                Some(raw) => Some(parse_metadata(raw)?),
            };
            Ok((target.to_string(), metadata))
        }
        other => Err(IngestError::Parse(format!(
            "Expected a string or object entry, got {}",
            json_type_name(other)
        ))),
    }
}

/// Parse a metadata object: field identifier -> text value, strictly strings.
pub(crate) fn parse_metadata(value: &JsonValue) -> Result<Metadata, IngestError> {
    let map = value.as_object().ok_or_else(|| {
        IngestError::Parse(format!(
            "Metadata must be an object, got {}",
            json_type_name(value)
        ))
    })?;

    let mut metadata = Metadata::new();
    for (field, raw) in map {
        let text = raw.as_str().ok_or_else(|| {
            IngestError::Parse(format!("Metadata field '{}' must be a string", field))
        })?;
        metadata.insert(field.clone(), text.to_string());
    }
    Ok(metadata)
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
