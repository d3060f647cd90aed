//! Collision-free destination naming
//!
//! Maps an original filename to the name the bytes are stored under. Every
//! adapter resolves its destination here so collision handling stays in one
//! place.

use arkiv_core::validation::sanitize_filename;

use crate::archive::{Archive, ArchiveError, ArchiveResult};

/// Derive a collision-free archive filename for `original_filename`.
///
/// The original name is sanitized (directories stripped, special characters
/// replaced, length capped) and, while a file of that name already exists in
/// the archive, a numeric uniqueness token is inserted before the extension:
/// `report.pdf` -> `report-1.pdf` -> `report-2.pdf`.
///
/// The archive root's writability is probed on every call, not once globally,
/// since it can change between transfers.
pub async fn unique_destination(
    archive: &Archive,
    original_filename: &str,
) -> ArchiveResult<String> {
    archive.ensure_writable()?;

    let sanitized = sanitize_filename(original_filename)
        .map_err(|e| ArchiveError::InvalidFilename(e.to_string()))?;

    if !archive.exists(&sanitized).await? {
        return Ok(sanitized);
    }

    let (stem, extension) = split_filename(&sanitized);
    let mut token = 1u32;
    loop {
        let candidate = with_token(stem, token, extension);
        if !archive.exists(&candidate).await? {
            return Ok(candidate);
        }
        token += 1;
    }
}

/// Split `name` into (stem, extension). Leading-dot names count as all stem.
fn split_filename(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

fn with_token(stem: &str, token: u32, extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("{}-{}.{}", stem, token, ext),
        None => format!("{}-{}", stem, token),
    }
}
