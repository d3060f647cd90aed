//! Common file validation helpers used by adapters and the destination namer.

use std::path::Path;

use crate::error::IngestError;

pub const MAX_FILENAME_LENGTH: usize = 255;

/// Sanitize a filename to prevent path traversal and invalid characters.
/// Returns an error if the filename contains path traversal attempts.
pub fn sanitize_filename(filename: &str) -> Result<String, IngestError> {
    if filename.contains("..") {
        return Err(IngestError::InvalidFile(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let path = Path::new(filename);
    let filename_only = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(['_', '.']).is_empty() {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}

/// Validate a filename's extension against the configured allowlist.
/// Returns the lowercased extension. `None` means any extension is accepted.
pub fn validate_file_extension(
    filename: &str,
    allowed_extensions: Option<&[String]>,
) -> Result<String, IngestError> {
    let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();

    if let Some(allowed) = allowed_extensions {
        if !allowed.contains(&extension) {
            return Err(IngestError::InvalidFile(format!(
                "Invalid file extension '{}'. Allowed extensions: {}",
                extension,
                allowed.join(", ")
            )));
        }
    }

    Ok(extension)
}

/// Validate a file size against the configured limit. `None` means unlimited.
pub fn validate_file_size(size: u64, max_size: Option<u64>) -> Result<(), IngestError> {
    if let Some(max) = max_size {
        if size > max {
            return Err(IngestError::InvalidFile(format!(
                "File size {} exceeds maximum allowed size of {} bytes",
                size, max
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_filename_rejects_path_traversal() {
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("foo/../bar").is_err());
        assert!(sanitize_filename("....").is_err());
    }

    #[test]
    fn sanitize_filename_accepts_valid_names() {
        assert_eq!(sanitize_filename("image.png").unwrap(), "image.png");
        assert_eq!(sanitize_filename("my-file_1.jpg").unwrap(), "my-file_1.jpg");
    }

    #[test]
    fn sanitize_filename_strips_directories_and_specials() {
        assert_eq!(sanitize_filename("uploads/scan 1.tif").unwrap(), "scan_1.tif");
        assert_eq!(sanitize_filename("naïve café.pdf").unwrap(), "naïve_café.pdf");
    }

    #[test]
    fn sanitize_filename_falls_back_for_empty_names() {
        assert_eq!(sanitize_filename("").unwrap(), "file");
        assert_eq!(sanitize_filename("???").unwrap(), "file");
    }

    #[test]
    fn validate_file_extension_checks_allowlist() {
        let allowed = vec!["jpg".to_string(), "png".to_string()];
        assert_eq!(
            validate_file_extension("photo.JPG", Some(&allowed)).unwrap(),
            "jpg"
        );
        assert!(validate_file_extension("notes.txt", Some(&allowed)).is_err());
        assert_eq!(
            validate_file_extension("notes.txt", None).unwrap(),
            "txt"
        );
    }

    #[test]
    fn validate_file_size_checks_limit() {
        assert!(validate_file_size(100, Some(100)).is_ok());
        assert!(validate_file_size(101, Some(100)).is_err());
        assert!(validate_file_size(u64::MAX, None).is_ok());
    }
}
